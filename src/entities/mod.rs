pub mod prelude;

pub mod profile;
