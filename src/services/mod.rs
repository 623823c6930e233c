pub mod featured;
pub mod ranking;
pub mod search;

pub use featured::{FeaturedError, FeaturedService};
pub use ranking::SearchCandidate;
pub use search::{SearchError, SearchService};
