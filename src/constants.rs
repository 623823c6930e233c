pub mod scoring {
    //! Relevance weights for the ranking engine.
    //!
    //! Base tiers are mutually exclusive; boosts stack on top of whichever
    //! tier matched. The interaction is intentional: a heavily boosted
    //! lower-tier record may outrank a bare higher-tier one.

    pub const EXACT_NAME: i64 = 1000;

    pub const NAME_PREFIX: i64 = 500;

    pub const NAME_SUBSTRING: i64 = 250;

    pub const ALL_TERMS: i64 = 100;

    pub const PER_TERM: i64 = 30;

    pub const DESCRIPTION_BOOST: i64 = 75;

    pub const OCCUPATION_BOOST: i64 = 50;

    pub const CATEGORY_BOOST: i64 = 40;

    pub const TAG_BOOST: i64 = 35;

    /// Popularity contribution is capped so likes cannot dominate relevance.
    pub const LIKES_CAP: i64 = 50;

    /// Multiplier applied to the text index's native relevance score.
    pub const INDEX_WEIGHT: f64 = 10.0;

    /// Only the first part of the description participates in matching.
    pub const DESCRIPTION_WINDOW: usize = 200;
}

pub mod limits {

    /// Per-retrieval-path candidate bound; the merged set stays <= 2x this.
    pub const RETRIEVAL_LIMIT: u64 = 50;

    /// Minimum term length considered by the single-term heuristic tier.
    pub const MIN_TERM_LEN: usize = 2;
}

pub mod featured {

    /// Size of the featured subset.
    pub const SET_SIZE: usize = 3;

    /// Freshness window between rotations.
    pub const REFRESH_HOURS: i64 = 24;
}

pub mod cache {

    /// Default TTL for cached search results. Aggressively short is fine:
    /// every cached value is recomputable from the store.
    pub const SEARCH_TTL_SECONDS: u64 = 120;

    pub const SEARCH_KEY_PREFIX: &str = "search:";

    pub const FEATURED_KEY: &str = "featured:list";
}
