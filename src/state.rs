use crate::cache::TtlCache;
use crate::config::Config;
use crate::db::Store;
use crate::entities::profile;
use crate::services::{FeaturedService, SearchService};

/// Everything the HTTP layer and tests need, built once at startup. The
/// TTL cache is constructed here and handed to both services; it is an
/// explicit instance with process lifetime, not a global.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub cache: TtlCache<Vec<profile::Model>>,

    pub search_service: SearchService,

    pub featured_service: FeaturedService,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let cache: TtlCache<Vec<profile::Model>> = TtlCache::new();

        let search_service = SearchService::new(store.clone(), cache.clone(), &config.search);
        let featured_service = FeaturedService::new(
            store.clone(),
            cache.clone(),
            &config.featured,
            config.search.cache_ttl_seconds,
        );

        Ok(Self {
            config,
            store,
            cache,
            search_service,
            featured_service,
        })
    }
}
