use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::cache::TtlCache;
use crate::config::FeaturedConfig;
use crate::constants::cache as cache_keys;
use crate::db::Store;
use crate::entities::profile;

#[derive(Debug, Error)]
pub enum FeaturedError {
    /// Record store unreachable mid-rotation. Surfaced, never retried
    /// silently: a degraded rotation must not return a miscounted set.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for FeaturedError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Maintains the size-k featured subset, refreshed at most once per
/// freshness window. No background scheduler: the first reader past the
/// window pays the recompute, which is a bounded top-k query.
#[derive(Clone)]
pub struct FeaturedService {
    store: Store,
    cache: TtlCache<Vec<profile::Model>>,
    size: usize,
    window: chrono::Duration,
    cache_ttl: Duration,
}

impl FeaturedService {
    #[must_use]
    pub fn new(
        store: Store,
        cache: TtlCache<Vec<profile::Model>>,
        config: &FeaturedConfig,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            store,
            cache,
            size: config.size,
            window: chrono::Duration::hours(config.refresh_hours),
            cache_ttl: Duration::from_secs(cache_ttl_seconds),
        }
    }

    /// Recomputes the featured subset: clears every currently-featured
    /// record, then flags the top-k by likes (ties broken by most recent
    /// creation) with ranks 1..k and a fresh `featured_since` stamp.
    ///
    /// The clear phase fully persists before the set phase starts, so the
    /// store never holds more than k featured records; the price is a brief
    /// zero-featured window, and a failure between the phases can leave a
    /// transient miscount. Both are accepted and surfaced, not masked.
    pub async fn update_daily_featured(&self) -> Result<Vec<profile::Model>, FeaturedError> {
        let cleared = self.store.clear_featured().await?;
        if cleared > 0 {
            info!("Cleared {cleared} previously featured profiles");
        }

        let top = self
            .store
            .top_profiles_by_likes(self.size as u64)
            .await?;
        let now = chrono::Utc::now().to_rfc3339();

        for (position, record) in top.iter().enumerate() {
            let rank = i32::try_from(position + 1).unwrap_or(i32::MAX);
            self.store.set_featured(record.id, rank, &now).await?;
        }

        self.cache.delete(cache_keys::FEATURED_KEY);

        let featured = self.store.featured_profiles().await?;
        info!("Featured rotation complete: {} profiles", featured.len());
        Ok(featured)
    }

    /// True when nothing is featured, or when the freshest `featured_since`
    /// is at least one window old.
    pub async fn needs_refresh(&self) -> Result<bool, FeaturedError> {
        let featured = self.store.featured_profiles().await?;
        if featured.is_empty() {
            return Ok(true);
        }

        let freshest = featured
            .iter()
            .filter_map(|record| record.featured_since.as_deref())
            .filter_map(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&chrono::Utc))
            .max();

        match freshest {
            Some(since) => Ok(chrono::Utc::now() - since >= self.window),
            None => {
                // Featured rows without a parseable stamp are stale by
                // definition.
                warn!("Featured rows carry no valid featured_since stamp");
                Ok(true)
            }
        }
    }

    /// The current featured set ordered by rank, via the cache.
    pub async fn get_featured(&self) -> Result<Vec<profile::Model>, FeaturedError> {
        if let Some(cached) = self.cache.get(cache_keys::FEATURED_KEY) {
            return Ok(cached);
        }

        let featured = self.store.featured_profiles().await?;
        self.cache
            .set(cache_keys::FEATURED_KEY, featured.clone(), self.cache_ttl);
        Ok(featured)
    }

    /// Synchronously recomputes when stale, otherwise serves the current
    /// set.
    pub async fn get_or_refresh_featured(&self) -> Result<Vec<profile::Model>, FeaturedError> {
        if self.needs_refresh().await? {
            info!("Featured set is stale, recomputing");
            return self.update_daily_featured().await;
        }
        self.get_featured().await
    }
}
