use std::collections::HashSet;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::config::SearchConfig;
use crate::constants::cache as cache_keys;
use crate::db::Store;
use crate::entities::profile;
use crate::services::ranking::{self, SearchCandidate};

#[derive(Debug, Error)]
pub enum SearchError {
    /// User-correctable: empty or missing query.
    #[error("Search query must not be empty")]
    EmptyQuery,

    /// Both retrieval paths failed; nothing was cached so the next call
    /// retries cleanly.
    #[error("All retrieval paths failed: {0}")]
    AllPathsFailed(String),
}

/// Fans a query out to the indexed and heuristic retrieval paths, merges
/// and dedups the candidates, ranks them, and caches the result.
#[derive(Clone)]
pub struct SearchService {
    store: Store,
    cache: TtlCache<Vec<profile::Model>>,
    cache_ttl: Duration,
    retrieval_limit: u64,
}

impl SearchService {
    #[must_use]
    pub fn new(store: Store, cache: TtlCache<Vec<profile::Model>>, config: &SearchConfig) -> Self {
        Self {
            store,
            cache,
            cache_ttl: Duration::from_secs(config.cache_ttl_seconds),
            retrieval_limit: config.retrieval_limit,
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<profile::Model>, SearchError> {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let cache_key = format!("{}{normalized}", cache_keys::SEARCH_KEY_PREFIX);
        if let Some(cached) = self.cache.get(&cache_key) {
            debug!("Cache hit for '{normalized}'");
            return Ok(cached);
        }

        let terms: Vec<String> = normalized.split_whitespace().map(str::to_string).collect();

        // Either path may fail independently; a degraded search over one
        // path still returns results.
        let (indexed, heuristic) = tokio::join!(
            self.store.search_text_index(&normalized, self.retrieval_limit),
            self.store
                .search_patterns(&normalized, &terms, self.retrieval_limit),
        );

        let (indexed, indexed_err) = match indexed {
            Ok(rows) => (rows, None),
            Err(err) => {
                warn!("Indexed retrieval failed for '{normalized}': {err}");
                (Vec::new(), Some(err))
            }
        };
        let (heuristic, heuristic_err) = match heuristic {
            Ok(rows) => (rows, None),
            Err(err) => {
                warn!("Heuristic retrieval failed for '{normalized}': {err}");
                (Vec::new(), Some(err))
            }
        };

        if let (Some(a), Some(b)) = (&indexed_err, &heuristic_err) {
            return Err(SearchError::AllPathsFailed(format!("{a}; {b}")));
        }

        // Merge by record identity, first occurrence wins; the indexed path
        // goes first so its score survives deduplication.
        let mut seen: HashSet<i32> = HashSet::new();
        let mut candidates: Vec<SearchCandidate> = Vec::new();
        for hit in indexed {
            if seen.insert(hit.profile.id) {
                candidates.push(SearchCandidate {
                    profile: hit.profile,
                    index_score: Some(hit.score),
                });
            }
        }
        for row in heuristic {
            if seen.insert(row.id) {
                candidates.push(SearchCandidate {
                    profile: row,
                    index_score: None,
                });
            }
        }

        info!(
            "Search '{normalized}' produced {} candidates",
            candidates.len()
        );

        let ranked = ranking::rank(&normalized, candidates);
        self.cache.set(cache_key, ranked.clone(), self.cache_ttl);

        Ok(ranked)
    }
}
