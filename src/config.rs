use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub search: SearchConfig,

    pub featured: FeaturedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// SQLite database location, `sqlite:` prefixed.
    pub database_path: String,

    pub log_level: String,

    /// 0 lets tokio pick the worker count.
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_level: "info".to_string(),
            worker_threads: 0,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7878,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// TTL for cached search results. Short is safe: results are fully
    /// recomputable from the store.
    pub cache_ttl_seconds: u64,

    /// Per-retrieval-path candidate bound.
    pub retrieval_limit: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: constants::cache::SEARCH_TTL_SECONDS,
            retrieval_limit: constants::limits::RETRIEVAL_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturedConfig {
    /// Size of the featured subset (k).
    pub size: usize,

    /// Freshness window between rotations, in hours.
    pub refresh_hours: i64,
}

impl Default for FeaturedConfig {
    fn default() -> Self {
        Self {
            size: constants::featured::SET_SIZE,
            refresh_hours: constants::featured::REFRESH_HOURS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            search: SearchConfig::default(),
            featured: FeaturedConfig::default(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pantheon")
}

fn default_database_path() -> String {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pantheon");
    format!("sqlite:{}", dir.join("pantheon.db").display())
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = config_dir().join("config.toml");
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: Self = toml::from_str(&raw)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            Ok(config)
        } else {
            let config = Self::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            if let Ok(raw) = toml::to_string_pretty(&config) {
                if std::fs::write(path, raw).is_ok() {
                    info!("Wrote default config to {}", path.display());
                }
            }
            Ok(config)
        }
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.general.database_path.is_empty(),
            "general.database_path must not be empty"
        );
        anyhow::ensure!(self.server.port != 0, "server.port must not be 0");
        anyhow::ensure!(self.featured.size > 0, "featured.size must be at least 1");
        anyhow::ensure!(
            self.featured.refresh_hours > 0,
            "featured.refresh_hours must be at least 1"
        );
        anyhow::ensure!(
            self.search.retrieval_limit > 0,
            "search.retrieval_limit must be at least 1"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.featured.size, 3);
        assert_eq!(config.featured.refresh_hours, 24);
    }

    #[test]
    fn rejects_zero_featured_size() {
        let mut config = Config::default();
        config.featured.size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_writes_the_default_once_and_reads_it_back() {
        let dir = std::env::temp_dir().join(format!("pantheon-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");

        let first = Config::load_from(&path).unwrap();
        assert!(path.exists());
        let written = std::fs::read_to_string(&path).unwrap();

        // A second load reads the existing file instead of rewriting it.
        let second = Config::load_from(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), written);
        assert_eq!(second.featured.size, first.featured.size);
        assert_eq!(second.server.port, first.server.port);

        std::fs::remove_dir_all(&dir).ok();
    }
}
