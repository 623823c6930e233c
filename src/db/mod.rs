use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::profile;

pub mod migrator;
pub mod repositories;

pub use repositories::profile::{IndexedProfile, NewProfile};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    pub async fn create_profile(&self, input: NewProfile) -> Result<profile::Model> {
        self.profile_repo().create(input).await
    }

    pub async fn get_profile(&self, id: i32) -> Result<Option<profile::Model>> {
        self.profile_repo().get(id).await
    }

    pub async fn all_profiles(&self) -> Result<Vec<profile::Model>> {
        self.profile_repo().all().await
    }

    pub async fn search_text_index(&self, phrase: &str, limit: u64) -> Result<Vec<IndexedProfile>> {
        self.profile_repo().search_text_index(phrase, limit).await
    }

    pub async fn search_patterns(
        &self,
        query: &str,
        terms: &[String],
        limit: u64,
    ) -> Result<Vec<profile::Model>> {
        self.profile_repo()
            .search_patterns(query, terms, limit)
            .await
    }

    pub async fn featured_profiles(&self) -> Result<Vec<profile::Model>> {
        self.profile_repo().featured().await
    }

    pub async fn clear_featured(&self) -> Result<u64> {
        self.profile_repo().clear_featured().await
    }

    pub async fn top_profiles_by_likes(&self, k: u64) -> Result<Vec<profile::Model>> {
        self.profile_repo().top_by_likes(k).await
    }

    pub async fn set_featured(&self, id: i32, rank: i32, since: &str) -> Result<()> {
        self.profile_repo().set_featured(id, rank, since).await
    }

    pub async fn set_featured_since(&self, id: i32, since: &str) -> Result<()> {
        self.profile_repo().set_featured_since(id, since).await
    }
}
