use std::collections::{HashMap, HashSet};

use crate::constants::limits;
use crate::entities::{prelude::*, profile};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbBackend, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set, Statement,
};

/// Input for seeding/ingesting a profile. Record creation itself belongs to
/// the ingestion side of the system; this repository only needs enough of it
/// to exist for tests and fixtures.
#[derive(Debug, Clone, Default)]
pub struct NewProfile {
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub occupations: Vec<String>,
    pub category: Option<String>,
    pub years: Option<String>,
    pub likes: i32,
    pub created_at: Option<String>,
}

/// A profile returned by the text-index path, carrying the index's native
/// relevance score.
#[derive(Debug, Clone)]
pub struct IndexedProfile {
    pub profile: profile::Model,
    pub score: f64,
}

#[derive(Debug, FromQueryResult)]
struct IndexedHit {
    id: i32,
    score: f64,
}

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, input: NewProfile) -> Result<profile::Model> {
        let created_at = input
            .created_at
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

        let active_model = profile::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            tags: Set(encode_list(&input.tags)),
            occupations: Set(encode_list(&input.occupations)),
            category: Set(input.category),
            years: Set(input.years),
            likes: Set(input.likes),
            created_at: Set(created_at),
            ..Default::default()
        };

        let model = active_model.insert(&self.conn).await?;
        Ok(model)
    }

    pub async fn get(&self, id: i32) -> Result<Option<profile::Model>> {
        Ok(Profile::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn all(&self) -> Result<Vec<profile::Model>> {
        Ok(Profile::find()
            .order_by_asc(profile::Column::Id)
            .all(&self.conn)
            .await?)
    }

    /// Exact-phrase lookup against the FTS5 index, bounded to the top
    /// `limit` rows by the index's bm25 relevance. bm25 is
    /// smaller-is-better, so the score is negated before it leaves here.
    pub async fn search_text_index(&self, phrase: &str, limit: u64) -> Result<Vec<IndexedProfile>> {
        // Quote the whole query so FTS treats it as one phrase; embedded
        // double quotes would terminate the phrase early.
        let match_expr = format!("\"{}\"", phrase.replace('"', ""));

        let hits = IndexedHit::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "SELECT p.id AS id, -bm25(profiles_fts) AS score
             FROM profiles_fts
             JOIN profiles p ON p.id = profiles_fts.rowid
             WHERE profiles_fts MATCH ?
             ORDER BY bm25(profiles_fts)
             LIMIT ?",
            [match_expr.into(), i64::try_from(limit).unwrap_or(50).into()],
        ))
        .all(&self.conn)
        .await?;

        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = hits.iter().map(|h| h.id).collect();
        let models = Profile::find()
            .filter(profile::Column::Id.is_in(ids))
            .all(&self.conn)
            .await?;
        let mut by_id: HashMap<i32, profile::Model> =
            models.into_iter().map(|m| (m.id, m)).collect();

        // Preserve the index's ordering.
        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                by_id.remove(&hit.id).map(|profile| IndexedProfile {
                    profile,
                    score: hit.score,
                })
            })
            .collect())
    }

    /// Progressively looser pattern probes, first match wins across tiers:
    /// anchored-start, anywhere-in-name, all-terms-any-order, any single
    /// term of at least two characters, then occupation/category/tags/years.
    pub async fn search_patterns(
        &self,
        query: &str,
        terms: &[String],
        limit: u64,
    ) -> Result<Vec<profile::Model>> {
        let mut merged: Vec<profile::Model> = Vec::new();
        let mut seen: HashSet<i32> = HashSet::new();

        let all_terms = terms.iter().fold(Condition::all(), |cond, term| {
            cond.add(profile::Column::Name.contains(term))
        });

        let any_term = terms
            .iter()
            .filter(|term| term.chars().count() >= limits::MIN_TERM_LEN)
            .fold(Condition::any(), |cond, term| {
                cond.add(profile::Column::Name.contains(term))
            });

        let metadata = Condition::any()
            .add(profile::Column::Occupations.contains(query))
            .add(profile::Column::Category.contains(query))
            .add(profile::Column::Tags.contains(query))
            .add(profile::Column::Years.contains(query));

        let tiers: Vec<Condition> = vec![
            Condition::all().add(profile::Column::Name.starts_with(query)),
            Condition::all().add(profile::Column::Name.contains(query)),
            all_terms,
            any_term,
            metadata,
        ];

        for tier in tiers {
            if merged.len() as u64 >= limit {
                break;
            }
            let rows = Profile::find()
                .filter(tier)
                .order_by_asc(profile::Column::Id)
                .limit(limit)
                .all(&self.conn)
                .await?;
            for row in rows {
                if merged.len() as u64 >= limit {
                    break;
                }
                if seen.insert(row.id) {
                    merged.push(row);
                }
            }
        }

        Ok(merged)
    }

    pub async fn featured(&self) -> Result<Vec<profile::Model>> {
        Ok(Profile::find()
            .filter(profile::Column::IsFeatured.eq(true))
            .order_by_asc(profile::Column::FeaturedRank)
            .all(&self.conn)
            .await?)
    }

    /// Phase one of the rotation: unflag everything currently featured.
    pub async fn clear_featured(&self) -> Result<u64> {
        let result = Profile::update_many()
            .filter(profile::Column::IsFeatured.eq(true))
            .col_expr(
                profile::Column::IsFeatured,
                sea_orm::sea_query::Expr::value(false),
            )
            .col_expr(
                profile::Column::FeaturedRank,
                sea_orm::sea_query::Expr::value(Option::<i32>::None),
            )
            .col_expr(
                profile::Column::FeaturedSince,
                sea_orm::sea_query::Expr::value(Option::<String>::None),
            )
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Top-k candidates for the featured set: likes descending, ties broken
    /// by most recent creation.
    pub async fn top_by_likes(&self, k: u64) -> Result<Vec<profile::Model>> {
        Ok(Profile::find()
            .order_by_desc(profile::Column::Likes)
            .order_by_desc(profile::Column::CreatedAt)
            .limit(k)
            .all(&self.conn)
            .await?)
    }

    pub async fn set_featured(&self, id: i32, rank: i32, since: &str) -> Result<()> {
        Profile::update_many()
            .filter(profile::Column::Id.eq(id))
            .col_expr(
                profile::Column::IsFeatured,
                sea_orm::sea_query::Expr::value(true),
            )
            .col_expr(
                profile::Column::FeaturedRank,
                sea_orm::sea_query::Expr::value(Some(rank)),
            )
            .col_expr(
                profile::Column::FeaturedSince,
                sea_orm::sea_query::Expr::value(Some(since.to_string())),
            )
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    /// Backdates a featured timestamp; staleness tests drive the freshness
    /// window through this.
    pub async fn set_featured_since(&self, id: i32, since: &str) -> Result<()> {
        Profile::update_many()
            .filter(profile::Column::Id.eq(id))
            .col_expr(
                profile::Column::FeaturedSince,
                sea_orm::sea_query::Expr::value(Some(since.to_string())),
            )
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}

fn encode_list(items: &[String]) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        serde_json::to_string(items).ok()
    }
}
