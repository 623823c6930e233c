use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// JSON array of tag strings.
    pub tags: Option<String>,
    /// JSON array of occupation strings.
    pub occupations: Option<String>,
    pub category: Option<String>,
    /// Lifespan or active-years label, e.g. "1822-1913".
    pub years: Option<String>,
    pub likes: i32,
    /// JSON array of user ids that liked this profile.
    pub liked_by: Option<String>,
    pub views: i32,
    pub search_hits: i32,
    pub is_featured: bool,
    /// 1..k when featured, absent otherwise.
    pub featured_rank: Option<i32>,
    pub featured_since: Option<String>,
    pub created_at: String, // RFC3339, SQLite stores timestamps as text
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        Self::parse_json_list(self.tags.as_deref())
    }

    #[must_use]
    pub fn occupation_list(&self) -> Vec<String> {
        Self::parse_json_list(self.occupations.as_deref())
    }

    #[must_use]
    pub fn liked_by_list(&self) -> Vec<String> {
        Self::parse_json_list(self.liked_by.as_deref())
    }

    fn parse_json_list(raw: Option<&str>) -> Vec<String> {
        raw.map_or_else(Vec::new, |json| {
            serde_json::from_str(json).unwrap_or_default()
        })
    }
}
