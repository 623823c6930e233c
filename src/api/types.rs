use serde::Serialize;

use crate::entities::profile;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub occupations: Vec<String>,
    pub category: Option<String>,
    pub years: Option<String>,
    pub likes: i32,
    pub views: i32,
    pub is_featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_rank: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_since: Option<String>,
    pub created_at: String,
}

impl From<profile::Model> for ProfileDto {
    fn from(model: profile::Model) -> Self {
        let tags = model.tag_list();
        let occupations = model.occupation_list();
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            tags,
            occupations,
            category: model.category,
            years: model.years,
            likes: model.likes,
            views: model.views,
            is_featured: model.is_featured,
            featured_rank: model.featured_rank,
            featured_since: model.featured_since,
            created_at: model.created_at,
        }
    }
}
