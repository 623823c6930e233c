use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, ProfileDto};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
}

pub async fn search_profiles(
    State(state): State<Arc<SharedState>>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<ApiResponse<Vec<ProfileDto>>>, ApiError> {
    let query = request
        .query
        .ok_or_else(|| ApiError::validation("Missing required parameter 'query'"))?;

    let ranked = state.search_service.search(&query).await?;
    let results: Vec<ProfileDto> = ranked.into_iter().map(ProfileDto::from).collect();

    Ok(Json(ApiResponse::success(results)))
}
