use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, ProfileDto};
use crate::entities::profile;
use crate::state::SharedState;

pub async fn featured_profiles(
    State(state): State<Arc<SharedState>>,
) -> Result<(HeaderMap, Json<ApiResponse<Vec<ProfileDto>>>), ApiError> {
    let featured = state.featured_service.get_or_refresh_featured().await?;

    let mut headers = HeaderMap::new();
    if let Some(max_age) = remaining_freshness_seconds(&featured, state.config.featured.refresh_hours)
    {
        if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={max_age}")) {
            headers.insert(header::CACHE_CONTROL, value);
        }
    }

    let results: Vec<ProfileDto> = featured.into_iter().map(ProfileDto::from).collect();
    Ok((headers, Json(ApiResponse::success(results))))
}

/// Seconds left in the freshness window, derived from the freshest
/// `featured_since` stamp. The rotation owns the stamps; this layer only
/// turns them into cache headers.
fn remaining_freshness_seconds(featured: &[profile::Model], refresh_hours: i64) -> Option<i64> {
    let freshest = featured
        .iter()
        .filter_map(|record| record.featured_since.as_deref())
        .filter_map(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
        .map(|ts| ts.with_timezone(&chrono::Utc))
        .max()?;

    let elapsed = (chrono::Utc::now() - freshest).num_seconds();
    let window = refresh_hours * 3600;
    Some((window - elapsed).max(0))
}
