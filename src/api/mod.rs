use axum::{Json, Router, extract::State, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

mod error;
mod featured;
mod search;
mod types;

pub use error::ApiError;
pub use types::{ApiResponse, ProfileDto};

#[must_use]
pub fn router(state: Arc<SharedState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/search", get(search::search_profiles))
        .route("/api/featured", get(featured::featured_profiles))
        .route("/api/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(
    State(state): State<Arc<SharedState>>,
) -> Result<Json<ApiResponse<&'static str>>, ApiError> {
    state.store.ping().await?;
    Ok(Json(ApiResponse::success("ok")))
}
