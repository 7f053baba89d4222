//! `GET /collections` and `GET /collections/{name}/stats` (spec §6).

use crate::http::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use ragate_domain::entities::CollectionStats;
use serde::Serialize;

/// `GET /collections` response body.
#[derive(Debug, Serialize)]
pub struct CollectionsResponseBody {
    /// All known collection names.
    pub collections: Vec<String>,
}

/// Lists every known collection.
pub async fn list_collections(State(state): State<AppState>) -> Result<Json<CollectionsResponseBody>, ApiError> {
    let collections = state.vector_store.list_collections().await?;
    Ok(Json(CollectionsResponseBody { collections }))
}

/// Reports row count and distinct provenance values for one collection.
/// `404` when the collection doesn't exist.
pub async fn collection_stats(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<CollectionStats>, ApiError> {
    let stats = state.vector_store.get_collection_stats(&name).await?;
    Ok(Json(stats))
}
