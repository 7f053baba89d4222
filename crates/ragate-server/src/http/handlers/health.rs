//! `GET /healthz` (spec §6). Never behind auth.

use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

/// Reports `"ok"` when every provider's liveness probe succeeds, or
/// `"degraded"` when one doesn't - folding sub-checks into a single
/// status rather than failing the whole endpoint.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let embedding_ok = state.embedding.health_check().await.is_ok();
    let store_ok = state.vector_store.health_check().await.is_ok();
    let status = if embedding_ok && store_ok { "ok" } else { "degraded" };

    let collections = state.vector_store.list_collections().await.map(|names| names.len() as i64).unwrap_or(-1);

    Json(json!({
        "status": status,
        "backend": state.vector_store.backend_name(),
        "collections": collections,
    }))
}
