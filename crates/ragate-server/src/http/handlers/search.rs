//! `POST /search` (spec §6, §4.6).

use crate::http::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use ragate_application::pipelines::QueryRequest;
use ragate_domain::entities::{Filters, SurroundingChunk};
use ragate_domain::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_top_k() -> usize {
    5
}

/// `POST /search` request body.
#[derive(Debug, Deserialize)]
pub struct SearchBody {
    /// Free-text query; must be non-empty.
    pub query: String,
    /// Target collection; falls back to the configured default.
    #[serde(default)]
    pub collection: Option<String>,
    /// Maximum hits returned; must be in `1..=100`.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Neighbor-chunk window; must be in `0..=10`.
    #[serde(default)]
    pub context_window: u32,
    /// AND-composed metadata filters.
    #[serde(default)]
    pub filters: Filters,
    /// Overrides the configured embedding model for this call.
    #[serde(default)]
    pub model: Option<String>,
}

/// One returned hit.
#[derive(Debug, Serialize)]
pub struct SearchHitBody {
    /// Equal to the underlying chunk's id.
    pub doc_id: String,
    /// Chunk text.
    pub text: String,
    /// Normalized relevance score in `[0,1]`.
    pub score: f32,
    /// Chunk fields plus the raw backend distance, for debugging.
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Neighbor chunks, present only when `context_window > 0`.
    pub surrounding_chunks: Vec<SurroundingChunk>,
}

/// `POST /search` response body.
#[derive(Debug, Serialize)]
pub struct SearchResponseBody {
    /// Ranked hits, length `<= top_k`.
    pub hits: Vec<SearchHitBody>,
    /// `hits.len()`.
    pub count: usize,
    /// Whether reranking actually ran.
    pub reranked: bool,
    /// Active vector-store backend name.
    pub backend: String,
    /// Resolved collection name.
    pub collection: String,
    /// Wall-clock duration of the whole pipeline.
    pub latency_ms: u64,
}

/// Embeds the query and returns ranked, optionally reranked and
/// context-expanded, hits.
pub async fn search(State(state): State<AppState>, Json(body): Json<SearchBody>) -> Result<Json<SearchResponseBody>, ApiError> {
    if body.query.is_empty() {
        return Err(ApiError::from(Error::validation("query", "must not be empty")));
    }
    if !(1..=100).contains(&body.top_k) {
        return Err(ApiError::from(Error::validation("top_k", "must be between 1 and 100")));
    }
    if body.context_window > 10 {
        return Err(ApiError::from(Error::validation("context_window", "must be between 0 and 10")));
    }

    let has_filters = !body.filters.is_empty();
    let top_k = body.top_k;

    let response = state
        .query_pipeline
        .run(QueryRequest {
            query: body.query,
            collection: body.collection,
            top_k,
            context_window: body.context_window,
            filters: body.filters,
            model: body.model,
        })
        .await
        .map_err(ApiError::from)?;

    tracing::info!(
        collection = %response.collection,
        top_k,
        has_filters,
        reranked = response.reranked,
        hit_count = response.count,
        latency_ms = response.latency_ms,
        "search completed"
    );

    Ok(Json(SearchResponseBody {
        hits: response
            .hits
            .into_iter()
            .map(|hit| SearchHitBody {
                doc_id: hit.doc_id,
                text: hit.text,
                score: hit.score,
                metadata: hit.metadata,
                surrounding_chunks: hit.surrounding_chunks,
            })
            .collect(),
        count: response.count,
        reranked: response.reranked,
        backend: response.backend,
        collection: response.collection,
        latency_ms: response.latency_ms,
    }))
}
