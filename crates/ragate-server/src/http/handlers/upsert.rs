//! `POST /upsert` (spec §6, §4.7).

use crate::http::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use ragate_application::pipelines::{UpsertDocument, UpsertMetadata, UpsertRequest};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// One document in an upsert request body.
#[derive(Debug, Deserialize)]
pub struct UpsertDocumentBody {
    /// Caller-supplied id; synthesized server-side when absent.
    #[serde(default)]
    pub doc_id: Option<String>,
    /// Non-empty chunk text.
    pub text: String,
    /// Source file name.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Source file path.
    #[serde(default)]
    pub file_path: Option<String>,
    /// Page number.
    #[serde(default)]
    pub page: Option<i64>,
    /// Heading/anchor string.
    #[serde(default)]
    pub section: Option<String>,
    /// MIME type.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Epoch seconds; defaults to the server's current time.
    #[serde(default)]
    pub created_at_ts: Option<i64>,
    /// Position within the file's chunk sequence.
    #[serde(default)]
    pub chunk_index: Option<u64>,
}

/// `POST /upsert` request body.
#[derive(Debug, Deserialize)]
pub struct UpsertBody {
    /// Documents to index; at least one is required.
    pub documents: Vec<UpsertDocumentBody>,
    /// Target collection; falls back to the configured default.
    #[serde(default)]
    pub collection: Option<String>,
    /// Overrides the configured embedding model for this call.
    #[serde(default)]
    pub model: Option<String>,
}

/// `POST /upsert` response body.
#[derive(Debug, Serialize)]
pub struct UpsertResponseBody {
    /// Number of documents inserted.
    pub inserted: usize,
    /// Resulting collection size, or `-1` when the backend can't report
    /// it cheaply.
    pub total: i64,
    /// Active vector-store backend name.
    pub backend: String,
    /// Resolved collection name.
    pub collection: String,
}

/// Embeds and indexes the given documents.
pub async fn upsert(State(state): State<AppState>, Json(body): Json<UpsertBody>) -> Result<Json<UpsertResponseBody>, ApiError> {
    let started = Instant::now();

    let documents: Vec<UpsertDocument> = body
        .documents
        .into_iter()
        .map(|document| UpsertDocument {
            doc_id: document.doc_id,
            text: document.text,
            metadata: UpsertMetadata {
                file_name: document.file_name,
                file_path: document.file_path,
                page: document.page,
                section: document.section,
                mime_type: document.mime_type,
                created_at_ts: document.created_at_ts,
                chunk_index: document.chunk_index,
            },
        })
        .collect();

    let response = state
        .upsert_pipeline
        .run(UpsertRequest {
            documents,
            collection: body.collection,
            model: body.model,
        })
        .await
        .map_err(ApiError::from)?;

    tracing::info!(
        collection = %response.collection,
        inserted = response.inserted,
        backend = %response.backend,
        latency_ms = started.elapsed().as_millis() as u64,
        "upsert completed"
    );

    Ok(Json(UpsertResponseBody {
        inserted: response.inserted,
        total: response.total,
        backend: response.backend,
        collection: response.collection,
    }))
}
