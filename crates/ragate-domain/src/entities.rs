//! Core data model (spec §3).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The atomic unit indexed and returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Opaque string, unique within a collection.
    pub chunk_id: String,
    /// Non-empty chunk text.
    pub text: String,
    /// Provenance: source file name, may be empty.
    #[serde(default)]
    pub file_name: String,
    /// Provenance: source file path, may be empty.
    #[serde(default)]
    pub file_path: String,
    /// Page number; `-1` means "not applicable".
    #[serde(default = "default_page")]
    pub page: i64,
    /// Short heading/anchor string, may be empty.
    #[serde(default)]
    pub section: String,
    /// MIME type, may be empty.
    #[serde(default)]
    pub mime_type: String,
    /// Position within `file_name`'s chunk sequence. Dense and
    /// contiguous starting at 0 within a given file (invariant relied
    /// on by neighbor expansion).
    pub chunk_index: u64,
    /// Epoch seconds.
    pub created_at_ts: i64,
    /// Fixed-dimension dense embedding.
    pub dense_vector: Vec<f32>,
    /// Optional lexical representation; when absent the store derives
    /// BM25 tokens from `text`.
    #[serde(default)]
    pub sparse_vector: Option<Vec<(u32, f32)>>,
}

fn default_page() -> i64 {
    -1
}

/// Named container of chunks; carries schema `{dim, analyzer}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collection {
    /// Caller-supplied name (printable characters only).
    pub name: String,
    /// Dense-vector dimension, fixed at first upsert.
    pub dim: usize,
    /// Lexical analyzer identifier used for the BM25 index.
    pub analyzer: String,
}

/// Aggregate statistics for a collection (see `/collections/{name}/stats`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionStats {
    /// Collection name.
    pub name: String,
    /// Number of chunks stored.
    pub row_count: u64,
    /// Distinct `file_name` values observed.
    pub file_names: Vec<String>,
    /// Distinct `mime_type` values observed.
    pub mime_types: Vec<String>,
}

/// A chunk adjacent (by `chunk_index`, same `file_name`) to a search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurroundingChunk {
    /// Position within the file.
    pub chunk_index: u64,
    /// Chunk text.
    pub text: String,
    /// Page number, `-1` if not applicable.
    pub page: i64,
}

/// A returned search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// Equal to the underlying chunk's `chunk_id`.
    pub doc_id: String,
    /// Chunk text.
    pub text: String,
    /// Normalized relevance score in `[0,1]`.
    pub score: f32,
    /// Full chunk fields plus the raw backend distance, for debugging.
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Ordered neighbor chunks, present only when `context_window > 0`.
    #[serde(default)]
    pub surrounding_chunks: Vec<SurroundingChunk>,
}

/// Metadata filters applied between hybrid retrieval and reranking
/// (spec §4.6 step 5). AND-composed; any absent field is not applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Filters {
    /// Exact match against `file_name`.
    pub file_name: Option<String>,
    /// Shell glob matched against `file_name`.
    pub file_pattern: Option<String>,
    /// Exact match against `mime_type`.
    pub mime_type: Option<String>,
}

impl Filters {
    /// True when no filter field is set.
    pub fn is_empty(&self) -> bool {
        self.file_name.is_none() && self.file_pattern.is_none() && self.mime_type.is_none()
    }
}
