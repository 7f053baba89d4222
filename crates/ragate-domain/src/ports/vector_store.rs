//! Vector-store adapter port (C5, spec §4.5).

use crate::entities::{Chunk, CollectionStats, SurroundingChunk};
use crate::error::Result;
use async_trait::async_trait;

/// A backend-reported relevance measure, kept in its native form so
/// the query pipeline (C6) performs normalization per spec §4.5 rather
/// than baking one convention into every adapter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawScore {
    /// Cosine distance in `[0,2]`, lower is more relevant (typical ANN
    /// backends, e.g. Milvus).
    CosineDistance(f32),
    /// Cosine similarity in `[-1,1]`, higher is more relevant (the
    /// in-memory test backend).
    CosineSimilarity(f32),
}

impl RawScore {
    /// Normalizes to `[0,1]`, monotone in relevance, per spec §4.5.
    pub fn normalize(self) -> f32 {
        match self {
            Self::CosineDistance(d) => (1.0 - d).clamp(0.0, 1.0),
            Self::CosineSimilarity(s) => ((s + 1.0) / 2.0).clamp(0.0, 1.0),
        }
    }
}

/// A candidate returned by [`VectorStoreProvider::hybrid_search`],
/// before rerank/score-normalization (C6's job).
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedHit {
    /// The underlying chunk, including its dense vector and metadata.
    pub chunk: Chunk,
    /// The backend's native relevance measure for this candidate.
    pub raw_score: RawScore,
}

/// Abstracts a vector store supporting collection lifecycle, hybrid
/// dense+lexical search, and neighbor-chunk retrieval (spec §4.5).
///
/// Implementations are constructed once at startup and shared; they
/// must provide per-call atomicity for [`insert_chunks`](Self::insert_chunks)
/// (spec §5 "Shared resources").
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Idempotently creates `name` with the given dense-vector
    /// dimension if it does not already exist.
    async fn ensure_collection(&self, name: &str, dim: usize) -> Result<()>;

    /// Returns the existing collection's dimension, or creates it with
    /// `dim` if absent. Never drops an existing collection.
    async fn get_or_create_collection(&self, name: &str, dim: usize) -> Result<usize>;

    /// Inserts or replaces (by `chunk_id`) every chunk in `chunks`,
    /// atomically per call.
    async fn insert_chunks(&self, collection: &str, chunks: &[Chunk]) -> Result<()>;

    /// Dense kNN + lexical BM25 retrieval, fused via Reciprocal Rank
    /// Fusion and truncated to `top_k` (spec §4.5).
    async fn hybrid_search(
        &self,
        collection: &str,
        query_vector: &[f32],
        query_text: &str,
        top_k: usize,
        overfetch: usize,
        rrf_k: u32,
    ) -> Result<Vec<RetrievedHit>>;

    /// Chunks from `file_name` whose `chunk_index` falls in
    /// `[chunk_index - window, chunk_index + window]`, excluding
    /// `chunk_index` itself, ordered ascending.
    async fn get_context_chunks(
        &self,
        collection: &str,
        file_name: &str,
        chunk_index: u64,
        window: u32,
    ) -> Result<Vec<SurroundingChunk>>;

    /// Lists all known collection names.
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Row count plus distinct `file_name`/`mime_type` values (spec §9
    /// allows a reasonable approximation on large collections).
    async fn get_collection_stats(&self, name: &str) -> Result<CollectionStats>;

    /// Stable backend identifier used in logs, e.g. `"milvus"`.
    fn backend_name(&self) -> &str;

    /// Cheap liveness probe; default lists collections.
    async fn health_check(&self) -> Result<()> {
        self.list_collections().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_distance_normalizes_inverted() {
        assert_eq!(RawScore::CosineDistance(0.0).normalize(), 1.0);
        assert_eq!(RawScore::CosineDistance(2.0).normalize(), 0.0);
        assert_eq!(RawScore::CosineDistance(1.0).normalize(), 0.0);
    }

    #[test]
    fn cosine_similarity_normalizes_to_unit_interval() {
        assert_eq!(RawScore::CosineSimilarity(1.0).normalize(), 1.0);
        assert_eq!(RawScore::CosineSimilarity(-1.0).normalize(), 0.0);
        assert_eq!(RawScore::CosineSimilarity(0.0).normalize(), 0.5);
    }
}
