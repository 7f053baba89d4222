//! Query pipeline (C6, spec §4.6): embed -> retrieve -> filter ->
//! rerank -> truncate -> expand -> respond.

use ragate_domain::config::Defaults;
use ragate_domain::entities::{Filters, SearchHit};
use ragate_domain::error::Error;
use ragate_domain::ports::{EmbedOptions, EmbeddingProvider, RawScore, RerankProvider, VectorStoreProvider};
use ragate_providers::rerank::rerank_with_cap;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::filters::build_predicate;

/// Which pipeline stage a fatal error originated in, since C8 maps
/// embed failures to `502` and store failures to `500` even though
/// both typically surface as [`Error::Remote`] (spec §4.8, §7).
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Request failed input validation (e.g. a malformed `file_pattern` glob).
    #[error(transparent)]
    Validation(Error),
    /// The embedding provider failed or timed out.
    #[error(transparent)]
    Embed(Error),
    /// The vector store failed or timed out.
    #[error(transparent)]
    Retrieve(Error),
}

impl QueryError {
    /// Unwraps to the underlying domain error, for callers that only
    /// need the detail message and not the stage.
    pub fn into_inner(self) -> Error {
        match self {
            Self::Validation(e) | Self::Embed(e) | Self::Retrieve(e) => e,
        }
    }
}

/// Input to [`QueryPipeline::run`] (spec §4.6).
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// Free-text query.
    pub query: String,
    /// Target collection; falls back to the configured default.
    pub collection: Option<String>,
    /// Maximum hits returned, expected pre-validated to `1..=100`.
    pub top_k: usize,
    /// Neighbor-chunk window, expected pre-validated to `0..=10`.
    pub context_window: u32,
    /// AND-composed metadata filters.
    pub filters: Filters,
    /// Overrides the configured embedding model for this call.
    pub model: Option<String>,
}

/// Output of [`QueryPipeline::run`] (spec §6 `POST /search`).
#[derive(Debug, Clone)]
pub struct QueryResponse {
    /// Ranked hits, length `<= top_k`.
    pub hits: Vec<SearchHit>,
    /// `hits.len()`.
    pub count: usize,
    /// Wall-clock duration of the whole pipeline.
    pub latency_ms: u64,
    /// Active vector-store backend name.
    pub backend: String,
    /// Resolved collection name.
    pub collection: String,
    /// Whether reranking actually ran (false on graceful degradation).
    pub reranked: bool,
}

/// Orchestrates C3 (embed), C5 (retrieve/expand), and C4 (rerank) into
/// one `/search` response.
pub struct QueryPipeline {
    embedding: Arc<dyn EmbeddingProvider>,
    rerank: Arc<dyn RerankProvider>,
    vector_store: Arc<dyn VectorStoreProvider>,
    defaults: Defaults,
}

impl QueryPipeline {
    /// Builds a pipeline over the given providers and default knobs
    /// (`rrf_k`, `default_collection`).
    pub fn new(embedding: Arc<dyn EmbeddingProvider>, rerank: Arc<dyn RerankProvider>, vector_store: Arc<dyn VectorStoreProvider>, defaults: Defaults) -> Self {
        Self {
            embedding,
            rerank,
            vector_store,
            defaults,
        }
    }

    /// Runs the full 9-stage pipeline (spec §4.6).
    pub async fn run(&self, request: QueryRequest) -> Result<QueryResponse, QueryError> {
        let started = Instant::now();

        // 1. Resolve collection.
        let collection = request.collection.clone().unwrap_or_else(|| self.defaults.default_collection.clone());

        // 2. Embed query.
        let mut embed_opts = EmbedOptions::for_query();
        embed_opts.model = request.model.clone();
        let query_vector = self.embedding.embed(&request.query, &embed_opts).await.map_err(QueryError::Embed)?;

        // 3. Overfetch.
        let has_filters = !request.filters.is_empty();
        let overfetch = if has_filters { (4 * request.top_k).max(50) } else { 2 * request.top_k };

        // 4. Hybrid retrieve.
        let retrieved = self
            .vector_store
            .hybrid_search(&collection, &query_vector, &request.query, request.top_k, overfetch, self.defaults.rrf_k)
            .await
            .map_err(QueryError::Retrieve)?;

        // 5. Filter.
        let predicate = build_predicate(&request.filters).map_err(QueryError::Validation)?;
        let filtered: Vec<_> = retrieved.into_iter().filter(|hit| predicate(&hit.chunk)).collect();

        // 6. Rerank (never fatal: failure falls back to passthrough order).
        let texts: Vec<String> = filtered.iter().map(|hit| hit.chunk.text.clone()).collect();
        let rerank_outcome = rerank_with_cap(self.rerank.as_ref(), &request.query, &texts, Some(request.top_k)).await;
        let (order, reranked) = match rerank_outcome {
            Ok(outcome) => (outcome.indices, true),
            Err(err) => {
                tracing::warn!(error = %err, "rerank failed, falling back to hybrid fused order");
                ((0..filtered.len()).collect::<Vec<_>>(), false)
            }
        };

        // 7. Truncate to top_k (rerank_with_cap already passed top_n, this
        // also bounds the passthrough-fallback path).
        let order = order.into_iter().take(request.top_k);

        // 8-9. Expand context and assemble each hit.
        let mut hits = Vec::with_capacity(request.top_k);
        for index in order {
            let Some(candidate) = filtered.get(index) else { continue };
            let score = candidate.raw_score.normalize();

            let surrounding_chunks = if request.context_window > 0 {
                self.vector_store
                    .get_context_chunks(&collection, &candidate.chunk.file_name, candidate.chunk.chunk_index, request.context_window)
                    .await
                    .unwrap_or_default()
            } else {
                Vec::new()
            };

            let mut metadata = BTreeMap::new();
            metadata.insert("file_name".to_owned(), serde_json::Value::String(candidate.chunk.file_name.clone()));
            metadata.insert("file_path".to_owned(), serde_json::Value::String(candidate.chunk.file_path.clone()));
            metadata.insert("page".to_owned(), serde_json::Value::from(candidate.chunk.page));
            metadata.insert("section".to_owned(), serde_json::Value::String(candidate.chunk.section.clone()));
            metadata.insert("mime_type".to_owned(), serde_json::Value::String(candidate.chunk.mime_type.clone()));
            metadata.insert("chunk_index".to_owned(), serde_json::Value::from(candidate.chunk.chunk_index));
            metadata.insert("distance".to_owned(), serde_json::Value::from(raw_distance(candidate.raw_score)));

            hits.push(SearchHit {
                doc_id: candidate.chunk.chunk_id.clone(),
                text: candidate.chunk.text.clone(),
                score,
                metadata,
                surrounding_chunks,
            });
        }

        Ok(QueryResponse {
            count: hits.len(),
            hits,
            latency_ms: started.elapsed().as_millis() as u64,
            backend: self.vector_store.backend_name().to_owned(),
            collection,
            reranked,
        })
    }
}

fn raw_distance(raw: RawScore) -> f64 {
    match raw {
        RawScore::CosineDistance(d) => f64::from(d),
        RawScore::CosineSimilarity(s) => f64::from(s),
    }
}
