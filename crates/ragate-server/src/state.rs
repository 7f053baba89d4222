//! Shared application state (spec §5 "immutable post-startup config and
//! provider instances").

use ragate_application::pipelines::{QueryPipeline, UpsertPipeline};
use ragate_domain::config::RagConfig;
use ragate_domain::ports::{EmbeddingProvider, RerankProvider, VectorStoreProvider};
use std::ops::Deref;
use std::sync::Arc;

/// Everything a request handler needs: the resolved providers (kept
/// directly for health checks and collection listing) and the two
/// pipelines built over them.
pub struct AppStateInner {
    /// Loaded configuration; handlers read `auth_token` and `defaults`.
    pub config: Arc<RagConfig>,
    /// C6 query pipeline.
    pub query_pipeline: QueryPipeline,
    /// C7 upsert pipeline.
    pub upsert_pipeline: UpsertPipeline,
    /// Embedding provider, kept directly for `/healthz`.
    pub embedding: Arc<dyn EmbeddingProvider>,
    /// Vector store, kept directly for `/healthz` and `/collections`.
    pub vector_store: Arc<dyn VectorStoreProvider>,
}

/// Cheaply cloneable handle to [`AppStateInner`]; the `State` extractor
/// type for every handler.
#[derive(Clone)]
pub struct AppState(Arc<AppStateInner>);

impl AppState {
    /// Builds the query/upsert pipelines from already-resolved
    /// providers and wraps the result for sharing across request tasks.
    #[must_use]
    pub fn new(config: Arc<RagConfig>, embedding: Arc<dyn EmbeddingProvider>, rerank: Arc<dyn RerankProvider>, vector_store: Arc<dyn VectorStoreProvider>) -> Self {
        let query_pipeline = QueryPipeline::new(Arc::clone(&embedding), rerank, Arc::clone(&vector_store), config.defaults.clone());
        let upsert_pipeline = UpsertPipeline::new(Arc::clone(&embedding), Arc::clone(&vector_store), config.defaults.default_collection.clone());
        Self(Arc::new(AppStateInner {
            config,
            query_pipeline,
            upsert_pipeline,
            embedding,
            vector_store,
        }))
    }
}

impl Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
