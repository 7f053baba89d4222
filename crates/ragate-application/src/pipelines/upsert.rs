//! Upsert pipeline (C7, spec §4.7): embed -> materialize collection ->
//! insert.

use ragate_domain::entities::Chunk;
use ragate_domain::error::Error;
use ragate_domain::ports::{EmbedOptions, EmbeddingProvider, VectorStoreProvider};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Which pipeline stage a fatal error originated in (mirrors
/// [`crate::pipelines::query::QueryError`]'s rationale).
#[derive(Debug, thiserror::Error)]
pub enum UpsertError {
    /// Request failed input validation, or the target collection's
    /// dense-vector dimension doesn't match the embedder's output.
    #[error(transparent)]
    Validation(Error),
    /// The embedding provider failed or timed out.
    #[error(transparent)]
    Embed(Error),
    /// The vector store failed or timed out.
    #[error(transparent)]
    Store(Error),
}

impl UpsertError {
    /// Unwraps to the underlying domain error.
    pub fn into_inner(self) -> Error {
        match self {
            Self::Validation(e) | Self::Embed(e) | Self::Store(e) => e,
        }
    }
}

/// Caller-supplied metadata for one document, defaulted per spec §4.7
/// step 5 when a field is absent.
#[derive(Debug, Clone, Default)]
pub struct UpsertMetadata {
    /// Source file name.
    pub file_name: Option<String>,
    /// Source file path.
    pub file_path: Option<String>,
    /// Page number; defaults to `-1` ("not applicable").
    pub page: Option<i64>,
    /// Heading/anchor string.
    pub section: Option<String>,
    /// MIME type; defaults to empty.
    pub mime_type: Option<String>,
    /// Epoch seconds; defaults to the server's current time.
    pub created_at_ts: Option<i64>,
    /// Position within the file's chunk sequence; defaults to the
    /// document's position within this request.
    pub chunk_index: Option<u64>,
}

/// One document to index.
#[derive(Debug, Clone)]
pub struct UpsertDocument {
    /// Caller-supplied id, carried verbatim when present.
    pub doc_id: Option<String>,
    /// Non-empty chunk text.
    pub text: String,
    /// Metadata, defaulted where absent.
    pub metadata: UpsertMetadata,
}

/// Input to [`UpsertPipeline::run`] (spec §4.7).
#[derive(Debug, Clone)]
pub struct UpsertRequest {
    /// At least one document, each with non-empty `text`.
    pub documents: Vec<UpsertDocument>,
    /// Target collection; falls back to the configured default.
    pub collection: Option<String>,
    /// Overrides the configured embedding model for this call.
    pub model: Option<String>,
}

/// Output of [`UpsertPipeline::run`] (spec §6 `POST /upsert`).
#[derive(Debug, Clone)]
pub struct UpsertResponse {
    /// Number of documents inserted.
    pub inserted: usize,
    /// Resulting collection size, or `-1` when the backend can't report
    /// it cheaply (spec §4.7 step 7).
    pub total: i64,
    /// Active vector-store backend name.
    pub backend: String,
    /// Resolved collection name.
    pub collection: String,
}

/// Orchestrates C3 (embed) and C5 (collection lifecycle + insert) into
/// one `/upsert` response.
pub struct UpsertPipeline {
    embedding: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStoreProvider>,
    default_collection: String,
}

impl UpsertPipeline {
    /// Builds a pipeline over the given providers.
    pub fn new(embedding: Arc<dyn EmbeddingProvider>, vector_store: Arc<dyn VectorStoreProvider>, default_collection: impl Into<String>) -> Self {
        Self {
            embedding,
            vector_store,
            default_collection: default_collection.into(),
        }
    }

    /// Runs the full pipeline (spec §4.7).
    pub async fn run(&self, request: UpsertRequest) -> Result<UpsertResponse, UpsertError> {
        if request.documents.is_empty() {
            return Err(UpsertError::Validation(Error::validation("documents", "at least one document is required")));
        }
        for (index, document) in request.documents.iter().enumerate() {
            if document.text.is_empty() {
                return Err(UpsertError::Validation(Error::validation("documents", format!("document at index {index} has empty text"))));
            }
        }

        // 1. Resolve target collection.
        let collection = request.collection.clone().unwrap_or_else(|| self.default_collection.clone());

        // 2. Embed all texts in one call.
        let texts: Vec<String> = request.documents.iter().map(|d| d.text.clone()).collect();
        let mut embed_opts = EmbedOptions::for_document();
        embed_opts.model = request.model.clone();
        let outcome = self.embedding.embed_batch(&texts, &embed_opts).await.map_err(UpsertError::Embed)?;
        if outcome.vectors.len() != texts.len() {
            return Err(UpsertError::Embed(Error::format(
                self.embedding.provider_name(),
                format!("expected {} embeddings, got {}", texts.len(), outcome.vectors.len()),
            )));
        }

        // 3. Materialize the collection, checking dimension agreement.
        let dim = outcome.vectors[0].len();
        let existing_dim = self.vector_store.get_or_create_collection(&collection, dim).await.map_err(UpsertError::Store)?;
        if existing_dim != dim {
            return Err(UpsertError::Validation(Error::validation(
                "collection",
                format!("'{collection}' has dimension {existing_dim}, but the embedder produced {dim}"),
            )));
        }

        let now = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0);

        // 4-5. Synthesize ids and build chunk records.
        let chunks: Vec<Chunk> = request
            .documents
            .iter()
            .zip(outcome.vectors.into_iter())
            .enumerate()
            .map(|(index, (document, dense_vector))| Chunk {
                chunk_id: document.doc_id.clone().unwrap_or_else(|| format!("doc-{index}-{now}")),
                text: document.text.clone(),
                file_name: document.metadata.file_name.clone().unwrap_or_default(),
                file_path: document.metadata.file_path.clone().unwrap_or_default(),
                page: document.metadata.page.unwrap_or(-1),
                section: document.metadata.section.clone().unwrap_or_default(),
                mime_type: document.metadata.mime_type.clone().unwrap_or_default(),
                chunk_index: document.metadata.chunk_index.unwrap_or(index as u64),
                created_at_ts: document.metadata.created_at_ts.unwrap_or(now),
                dense_vector,
                sparse_vector: None,
            })
            .collect();

        // 6. Insert.
        self.vector_store.insert_chunks(&collection, &chunks).await.map_err(UpsertError::Store)?;

        // 7. Respond. Only the memory backend can report an exact total cheaply.
        let total = if self.vector_store.backend_name() == "memory" {
            self.vector_store
                .get_collection_stats(&collection)
                .await
                .map(|stats| stats.row_count as i64)
                .unwrap_or(-1)
        } else {
            -1
        };

        Ok(UpsertResponse {
            inserted: chunks.len(),
            total,
            backend: self.vector_store.backend_name().to_owned(),
            collection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragate_domain::error::Result;
    use ragate_domain::ports::{EmbedOutcome, Usage};
    use ragate_providers::vector_store::InMemoryVectorStore;

    struct FixedEmbeddingProvider {
        dim: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedEmbeddingProvider {
        async fn embed_batch(&self, texts: &[String], _opts: &EmbedOptions) -> Result<EmbedOutcome> {
            Ok(EmbedOutcome {
                vectors: texts.iter().map(|_| vec![1.0; self.dim]).collect(),
                model: "fixed".to_owned(),
                usage: Usage::default(),
            })
        }
        fn dimensions(&self) -> usize {
            self.dim
        }
        fn provider_name(&self) -> &str {
            "fixed"
        }
    }

    fn doc(text: &str) -> UpsertDocument {
        UpsertDocument {
            doc_id: None,
            text: text.to_owned(),
            metadata: UpsertMetadata::default(),
        }
    }

    #[tokio::test]
    async fn empty_documents_is_a_validation_error() {
        let pipeline = UpsertPipeline::new(Arc::new(FixedEmbeddingProvider { dim: 2 }), Arc::new(InMemoryVectorStore::new(1000)), "default");
        let result = pipeline
            .run(UpsertRequest {
                documents: vec![],
                collection: None,
                model: None,
            })
            .await;
        assert!(matches!(result, Err(UpsertError::Validation(_))));
    }

    #[tokio::test]
    async fn inserts_and_reports_exact_total_for_memory_backend() {
        let pipeline = UpsertPipeline::new(Arc::new(FixedEmbeddingProvider { dim: 2 }), Arc::new(InMemoryVectorStore::new(1000)), "default");
        let response = pipeline
            .run(UpsertRequest {
                documents: vec![doc("alpha"), doc("beta")],
                collection: None,
                model: None,
            })
            .await
            .expect("ok");
        assert_eq!(response.inserted, 2);
        assert_eq!(response.total, 2);
        assert_eq!(response.backend, "memory");
    }

    #[tokio::test]
    async fn synthesizes_doc_id_when_absent() {
        let store = Arc::new(InMemoryVectorStore::new(1000));
        let pipeline = UpsertPipeline::new(Arc::new(FixedEmbeddingProvider { dim: 2 }), store.clone(), "default");
        pipeline
            .run(UpsertRequest {
                documents: vec![doc("alpha")],
                collection: None,
                model: None,
            })
            .await
            .expect("ok");

        let stats = store.get_collection_stats("default").await.expect("ok");
        assert_eq!(stats.row_count, 1);
    }

    #[tokio::test]
    async fn dimension_mismatch_against_existing_collection_is_a_validation_error() {
        let store = Arc::new(InMemoryVectorStore::new(1000));
        store.ensure_collection("default", 4).await.expect("ok");
        let pipeline = UpsertPipeline::new(Arc::new(FixedEmbeddingProvider { dim: 2 }), store, "default");
        let result = pipeline
            .run(UpsertRequest {
                documents: vec![doc("alpha")],
                collection: None,
                model: None,
            })
            .await;
        assert!(matches!(result, Err(UpsertError::Validation(_))));
    }
}
