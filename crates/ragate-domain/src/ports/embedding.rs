//! Embedding provider port (C3, spec §4.3).

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Per-call overrides for [`EmbeddingProvider::embed_batch`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedOptions {
    /// Overrides the provider's configured model for this call.
    pub model: Option<String>,
    /// Overrides the response encoding format, when the backend
    /// supports more than one.
    pub encoding_format: Option<String>,
    /// When `true` (the default) and a service URL is configured, the
    /// service-first wrapper tries it before the direct provider.
    #[serde(default = "default_prefer_service")]
    pub prefer_service: bool,
    /// Cohere-style `input_type`: `"search_document"` for upsert,
    /// `"search_query"` for queries. Ignored by providers that don't
    /// distinguish.
    pub input_type: Option<InputType>,
}

fn default_prefer_service() -> bool {
    true
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            model: None,
            encoding_format: None,
            prefer_service: default_prefer_service(),
            input_type: None,
        }
    }
}

impl EmbedOptions {
    /// Options for embedding upsert-side document text.
    pub fn for_document() -> Self {
        Self {
            input_type: Some(InputType::SearchDocument),
            ..Default::default()
        }
    }

    /// Options for embedding a query string.
    pub fn for_query() -> Self {
        Self {
            input_type: Some(InputType::SearchQuery),
            ..Default::default()
        }
    }
}

/// Cohere-style embedding purpose tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Text being stored for later retrieval.
    SearchDocument,
    /// Text being used to query the index.
    SearchQuery,
}

/// Token-usage accounting returned alongside vectors, when the backend
/// reports it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Tokens consumed by the request, when reported by the backend.
    pub prompt_tokens: Option<u64>,
}

/// Result of an [`EmbeddingProvider::embed_batch`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedOutcome {
    /// One vector per input, in input order. Same length as the input.
    pub vectors: Vec<Vec<f32>>,
    /// Model name actually used.
    pub model: String,
    /// Usage accounting, if the backend reported it.
    pub usage: Usage,
}

/// Uniform `Embed(texts) -> vectors` contract (spec §4.3).
///
/// Implementations are constructed once at startup from config and are
/// stateless per request beyond a shared, pooled HTTP client.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single piece of text.
    ///
    /// Default implementation delegates to [`embed_batch`](Self::embed_batch).
    async fn embed(&self, text: &str, opts: &EmbedOptions) -> Result<Vec<f32>> {
        let outcome = self.embed_batch(&[text.to_owned()], opts).await?;
        outcome
            .vectors
            .into_iter()
            .next()
            .ok_or_else(|| crate::error::Error::format(self.provider_name(), "no embedding returned"))
    }

    /// Embeds a batch of texts, preserving input order. Empty input
    /// yields an empty output (spec §4.3).
    async fn embed_batch(&self, texts: &[String], opts: &EmbedOptions) -> Result<EmbedOutcome>;

    /// Output vector dimensionality.
    fn dimensions(&self) -> usize;

    /// Stable provider identifier used in logs and error messages.
    fn provider_name(&self) -> &str;

    /// Cheap liveness probe; default embeds a short fixed string.
    async fn health_check(&self) -> Result<()> {
        self.embed("health check", &EmbedOptions::default()).await?;
        Ok(())
    }
}
