//! Service-first embedding wrapper (spec §4.3 "Service-first policy",
//! §9 "Service-first with direct fallback").
//!
//! Grounded in the teacher's `InstrumentedEmbeddingProvider` decorator:
//! wraps an inner provider behind `Arc`, overrides the I/O methods, and
//! uses `delegate!` to forward the rest unchanged.

use async_trait::async_trait;
use delegate::delegate;
use ragate_domain::error::Result;
use ragate_domain::ports::{EmbedOptions, EmbedOutcome, EmbeddingProvider};
use std::sync::Arc;

/// Tries a dedicated embedding microservice first; on any failure
/// (network error, timeout, malformed response), falls back to the
/// wrapped direct provider.
///
/// The service itself is expected to run with `prefer_service=false`
/// against its own direct provider, to avoid recursing back here.
pub struct ServiceFirstEmbeddingProvider {
    inner: Arc<dyn EmbeddingProvider>,
    client: reqwest::Client,
    service_url: String,
    service_token: Option<String>,
}

impl ServiceFirstEmbeddingProvider {
    /// Wraps `inner`, trying `service_url` first when a call opts in
    /// via [`EmbedOptions::prefer_service`].
    pub fn new(
        inner: Arc<dyn EmbeddingProvider>,
        client: reqwest::Client,
        service_url: impl Into<String>,
        service_token: Option<String>,
    ) -> Self {
        Self {
            inner,
            client,
            service_url: service_url.into(),
            service_token,
        }
    }

    async fn call_service(&self, texts: &[String], opts: &EmbedOptions) -> Option<EmbedOutcome> {
        #[derive(serde::Serialize)]
        struct ServiceRequest<'a> {
            texts: &'a [String],
            #[serde(skip_serializing_if = "Option::is_none")]
            model: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            encoding_format: Option<&'a str>,
        }
        #[derive(serde::Deserialize)]
        struct ServiceResponse {
            vectors: Vec<Vec<f32>>,
            #[serde(default)]
            model: Option<String>,
        }

        let mut request = self
            .client
            .post(format!("{}/embed", self.service_url.trim_end_matches('/')))
            .json(&ServiceRequest {
                texts,
                model: opts.model.as_deref(),
                encoding_format: opts.encoding_format.as_deref(),
            });
        if let Some(token) = &self.service_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let parsed: ServiceResponse = response.json().await.ok()?;
        if parsed.vectors.len() != texts.len() {
            return None;
        }
        Some(EmbedOutcome {
            vectors: parsed.vectors,
            model: parsed.model.unwrap_or_else(|| self.inner.provider_name().to_owned()),
            usage: ragate_domain::ports::Usage::default(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for ServiceFirstEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String], opts: &EmbedOptions) -> Result<EmbedOutcome> {
        if texts.is_empty() {
            return self.inner.embed_batch(texts, opts).await;
        }
        if opts.prefer_service {
            if let Some(outcome) = self.call_service(texts, opts).await {
                return Ok(outcome);
            }
            tracing::warn!(provider = self.inner.provider_name(), "embedding service unreachable, falling back to direct provider");
        }
        self.inner.embed_batch(texts, opts).await
    }

    delegate! {
        to self.inner {
            fn dimensions(&self) -> usize;
            fn provider_name(&self) -> &str;
        }
    }
}
