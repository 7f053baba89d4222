//! Service-first rerank wrapper (spec §9 "Service-first with direct
//! fallback"), mirroring [`crate::embedding::service_first`].

use async_trait::async_trait;
use delegate::delegate;
use ragate_domain::error::Result;
use ragate_domain::ports::{RerankOutcome, RerankProvider};
use std::sync::Arc;

/// Tries a dedicated rerank microservice first; on any failure, falls
/// back to the wrapped direct provider.
pub struct ServiceFirstRerankProvider {
    inner: Arc<dyn RerankProvider>,
    client: reqwest::Client,
    service_url: String,
    service_token: Option<String>,
}

impl ServiceFirstRerankProvider {
    /// Wraps `inner`, trying `service_url` first.
    pub fn new(inner: Arc<dyn RerankProvider>, client: reqwest::Client, service_url: impl Into<String>, service_token: Option<String>) -> Self {
        Self {
            inner,
            client,
            service_url: service_url.into(),
            service_token,
        }
    }

    async fn call_service(&self, query: &str, docs: &[String], top_n: Option<usize>) -> Option<RerankOutcome> {
        #[derive(serde::Serialize)]
        struct ServiceRequest<'a> {
            query: &'a str,
            documents: &'a [String],
            #[serde(skip_serializing_if = "Option::is_none")]
            top_n: Option<usize>,
        }
        #[derive(serde::Deserialize)]
        struct ServiceResponse {
            indices: Vec<usize>,
            #[serde(default)]
            scores: Option<Vec<f32>>,
            #[serde(default)]
            model: Option<String>,
        }

        let mut request = self
            .client
            .post(format!("{}/rerank", self.service_url.trim_end_matches('/')))
            .json(&ServiceRequest { query, documents: docs, top_n });
        if let Some(token) = &self.service_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let parsed: ServiceResponse = response.json().await.ok()?;
        Some(RerankOutcome {
            indices: parsed.indices,
            scores: parsed.scores,
            model: parsed.model.unwrap_or_else(|| self.inner.provider_name().to_owned()),
        })
    }
}

#[async_trait]
impl RerankProvider for ServiceFirstRerankProvider {
    async fn rerank(&self, query: &str, docs: &[String], top_n: Option<usize>) -> Result<RerankOutcome> {
        if !docs.is_empty() && !query.is_empty() {
            if let Some(outcome) = self.call_service(query, docs, top_n).await {
                return Ok(outcome);
            }
            tracing::warn!(provider = self.inner.provider_name(), "rerank service unreachable, falling back to direct provider");
        }
        self.inner.rerank(query, docs, top_n).await
    }

    delegate! {
        to self.inner {
            fn supports_scores(&self) -> bool;
            fn provider_name(&self) -> &str;
            fn max_documents(&self) -> usize;
        }
    }
}
