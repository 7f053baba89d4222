//! Caikit embedding provider (spec §4.3 "Caikit path").
//!
//! Caikit exposes two distinct endpoints and response shapes depending
//! on batch size, rather than one uniform batch endpoint.

use async_trait::async_trait;
use ragate_domain::error::{Error, Result};
use ragate_domain::ports::{EmbedOptions, EmbedOutcome, EmbeddingProvider, Usage};
use serde::{Deserialize, Serialize};

/// `POST {base_url}/api/v1/task/embedding` (single item) or
/// `POST {base_url}/api/v1/task/embedding-tasks` (batch).
pub struct CaikitEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl CaikitEmbeddingProvider {
    /// Builds a provider bound to `base_url`. Caikit deployments are
    /// typically unauthenticated internal services, so no API key is
    /// required.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            dimensions,
        }
    }
}

#[derive(Serialize)]
struct SingleRequest<'a> {
    model_id: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    model_id: &'a str,
    texts: &'a [String],
}

#[derive(Deserialize)]
struct SingleResponse {
    result: SingleResult,
}

#[derive(Deserialize)]
struct SingleResult {
    data: ValueHolder,
}

#[derive(Deserialize)]
struct ValueHolder {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct BatchResponse {
    results: Vec<BatchResultItem>,
}

#[derive(Deserialize)]
struct BatchResultItem {
    vectors: Vec<VectorEntry>,
}

#[derive(Deserialize)]
struct VectorEntry {
    data: ValueHolder,
}

#[async_trait]
impl EmbeddingProvider for CaikitEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String], opts: &EmbedOptions) -> Result<EmbedOutcome> {
        if texts.is_empty() {
            return Ok(EmbedOutcome {
                vectors: Vec::new(),
                model: self.model.clone(),
                usage: Usage::default(),
            });
        }

        let model = opts.model.as_deref().unwrap_or(&self.model);
        let base = self.base_url.trim_end_matches('/');

        let vectors = if texts.len() == 1 {
            let request = SingleRequest {
                model_id: model,
                text: &texts[0],
            };
            let response = self
                .client
                .post(format!("{base}/api/v1/task/embedding"))
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::remote(self.provider_name(), e.to_string()))?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::remote(self.provider_name(), format!("HTTP {status}: {body}")));
            }
            let parsed: SingleResponse = response
                .json()
                .await
                .map_err(|e| Error::format(self.provider_name(), e.to_string()))?;
            vec![parsed.result.data.values]
        } else {
            let request = BatchRequest { model_id: model, texts };
            let response = self
                .client
                .post(format!("{base}/api/v1/task/embedding-tasks"))
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::remote(self.provider_name(), e.to_string()))?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::remote(self.provider_name(), format!("HTTP {status}: {body}")));
            }
            let parsed: BatchResponse = response
                .json()
                .await
                .map_err(|e| Error::format(self.provider_name(), e.to_string()))?;
            let item = parsed
                .results
                .into_iter()
                .next()
                .ok_or_else(|| Error::format(self.provider_name(), "empty results array"))?;
            item.vectors.into_iter().map(|v| v.data.values).collect()
        };

        if vectors.len() != texts.len() {
            return Err(Error::format(
                self.provider_name(),
                format!("expected {} embeddings, got {}", texts.len(), vectors.len()),
            ));
        }

        Ok(EmbedOutcome {
            vectors,
            model: model.to_owned(),
            usage: Usage::default(),
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "caikit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn single_item_uses_single_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/task/embedding"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": {"data": {"values": [1.0, 2.0]}},
            })))
            .mount(&server)
            .await;

        let provider = CaikitEmbeddingProvider::new(reqwest::Client::new(), server.uri(), "model", 2);
        let outcome = provider.embed_batch(&["hi".to_owned()], &EmbedOptions::default()).await.expect("ok");
        assert_eq!(outcome.vectors, vec![vec![1.0, 2.0]]);
    }

    #[tokio::test]
    async fn batch_uses_tasks_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/task/embedding-tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"vectors": [
                    {"data": {"values": [1.0]}},
                    {"data": {"values": [2.0]}},
                ]}],
            })))
            .mount(&server)
            .await;

        let provider = CaikitEmbeddingProvider::new(reqwest::Client::new(), server.uri(), "model", 1);
        let outcome = provider
            .embed_batch(&["a".to_owned(), "b".to_owned()], &EmbedOptions::default())
            .await
            .expect("ok");
        assert_eq!(outcome.vectors, vec![vec![1.0], vec![2.0]]);
    }
}
