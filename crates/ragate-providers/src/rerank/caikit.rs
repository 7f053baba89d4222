//! Caikit rerank provider (spec §4.4): response is pre-sorted and used
//! as given, unlike Cohere/Jina.

use async_trait::async_trait;
use ragate_domain::error::{Error, Result};
use ragate_domain::ports::{RerankOutcome, RerankProvider};
use serde::{Deserialize, Serialize};

/// `POST {base_url}/api/v1/task/rerank`.
pub struct CaikitRerankProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_documents: usize,
}

impl CaikitRerankProvider {
    /// Builds a provider bound to `base_url`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>, max_documents: usize) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            max_documents,
        }
    }
}

#[derive(Serialize)]
struct DocumentText<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Inputs<'a> {
    query: &'a str,
    documents: Vec<DocumentText<'a>>,
}

#[derive(Serialize)]
struct Parameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    top_n: Option<usize>,
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    inputs: Inputs<'a>,
    model_id: &'a str,
    parameters: Parameters,
}

#[derive(Deserialize)]
struct RerankResponse {
    result: RerankResult,
}

#[derive(Deserialize)]
struct RerankResult {
    scores: Vec<ScoreEntry>,
}

#[derive(Deserialize)]
struct ScoreEntry {
    index: usize,
    score: f32,
}

#[async_trait]
impl RerankProvider for CaikitRerankProvider {
    async fn rerank(&self, query: &str, docs: &[String], top_n: Option<usize>) -> Result<RerankOutcome> {
        if docs.is_empty() {
            return Ok(RerankOutcome {
                indices: Vec::new(),
                scores: Some(Vec::new()),
                model: self.model.clone(),
            });
        }
        if query.is_empty() {
            let n = top_n.unwrap_or(docs.len()).min(docs.len());
            return Ok(RerankOutcome {
                indices: (0..n).collect(),
                scores: None,
                model: self.model.clone(),
            });
        }

        let request = RerankRequest {
            inputs: Inputs {
                query,
                documents: docs.iter().map(|text| DocumentText { text }).collect(),
            },
            model_id: &self.model,
            parameters: Parameters { top_n },
        };
        let response = self
            .client
            .post(format!("{}/api/v1/task/rerank", self.base_url.trim_end_matches('/')))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::remote(self.provider_name(), e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::remote(self.provider_name(), format!("HTTP {status}: {body}")));
        }

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| Error::format(self.provider_name(), e.to_string()))?;

        // Caikit pre-sorts; use as given (spec §4.4), unlike Cohere/Jina.
        let indices = parsed.result.scores.iter().map(|s| s.index).collect();
        let scores = parsed.result.scores.iter().map(|s| s.score).collect();

        Ok(RerankOutcome {
            indices,
            scores: Some(scores),
            model: self.model.clone(),
        })
    }

    fn supports_scores(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &str {
        "caikit-rerank"
    }

    fn max_documents(&self) -> usize {
        self.max_documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn uses_upstream_order_without_resorting() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/task/rerank"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": {"scores": [
                    {"index": 1, "score": 0.2},
                    {"index": 0, "score": 0.9},
                ]},
            })))
            .mount(&server)
            .await;

        let provider = CaikitRerankProvider::new(reqwest::Client::new(), server.uri(), "model", 1000);
        let docs = vec!["a".to_owned(), "b".to_owned()];
        let outcome = provider.rerank("query", &docs, None).await.expect("ok");
        // Pre-sorted upstream order is preserved even though scores are descending-incorrect here.
        assert_eq!(outcome.indices, vec![1, 0]);
    }
}
