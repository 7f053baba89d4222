//! Cohere rerank provider (spec §4.4).

use async_trait::async_trait;
use ragate_domain::error::{Error, Result};
use ragate_domain::ports::{RerankOutcome, RerankProvider};
use serde::{Deserialize, Serialize};

/// `POST {base_url}/v1/rerank` with `{query, documents, model, top_n}`.
pub struct CohereRerankProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_documents: usize,
}

impl CohereRerankProvider {
    /// Builds a provider bound to `base_url`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>, max_documents: usize) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_documents,
        }
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    documents: &'a [String],
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_n: Option<usize>,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

#[derive(Deserialize)]
struct RerankResult {
    index: usize,
    relevance_score: f32,
}

#[async_trait]
impl RerankProvider for CohereRerankProvider {
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
            query,
            documents: docs,
            model: &self.model,
            top_n,
        };
        let response = self
            .client
            .post(format!("{}/v1/rerank", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::remote(self.provider_name(), e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::remote(self.provider_name(), format!("HTTP {status}: {body}")));
        }

        let mut parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| Error::format(self.provider_name(), e.to_string()))?;

        // Never trust upstream order (spec §4.4).
        parsed.results.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

        let indices = parsed.results.iter().map(|r| r.index).collect();
        let scores = parsed.results.iter().map(|r| r.relevance_score).collect();

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
        "cohere-rerank"
    }

    fn max_documents(&self) -> usize {
        self.max_documents
    }
}
