//! Cohere embedding provider (spec §4.3 "Cohere path").

use async_trait::async_trait;
use ragate_domain::error::{Error, Result};
use ragate_domain::ports::{EmbedOptions, EmbedOutcome, EmbeddingProvider, InputType, Usage};
use serde::{Deserialize, Serialize};

/// Cohere batch-size cap (spec §4.3).
const MAX_BATCH: usize = 96;

/// `POST {base_url}/v1/embed` with `{texts, model, input_type}`.
pub struct CohereEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl CohereEmbeddingProvider {
    /// Builds a provider bound to `base_url`.
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            dimensions,
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

fn input_type_str(opts: &EmbedOptions) -> &'static str {
    match opts.input_type {
        Some(InputType::SearchQuery) => "search_query",
        _ => "search_document",
    }
}

#[async_trait]
impl EmbeddingProvider for CohereEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String], opts: &EmbedOptions) -> Result<EmbedOutcome> {
        if texts.is_empty() {
            return Ok(EmbedOutcome {
                vectors: Vec::new(),
                model: self.model.clone(),
                usage: Usage::default(),
            });
        }

        let model = opts.model.as_deref().unwrap_or(&self.model);
        let input_type = input_type_str(opts);
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(MAX_BATCH) {
            let request = EmbedRequest {
                texts: batch,
                model,
                input_type,
            };
            let response = self
                .client
                .post(format!("{}/v1/embed", self.base_url.trim_end_matches('/')))
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

            let parsed: EmbedResponse = response
                .json()
                .await
                .map_err(|e| Error::format(self.provider_name(), e.to_string()))?;

            if parsed.embeddings.len() != batch.len() {
                return Err(Error::format(
                    self.provider_name(),
                    format!("expected {} embeddings, got {}", batch.len(), parsed.embeddings.len()),
                ));
            }
            vectors.extend(parsed.embeddings);
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
        "cohere"
    }
}
