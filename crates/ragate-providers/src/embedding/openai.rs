//! OpenAI-compatible embedding provider (spec §4.3 "Batching (direct
//! OpenAI-compatible path)").

use crate::embedding::batching::{plan_batches, DEFAULT_MAX_TOKENS_PER_BATCH};
use async_trait::async_trait;
use ragate_domain::error::{Error, Result};
use ragate_domain::ports::{EmbedOptions, EmbedOutcome, EmbeddingProvider, Usage};
use serde::Deserialize;

/// `POST {base_url}/embeddings` with `{input, model}`, expecting
/// `{data:[{embedding}], model, usage}`.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    max_batch: usize,
    max_tokens_per_input: usize,
}

impl OpenAiCompatibleProvider {
    /// Builds a provider bound to `base_url`, authenticating with
    /// `api_key` and reporting `dimensions` as its output size.
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
        max_batch: usize,
        max_tokens_per_input: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            dimensions,
            max_batch,
            max_tokens_per_input,
        }
    }
}

#[derive(serde::Serialize)]
struct EmbedRequest<'a> {
    input: &'a [String],
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding_format: Option<&'a str>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedDatum>,
    model: String,
    #[serde(default)]
    usage: Option<UsageResponse>,
}

#[derive(Deserialize)]
struct EmbedDatum {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct UsageResponse {
    prompt_tokens: Option<u64>,
}

#[async_trait]
impl EmbeddingProvider for OpenAiCompatibleProvider {
    async fn embed_batch(&self, texts: &[String], opts: &EmbedOptions) -> Result<EmbedOutcome> {
        if texts.is_empty() {
            return Ok(EmbedOutcome {
                vectors: Vec::new(),
                model: self.model.clone(),
                usage: Usage::default(),
            });
        }

        let model = opts.model.as_deref().unwrap_or(&self.model);
        let batches = plan_batches(texts, self.max_batch, self.max_tokens_per_input, DEFAULT_MAX_TOKENS_PER_BATCH);

        let mut vectors = Vec::with_capacity(texts.len());
        let mut prompt_tokens_total: Option<u64> = None;
        let mut model_used = model.to_owned();

        for batch in batches {
            let request = EmbedRequest {
                input: &batch,
                model,
                encoding_format: opts.encoding_format.as_deref(),
            };
            let response = self
                .client
                .post(format!("{}/embeddings", self.base_url.trim_end_matches('/')))
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

            if parsed.data.len() != batch.len() {
                return Err(Error::format(
                    self.provider_name(),
                    format!("expected {} embeddings, got {}", batch.len(), parsed.data.len()),
                ));
            }

            model_used = parsed.model;
            if let Some(usage) = parsed.usage {
                *prompt_tokens_total.get_or_insert(0) += usage.prompt_tokens.unwrap_or(0);
            }
            vectors.extend(parsed.data.into_iter().map(|d| d.embedding));
        }

        Ok(EmbedOutcome {
            vectors,
            model: model_used,
            usage: Usage {
                prompt_tokens: prompt_tokens_total,
            },
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "openai-compatible"
    }
}
