//! Shared test fixtures, enabled via the `test-utils` feature so that
//! other crates' integration tests don't each redefine the same
//! doubles (spec §8 "testable properties" exercises these directly).

use crate::error::Result;
use crate::ports::{EmbedOptions, EmbedOutcome, EmbeddingProvider, Usage};
use async_trait::async_trait;

/// Deterministic stand-in embedder: hashes each text's lowercase-byte
/// count into a tiny fixed vector, so near-duplicate text clusters by
/// cosine similarity without depending on a real model.
#[derive(Debug, Default)]
pub struct HashEmbeddingProvider;

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String], _opts: &EmbedOptions) -> Result<EmbedOutcome> {
        let vectors = texts
            .iter()
            .map(|text| {
                let lowercase = text.bytes().filter(u8::is_ascii_lowercase).count() as f32;
                let rest = text.len() as f32 - lowercase;
                vec![lowercase + 1.0, rest + 1.0]
            })
            .collect();
        Ok(EmbedOutcome {
            vectors,
            model: "hash".to_owned(),
            usage: Usage::default(),
        })
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn provider_name(&self) -> &str {
        "hash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_embeds_identically() {
        let provider = HashEmbeddingProvider;
        let outcome = provider.embed_batch(&["alpha".to_owned(), "alpha".to_owned()], &EmbedOptions::default()).await.expect("ok");
        assert_eq!(outcome.vectors[0], outcome.vectors[1]);
    }
}
