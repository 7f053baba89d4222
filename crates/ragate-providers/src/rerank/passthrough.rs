//! Passthrough rerank provider (spec §4.4): identity permutation,
//! used when reranking is disabled.

use async_trait::async_trait;
use ragate_domain::error::Result;
use ragate_domain::ports::{RerankOutcome, RerankProvider};

/// Always returns the input order, truncated to `top_n`.
pub struct PassthroughRerankProvider;

#[async_trait]
impl RerankProvider for PassthroughRerankProvider {
    async fn rerank(&self, _query: &str, docs: &[String], top_n: Option<usize>) -> Result<RerankOutcome> {
        let n = top_n.unwrap_or(docs.len()).min(docs.len());
        Ok(RerankOutcome {
            indices: (0..n).collect(),
            scores: None,
            model: "passthrough".to_owned(),
        })
    }

    fn supports_scores(&self) -> bool {
        false
    }

    fn provider_name(&self) -> &str {
        "passthrough"
    }

    fn max_documents(&self) -> usize {
        usize::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_identity_permutation() {
        let provider = PassthroughRerankProvider;
        let docs = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
        let outcome = provider.rerank("query", &docs, None).await.expect("ok");
        assert_eq!(outcome.indices, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn truncates_to_top_n() {
        let provider = PassthroughRerankProvider;
        let docs = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
        let outcome = provider.rerank("query", &docs, Some(2)).await.expect("ok");
        assert_eq!(outcome.indices, vec![0, 1]);
    }
}
