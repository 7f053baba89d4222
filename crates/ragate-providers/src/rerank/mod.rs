//! Rerank provider implementations (C4).

#[cfg(feature = "rerank-caikit")]
pub mod caikit;
#[cfg(feature = "rerank-cohere")]
pub mod cohere;
#[cfg(feature = "rerank-jina")]
pub mod jina;
pub mod passthrough;
pub mod service_first;

#[cfg(feature = "rerank-caikit")]
pub use caikit::CaikitRerankProvider;
#[cfg(feature = "rerank-cohere")]
pub use cohere::CohereRerankProvider;
#[cfg(feature = "rerank-jina")]
pub use jina::JinaRerankProvider;
pub use passthrough::PassthroughRerankProvider;
pub use service_first::ServiceFirstRerankProvider;

use ragate_domain::error::Result;
use ragate_domain::ports::{RerankOutcome, RerankProvider};

/// Applies a provider's `max_documents` cap before invoking it: if
/// `docs` exceeds the cap, truncates to the first `max_documents` and
/// logs, rather than rejecting the call (spec §4.4).
pub async fn rerank_with_cap(provider: &dyn RerankProvider, query: &str, docs: &[String], top_n: Option<usize>) -> Result<RerankOutcome> {
    let cap = provider.max_documents();
    if docs.len() > cap {
        tracing::warn!(
            provider = provider.provider_name(),
            requested = docs.len(),
            cap,
            "truncating documents to rerank provider's max_documents cap"
        );
        provider.rerank(query, &docs[..cap], top_n).await
    } else {
        provider.rerank(query, docs, top_n).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn caps_oversized_input_without_erroring() {
        let provider = PassthroughRerankProvider;
        let docs: Vec<String> = (0..5).map(|i| format!("d{i}")).collect();
        struct CappedAtTwo;
        #[async_trait::async_trait]
        impl RerankProvider for CappedAtTwo {
            async fn rerank(&self, _query: &str, docs: &[String], top_n: Option<usize>) -> Result<RerankOutcome> {
                let n = top_n.unwrap_or(docs.len()).min(docs.len());
                Ok(RerankOutcome {
                    indices: (0..n).collect(),
                    scores: None,
                    model: "capped".to_owned(),
                })
            }
            fn supports_scores(&self) -> bool {
                false
            }
            fn provider_name(&self) -> &str {
                "capped"
            }
            fn max_documents(&self) -> usize {
                2
            }
        }
        let _ = provider; // keep PassthroughRerankProvider import used across the module
        let outcome = rerank_with_cap(&CappedAtTwo, "q", &docs, None).await.expect("ok");
        assert_eq!(outcome.indices, vec![0, 1]);
    }
}
