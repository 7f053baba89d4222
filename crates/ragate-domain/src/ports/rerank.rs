//! Rerank provider port (C4, spec §4.4).

use crate::error::Result;
use async_trait::async_trait;

/// Result of a [`RerankProvider::rerank`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankOutcome {
    /// A permutation (possibly truncated to `top_n`) of `0..docs.len()`
    /// in descending relevance order.
    pub indices: Vec<usize>,
    /// Relevance scores aligned with `indices`, when the provider
    /// reports them.
    pub scores: Option<Vec<f32>>,
    /// Model name actually used.
    pub model: String,
}

/// Uniform `Rerank(query, docs, topN) -> ordered indices (+scores)`
/// contract (spec §4.4).
#[async_trait]
pub trait RerankProvider: Send + Sync {
    /// Reranks `docs` against `query`, returning at most `top_n`
    /// indices (or all of them, if `top_n` is `None`) in descending
    /// relevance order.
    ///
    /// Empty `docs` yields an empty result. Empty `query` yields the
    /// identity permutation `[0..docs.len())`.
    async fn rerank(&self, query: &str, docs: &[String], top_n: Option<usize>) -> Result<RerankOutcome>;

    /// Whether this provider reports relevance scores.
    fn supports_scores(&self) -> bool;

    /// Stable provider identifier used in logs and error messages.
    fn provider_name(&self) -> &str;

    /// Maximum documents accepted per call; callers truncate input to
    /// this before invoking [`rerank`](Self::rerank) (spec §4.4).
    fn max_documents(&self) -> usize;
}
