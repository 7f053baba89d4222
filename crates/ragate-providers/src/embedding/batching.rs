//! Per-input truncation and token-budgeted batching for the direct
//! OpenAI-compatible embedding path (spec §4.3 "Batching").

use ragate_domain::tokens;

/// Default token budget per flushed batch (spec §4.3: "≈ 3500 tokens").
pub const DEFAULT_MAX_TOKENS_PER_BATCH: usize = 3500;

/// Truncates `text` to `max_tokens_per_input` estimated tokens, if
/// needed, re-estimating after truncation.
pub fn truncate_input(text: &str, max_tokens_per_input: usize) -> String {
    if tokens::estimate(text) > max_tokens_per_input {
        tokens::truncate_to_tokens(text, max_tokens_per_input)
    } else {
        text.to_owned()
    }
}

/// Accumulates already-truncated texts into order-preserving batches,
/// flushing whenever the next item would exceed `max_batch` items or
/// `max_tokens_per_batch` tokens (spec §4.3, §9 "Batched embedding
/// with token budgets").
///
/// Implemented as an iterator adaptor that emits one flushed batch per
/// `next()` call rather than recursing, so arbitrarily long input
/// sequences are handled with constant stack depth.
pub struct BatchAccumulator<I> {
    inner: std::iter::Peekable<I>,
    max_batch: usize,
    max_tokens_per_batch: usize,
}

impl<I: Iterator<Item = String>> BatchAccumulator<I> {
    /// Wraps `inner`, an iterator over already-truncated input texts.
    pub fn new(inner: I, max_batch: usize, max_tokens_per_batch: usize) -> Self {
        Self {
            inner: inner.peekable(),
            max_batch: max_batch.max(1),
            max_tokens_per_batch,
        }
    }
}

impl<I: Iterator<Item = String>> Iterator for BatchAccumulator<I> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Vec<String>> {
        self.inner.peek()?;
        let mut batch = Vec::new();
        let mut batch_tokens = 0usize;
        while let Some(next_text) = self.inner.peek() {
            let next_tokens = tokens::estimate(next_text);
            let would_exceed_items = batch.len() + 1 > self.max_batch;
            let would_exceed_tokens = !batch.is_empty() && batch_tokens + next_tokens > self.max_tokens_per_batch;
            if would_exceed_items || would_exceed_tokens {
                break;
            }
            // Safe: we just peeked Some above.
            let text = self.inner.next().expect("peeked item must be present");
            batch_tokens += next_tokens;
            batch.push(text);
        }
        if batch.is_empty() {
            // A single oversized-for-tokens item still must go out on
            // its own rather than stalling the iterator forever.
            self.inner.next().map(|text| vec![text])
        } else {
            Some(batch)
        }
    }
}

/// Truncates every input and groups it into order-preserving batches,
/// in one call.
pub fn plan_batches(
    texts: &[String],
    max_batch: usize,
    max_tokens_per_input: usize,
    max_tokens_per_batch: usize,
) -> Vec<Vec<String>> {
    let truncated: Vec<String> = texts.iter().map(|t| truncate_input(t, max_tokens_per_input)).collect();
    BatchAccumulator::new(truncated.into_iter(), max_batch, max_tokens_per_batch).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_batches() {
        let batches = plan_batches(&[], 10, 1000, DEFAULT_MAX_TOKENS_PER_BATCH);
        assert!(batches.is_empty());
    }

    #[test]
    fn batches_respect_item_cap() {
        let texts: Vec<String> = (0..5).map(|i| format!("text-{i}")).collect();
        let batches = plan_batches(&texts, 2, 1000, DEFAULT_MAX_TOKENS_PER_BATCH);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[2].len(), 1);
    }

    #[test]
    fn order_is_preserved_across_flushes() {
        let texts: Vec<String> = (0..7).map(|i| format!("text-{i}")).collect();
        let batches = plan_batches(&texts, 3, 1000, DEFAULT_MAX_TOKENS_PER_BATCH);
        let flattened: Vec<String> = batches.into_iter().flatten().collect();
        assert_eq!(flattened, texts);
    }

    #[test]
    fn batches_respect_token_budget() {
        let texts: Vec<String> = (0..4).map(|_| "a".repeat(4000)).collect(); // ~1000 tokens each
        let batches = plan_batches(&texts, 100, 10_000, 1500);
        // 1000 tokens per item; budget 1500 -> at most 1 per batch
        assert!(batches.iter().all(|b| b.len() == 1));
    }

    #[test]
    fn oversized_single_item_still_emitted() {
        let texts = vec!["a".repeat(40_000)];
        let batches = plan_batches(&texts, 100, 100_000, 10);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
    }
}
