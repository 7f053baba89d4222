//! Token estimator (C1, spec §4.1).
//!
//! Pure and side-effect free: no exact BPE tokenizer is vendored, so
//! `estimate` always uses the heuristic. Providers that need a tighter
//! bound (Cohere's ~512-token-per-input cap) call `truncate_to_tokens`
//! after estimating.

/// A single chat-style message, for `count_in_messages`.
pub struct Message<'a> {
    /// Role name, e.g. `"user"`.
    pub role: &'a str,
    /// Message content.
    pub content: &'a str,
}

/// Heuristic characters-per-token ratio used when no exact encoder is
/// available.
const CHARS_PER_TOKEN: usize = 4;

/// Per-message token overhead in `count_in_messages`.
const TOKENS_PER_MESSAGE: usize = 4;

/// Priming tokens added once per `count_in_messages` call.
const PRIMING_TOKENS: usize = 3;

/// Estimates the token count of `text`.
///
/// `max(1, len(text)/4)`, matching spec §4.1's heuristic; never
/// returns 0 for non-empty input.
pub fn estimate(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    (text.len() / CHARS_PER_TOKEN).max(1)
}

/// Truncates `text` to fit within `max` estimated tokens, by character
/// ratio, re-estimating to confirm the bound holds.
pub fn truncate_to_tokens(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if estimate(text) <= max {
        return text.to_owned();
    }
    let max_chars = max * CHARS_PER_TOKEN;
    let mut end = max_chars.min(text.len());
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut truncated = text[..end].to_owned();
    // Re-estimate: character-ratio truncation can occasionally still
    // round up over `max` for short strings; shave one more char-block.
    while estimate(&truncated) > max && !truncated.is_empty() {
        let mut new_end = truncated.len().saturating_sub(CHARS_PER_TOKEN);
        while new_end > 0 && !truncated.is_char_boundary(new_end) {
            new_end -= 1;
        }
        truncated.truncate(new_end);
    }
    truncated
}

/// Counts tokens across a sequence of chat messages: content tokens
/// plus 4 tokens per message plus 3 priming tokens (spec §4.1).
pub fn count_in_messages(messages: &[Message<'_>]) -> usize {
    let content_tokens: usize = messages
        .iter()
        .map(|m| estimate(m.content) + TOKENS_PER_MESSAGE)
        .sum();
    content_tokens + PRIMING_TOKENS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_estimates_zero() {
        assert_eq!(estimate(""), 0);
    }

    #[test]
    fn short_text_estimates_at_least_one() {
        assert_eq!(estimate("hi"), 1);
    }

    #[test]
    fn estimate_matches_len_over_four() {
        let text = "a".repeat(40);
        assert_eq!(estimate(&text), 10);
    }

    #[test]
    fn truncate_respects_token_budget() {
        let text = "a".repeat(400);
        let truncated = truncate_to_tokens(&text, 10);
        assert!(estimate(&truncated) <= 10);
    }

    #[test]
    fn truncate_is_noop_when_within_budget() {
        let text = "short text";
        assert_eq!(truncate_to_tokens(text, 100), text);
    }

    #[test]
    fn truncate_respects_utf8_boundaries() {
        let text = "日本語".repeat(50);
        let truncated = truncate_to_tokens(&text, 5);
        assert!(truncated.is_char_boundary(truncated.len()));
    }

    #[test]
    fn message_counting_adds_overhead_and_priming() {
        let messages = [
            Message {
                role: "user",
                content: "hi",
            },
            Message {
                role: "assistant",
                content: "hello",
            },
        ];
        // estimate("hi")=1 + 4, estimate("hello")=1 + 4, + 3 priming
        assert_eq!(count_in_messages(&messages), 1 + 4 + 1 + 4 + 3);
    }
}
