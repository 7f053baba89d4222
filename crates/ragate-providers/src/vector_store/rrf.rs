//! Reciprocal Rank Fusion (spec §4.5 step 3, §9 "RRF fusion").

use itertools::Itertools;
use std::collections::HashMap;

/// Fuses multiple rank-ordered candidate lists (dense kNN, lexical
/// BM25, ...) into one descending-score ordering, keyed on `chunk_id`
/// rather than list-position identity (spec §9: "Fuse on chunk_id, not
/// on hit-object identity").
///
/// `rrf_k` is the fusion constant (`rrf_score = Σ 1/(rrf_k + rank)`
/// across every list a candidate appears in, 1-indexed rank). Ties are
/// broken by first-seen order, so fusion is stable across repeated runs
/// on the same input lists.
pub fn fuse(ranked_lists: &[Vec<String>], rrf_k: u32) -> Vec<(String, f32)> {
    let mut scores: HashMap<String, f32> = HashMap::new();
    let mut first_seen_order: Vec<String> = Vec::new();

    for list in ranked_lists {
        for (rank, chunk_id) in list.iter().enumerate() {
            let contribution = 1.0 / (rrf_k as f32 + (rank + 1) as f32);
            let entry = scores.entry(chunk_id.clone()).or_insert_with(|| {
                first_seen_order.push(chunk_id.clone());
                0.0
            });
            *entry += contribution;
        }
    }

    first_seen_order
        .into_iter()
        .map(|id| {
            let score = scores[&id];
            (id, score)
        })
        .sorted_by(|a, b| b.1.total_cmp(&a.1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_in_both_lists_outranks_single_list_candidate() {
        let dense = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
        let lexical = vec!["b".to_owned(), "a".to_owned(), "d".to_owned()];
        let fused = fuse(&[dense, lexical], 60);
        // "a" and "b" both appear in both lists with good ranks; "c"/"d" appear once.
        let top_two: Vec<&str> = fused.iter().take(2).map(|(id, _)| id.as_str()).collect();
        assert!(top_two.contains(&"a"));
        assert!(top_two.contains(&"b"));
    }

    #[test]
    fn empty_lists_yield_empty_fusion() {
        let fused = fuse(&[], 60);
        assert!(fused.is_empty());
    }

    #[test]
    fn single_list_preserves_relative_order() {
        let dense = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
        let fused = fuse(&[dense], 60);
        let order: Vec<&str> = fused.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }
}
