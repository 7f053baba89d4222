//! Metadata filtering applied between hybrid retrieval and rerank
//! (spec §4.6 step 5). Every set field is AND-composed; an absent
//! field never excludes a candidate.

use globset::Glob;
use ragate_domain::entities::{Chunk, Filters};
use ragate_domain::error::{Error, Result};

/// Builds a predicate closure for `filters`, compiling `file_pattern`
/// once rather than per candidate.
pub fn build_predicate(filters: &Filters) -> Result<impl Fn(&Chunk) -> bool + '_> {
    let glob = filters
        .file_pattern
        .as_deref()
        .map(|pattern| Glob::new(pattern).map(|g| g.compile_matcher()))
        .transpose()
        .map_err(|e| Error::validation("file_pattern", e.to_string()))?;

    Ok(move |chunk: &Chunk| {
        if let Some(expected) = &filters.file_name {
            if &chunk.file_name != expected {
                return false;
            }
        }
        if let Some(matcher) = &glob {
            if !matcher.is_match(&chunk.file_name) {
                return false;
            }
        }
        if let Some(expected) = &filters.mime_type {
            if &chunk.mime_type != expected {
                return false;
            }
        }
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn chunk(file_name: &str, mime_type: &str) -> Chunk {
        Chunk {
            chunk_id: "c".to_owned(),
            text: "text".to_owned(),
            file_name: file_name.to_owned(),
            file_path: String::new(),
            page: -1,
            section: String::new(),
            mime_type: mime_type.to_owned(),
            chunk_index: 0,
            created_at_ts: 0,
            dense_vector: vec![],
            sparse_vector: None,
        }
    }

    #[rstest]
    #[case::empty_filters_match_everything(Filters::default(), "a.txt", "text/plain", true)]
    #[case::file_name_matches(Filters { file_name: Some("a.txt".to_owned()), ..Default::default() }, "a.txt", "text/plain", true)]
    #[case::file_name_mismatches(Filters { file_name: Some("a.txt".to_owned()), ..Default::default() }, "b.txt", "text/plain", false)]
    #[case::mime_type_matches(Filters { mime_type: Some("text/plain".to_owned()), ..Default::default() }, "a.txt", "text/plain", true)]
    #[case::mime_type_mismatches(Filters { mime_type: Some("text/plain".to_owned()), ..Default::default() }, "a.txt", "application/pdf", false)]
    #[case::file_name_and_mime_type_are_and_composed(Filters { file_name: Some("a.txt".to_owned()), mime_type: Some("application/pdf".to_owned()), ..Default::default() }, "a.txt", "text/plain", false)]
    #[case::file_pattern_matches(Filters { file_pattern: Some("*.md".to_owned()), ..Default::default() }, "readme.md", "text/markdown", true)]
    #[case::file_pattern_mismatches(Filters { file_pattern: Some("*.md".to_owned()), ..Default::default() }, "readme.txt", "text/plain", false)]
    fn filter_precedence_matches_expected_outcome(#[case] filters: Filters, #[case] file_name: &str, #[case] mime_type: &str, #[case] expected: bool) {
        let predicate = build_predicate(&filters).expect("valid filters");
        assert_eq!(predicate(&chunk(file_name, mime_type)), expected);
    }

    #[test]
    fn invalid_glob_is_a_validation_error() {
        let filters = Filters {
            file_pattern: Some("[".to_owned()),
            ..Default::default()
        };
        let result = build_predicate(&filters);
        assert!(matches!(result, Err(Error::Validation { .. })));
    }
}
