//! Word-level diff statistics between the original and edited transcript.
//!
//! Pure functions, no side effects. The output feeds the reward calculator,
//! so the accumulation order is part of the contract (see
//! [`compute_diff_stats`]).

use lazy_static::lazy_static;
use regex::Regex;

use crate::common::{CoreError, CoreResult};

use super::content::TranscriptContent;

/// Aggregate word-diff statistics across all content fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    /// Running absolute sum of (added + removed) re-accumulated per field.
    /// NOTE: this re-adds the cumulative counters at every field boundary
    /// rather than summing per-field deltas once, matching the production
    /// reward math. Transcripts with several edited fields inflate this
    /// value; see `test_total_diff_recounts_earlier_fields`.
    pub total_diff_words: i64,
    /// Word count of the current body, markdown stripped.
    pub total_words: i64,
    pub added_words: i64,
    pub removed_words: i64,
}

lazy_static! {
    // CJK scripts have no word boundaries; each codepoint counts as a word.
    static ref CJK: Regex = Regex::new(
        "[\u{3040}-\u{30ff}\u{3400}-\u{4dbf}\u{4e00}-\u{9fff}\u{ac00}-\u{d7af}\u{f900}-\u{faff}]"
    )
    .unwrap();
    static ref WORD: Regex = Regex::new(r"\w+").unwrap();

    // Markdown structure stripped before word counting.
    static ref MD_HEADER: Regex = Regex::new(r"(?m)^#{1,6}\s+").unwrap();
    static ref MD_IMAGE: Regex = Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap();
    static ref MD_LINK: Regex = Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").unwrap();
    static ref MD_CODE: Regex = Regex::new(r"`([^`]*)`").unwrap();
    static ref MD_BRACKET_LIST: Regex = Regex::new(r"\[[^\]\[]*\]").unwrap();
}

/// Compute diff statistics between the original and current content.
///
/// Each field (title, attribution, categories, tags, speakers, body) is
/// diffed at word level; list fields are joined before diffing and bracket
/// wrapping is stripped. Returns `CoreError::Validation` when either
/// document has no body. Empty strings diff cleanly.
pub fn compute_diff_stats(
    original: &TranscriptContent,
    current: &TranscriptContent,
) -> CoreResult<DiffStats> {
    let original_body = original
        .body
        .as_deref()
        .ok_or_else(|| CoreError::validation("original content has no body"))?;
    let current_body = current
        .body
        .as_deref()
        .ok_or_else(|| CoreError::validation("edited content has no body"))?;

    let fields: [(String, String); 6] = [
        (field_text(&original.title), field_text(&current.title)),
        (
            field_text(&original.transcript_by),
            field_text(&current.transcript_by),
        ),
        (
            list_field_text(&original.categories),
            list_field_text(&current.categories),
        ),
        (list_field_text(&original.tags), list_field_text(&current.tags)),
        (
            list_field_text(&original.speakers),
            list_field_text(&current.speakers),
        ),
        (
            strip_markdown(original_body),
            strip_markdown(current_body),
        ),
    ];

    let mut stats = DiffStats {
        total_words: count_words(&strip_markdown(current_body)),
        ..Default::default()
    };

    for (old, new) in &fields {
        let (added, removed) = diff_words(old, new);
        stats.added_words += added;
        stats.removed_words += removed;
        // Cumulative counters re-added at each field boundary, not the
        // per-field delta. Kept bit-for-bit compatible with the deployed
        // reward math.
        stats.total_diff_words += (stats.added_words + stats.removed_words).abs();
    }

    Ok(stats)
}

/// Count words in a text: one word per CJK codepoint, word-boundary matches
/// for everything else.
pub fn count_words(text: &str) -> i64 {
    let cjk = CJK.find_iter(text).count() as i64;
    let without_cjk = CJK.replace_all(text, " ");
    let latin = WORD.find_iter(&without_cjk).count() as i64;
    cjk + latin
}

/// Strip markdown structural elements: headers, images, links (keeping the
/// link text), inline code spans (keeping the code), and bracketed lists.
pub fn strip_markdown(text: &str) -> String {
    let text = MD_IMAGE.replace_all(text, " ");
    let text = MD_LINK.replace_all(&text, "$1");
    let text = MD_HEADER.replace_all(&text, "");
    let text = MD_CODE.replace_all(&text, "$1");
    let text = MD_BRACKET_LIST.replace_all(&text, " ");
    text.into_owned()
}

/// Word-level diff as multiset add/remove counts.
///
/// Added = tokens in `new` beyond their multiplicity in `old`; removed is
/// the mirror image. Never panics on empty input.
fn diff_words(old: &str, new: &str) -> (i64, i64) {
    use std::collections::HashMap;

    let mut counts: HashMap<&str, i64> = HashMap::new();
    for token in tokenize(old) {
        *counts.entry(token).or_insert(0) += 1;
    }

    let mut added = 0i64;
    for token in tokenize(new) {
        let entry = counts.entry(token).or_insert(0);
        if *entry > 0 {
            *entry -= 1;
        } else {
            added += 1;
        }
    }

    let removed: i64 = counts.values().filter(|&&c| c > 0).sum();
    (added, removed)
}

fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// Scalar field text with bracket wrapping stripped.
fn field_text(value: &str) -> String {
    value
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .replace(['\'', '"'], "")
}

/// List fields are joined into a single string before diffing.
fn list_field_text(values: &[String]) -> String {
    field_text(&values.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(body: &str) -> TranscriptContent {
        TranscriptContent {
            title: "title".into(),
            body: Some(body.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_added_word() {
        let stats = compute_diff_stats(&content("a b c"), &content("a b c d")).unwrap();
        assert_eq!(stats.total_words, 4);
        assert_eq!(stats.added_words, 1);
        assert_eq!(stats.removed_words, 0);
        assert_eq!(stats.total_diff_words, 1);
    }

    #[test]
    fn test_unchanged_content_has_zero_diff() {
        let stats = compute_diff_stats(&content("a b c"), &content("a b c")).unwrap();
        assert_eq!(stats.added_words, 0);
        assert_eq!(stats.removed_words, 0);
        assert_eq!(stats.total_diff_words, 0);
        assert_eq!(stats.total_words, 3);
    }

    #[test]
    fn test_replacement_counts_both_sides() {
        let stats = compute_diff_stats(&content("a b c"), &content("a b x")).unwrap();
        assert_eq!(stats.added_words, 1);
        assert_eq!(stats.removed_words, 1);
        assert_eq!(stats.total_diff_words, 2);
    }

    #[test]
    fn test_empty_bodies_do_not_panic() {
        let stats = compute_diff_stats(&content(""), &content("")).unwrap();
        assert_eq!(stats, DiffStats::default());
    }

    #[test]
    fn test_missing_body_is_validation_error() {
        let mut broken = content("a");
        broken.body = None;
        let err = compute_diff_stats(&broken, &content("a")).unwrap_err();
        assert!(matches!(err, crate::common::CoreError::Validation(_)));
    }

    /// The cumulative counters are re-added at every field boundary, so an
    /// edit in an early field is counted again for each later field. This
    /// mirrors the deployed reward math; it inflates multi-field edits and
    /// is a candidate double-count bug if rewards are ever renormalized.
    #[test]
    fn test_total_diff_recounts_earlier_fields() {
        let original = TranscriptContent {
            title: "old title".into(),
            body: Some("a b c".into()),
            ..Default::default()
        };
        let current = TranscriptContent {
            title: "new title".into(),
            body: Some("a b c".into()),
            ..Default::default()
        };
        let stats = compute_diff_stats(&original, &current).unwrap();
        // Title diff is 2 (one added, one removed), re-added for each of the
        // six fields: 2 * 6 = 12, even though only the title changed.
        assert_eq!(stats.added_words, 1);
        assert_eq!(stats.removed_words, 1);
        assert_eq!(stats.total_diff_words, 12);
    }

    #[test]
    fn test_markdown_is_stripped_before_counting() {
        let body = "# Header\n\nSee [the style guide](https://example.com) and `code` here.";
        let stats = compute_diff_stats(&content(body), &content(body)).unwrap();
        // header, see, the, style, guide, and, code, here
        assert_eq!(stats.total_words, 8);
        assert_eq!(stats.total_diff_words, 0);
    }

    #[test]
    fn test_cjk_counts_one_word_per_character() {
        assert_eq!(count_words("日本語のテスト"), 7);
        assert_eq!(count_words("mixed 日本 text"), 4);
    }

    #[test]
    fn test_list_fields_are_joined_and_unbracketed() {
        let original = TranscriptContent {
            body: Some("a".into()),
            speakers: vec!["['alice']".into()],
            ..Default::default()
        };
        let current = TranscriptContent {
            body: Some("a".into()),
            speakers: vec!["['alice'".into(), "'bob']".into()],
            ..Default::default()
        };
        let stats = compute_diff_stats(&original, &current).unwrap();
        assert_eq!(stats.added_words, 1); // bob
        assert_eq!(stats.removed_words, 0);
    }
}
