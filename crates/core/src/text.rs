//! Text normalization and budget-aware truncation.
//!
//! Content handed to a summarizer prompt needs canonical whitespace and a
//! hard character ceiling. Both operations here are idempotent: running them
//! a second time with the same arguments yields the same string.

use std::sync::OnceLock;

use regex::Regex;

/// Appended when truncation cuts mid-text. Counted inside the budget.
pub const TRUNCATION_INDICATOR: char = '\u{2026}';

fn control_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Keep \n and \t, drop the rest of the C0/C1 ranges.
    RE.get_or_init(|| Regex::new(r"[\u{00}-\u{08}\u{0B}\u{0C}\u{0E}-\u{1F}\u{7F}-\u{9F}]").unwrap())
}

fn horizontal_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\u{A0}]+").unwrap())
}

fn blank_line_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

fn line_edges() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ ]+|[ ]+$").unwrap())
}

/// Canonicalizes text for prompt use.
///
/// Normalizes line endings, strips control characters, collapses runs of
/// horizontal whitespace into single spaces, trims every line, caps blank
/// lines at one, and trims the ends of the whole string.
pub fn normalize_for_prompt(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let stripped = control_chars().replace_all(&unified, "");
    let collapsed = horizontal_runs().replace_all(&stripped, " ");
    let trimmed_lines = line_edges().replace_all(&collapsed, "");
    let bounded = blank_line_runs().replace_all(&trimmed_lines, "\n\n");
    bounded.trim().to_string()
}

/// Truncates `text` to at most `max_chars` characters.
///
/// When the text is cut mid-way a truncation indicator is appended; the
/// indicator itself counts toward the budget, so the result never exceeds
/// `max_chars` even with it. Measured in chars, not bytes.
pub fn truncate_to_characters(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let mut truncated: String = text.chars().take(max_chars - 1).collect();
    truncated.truncate(truncated.trim_end().len());
    truncated.push(TRUNCATION_INDICATOR);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_normalize_collapses_whitespace() {
        let text = "Hello   world\t\tagain";
        assert_eq!(normalize_for_prompt(text), "Hello world again");
    }

    #[test]
    fn test_normalize_strips_control_chars() {
        let text = "Hel\u{0}lo\u{8} world";
        assert_eq!(normalize_for_prompt(text), "Hello world");
    }

    #[test]
    fn test_normalize_unifies_line_endings() {
        let text = "one\r\ntwo\rthree";
        assert_eq!(normalize_for_prompt(text), "one\ntwo\nthree");
    }

    #[test]
    fn test_normalize_bounds_blank_lines() {
        let text = "one\n\n\n\n\ntwo";
        assert_eq!(normalize_for_prompt(text), "one\n\ntwo");
    }

    #[test]
    fn test_normalize_trims_line_edges() {
        let text = "  one  \n   two   ";
        assert_eq!(normalize_for_prompt(text), "one\ntwo");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let text = " Hello \r\n\r\n\r\n world\u{7F} \t!";
        let once = normalize_for_prompt(text);
        assert_eq!(normalize_for_prompt(&once), once);
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_to_characters("hello", 10), "hello");
    }

    #[rstest]
    #[case("hello world", 6)]
    #[case("hello world", 11)]
    #[case("a longer piece of text to cut somewhere in the middle", 20)]
    fn test_truncate_never_overshoots(#[case] text: &str, #[case] max: usize) {
        let truncated = truncate_to_characters(text, max);
        assert!(truncated.chars().count() <= max);
    }

    #[test]
    fn test_truncate_appends_indicator() {
        let truncated = truncate_to_characters("hello world", 6);
        assert!(truncated.ends_with(TRUNCATION_INDICATOR));
        assert!(truncated.chars().count() <= 6);
    }

    #[test]
    fn test_truncate_is_idempotent() {
        let truncated = truncate_to_characters("hello world, this keeps going", 12);
        assert_eq!(truncate_to_characters(&truncated, 12), truncated);
    }

    #[test]
    fn test_truncate_zero_budget() {
        assert_eq!(truncate_to_characters("hello", 0), "");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let text = "héllö wörld plus some tail";
        let truncated = truncate_to_characters(text, 8);
        assert!(truncated.chars().count() <= 8);
    }
}
