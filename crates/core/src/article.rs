//! Best-effort readable-text extraction from raw HTML.
//!
//! This is deliberately forgiving: the resolver only needs a usable body of
//! text to judge a page and to feed the summarizer, so extraction returns an
//! empty string on failure instead of an error.

use scraper::{Html, Selector};

/// Containers checked first, in priority order. The first one with enough
/// text wins before any density comparison happens.
const PRIORITY_CONTAINERS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    "#content",
    ".post-content",
    ".article-body",
    ".entry-content",
];

/// Tags considered when no priority container matches.
const CANDIDATE_TAGS: &[&str] = &["div", "section", "td", "blockquote"];

/// Elements whose text is boilerplate, not content.
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form"];

/// Minimum text length for a container to be accepted outright.
const MIN_CONTAINER_CHARACTERS: usize = 120;

/// Extracts the primary readable content from `html` as plain text.
///
/// Boilerplate blocks are stripped first, then semantic containers are tried
/// in priority order, then the densest generic candidate, then the
/// concatenation of all paragraphs. Returns an empty string when nothing
/// text-like can be found.
pub fn extract_article_text(html: &str) -> String {
    let mut cleaned = html.to_string();
    for tag in SKIP_TAGS {
        cleaned = strip_tag_blocks(&cleaned, tag);
    }
    let doc = Html::parse_document(&cleaned);

    for selector_str in PRIORITY_CONTAINERS {
        let Ok(selector) = Selector::parse(selector_str) else { continue };
        for element in doc.select(&selector) {
            let text = element_text(&element);
            if text.chars().count() >= MIN_CONTAINER_CHARACTERS {
                return text;
            }
        }
    }

    let mut best = String::new();
    for tag in CANDIDATE_TAGS {
        let Ok(selector) = Selector::parse(tag) else { continue };
        for element in doc.select(&selector) {
            let text = element_text(&element);
            if text.chars().count() > best.chars().count() {
                best = text;
            }
        }
    }
    if best.chars().count() >= MIN_CONTAINER_CHARACTERS {
        return best;
    }

    paragraph_text(&doc)
}

fn element_text(element: &scraper::ElementRef<'_>) -> String {
    join_blocks(element.text())
}

/// Fallback: every paragraph in document order.
fn paragraph_text(doc: &Html) -> String {
    let Ok(selector) = Selector::parse("p") else { return String::new() };
    let parts: Vec<String> = doc
        .select(&selector)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    parts.join("\n\n")
}

fn join_blocks<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for part in parts {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(trimmed);
    }
    out
}

/// Removes `<tag ...>...</tag>` blocks, ASCII-case-insensitively.
///
/// Conservative: a block is only removed when its close tag is found, so a
/// malformed document loses nothing past the last well-formed block.
fn strip_tag_blocks(html: &str, tag: &str) -> String {
    let open_pat = format!("<{}", tag);
    let close_pat = format!("</{}>", tag);
    let lower = html.to_ascii_lowercase();

    let mut out = String::new();
    let mut i = 0usize;
    while let Some(rel_start) = lower[i..].find(&open_pat) {
        let start = i + rel_start;
        let after_open = start + open_pat.len();
        // Require a real tag boundary so "nav" does not match "navigate".
        let boundary_ok = lower[after_open..]
            .chars()
            .next()
            .map(|c| c == '>' || c.is_ascii_whitespace() || c == '/')
            .unwrap_or(false);
        if !boundary_ok {
            out.push_str(&html[i..after_open]);
            i = after_open;
            continue;
        }
        if let Some(rel_end) = lower[after_open..].find(&close_pat) {
            let end = after_open + rel_end + close_pat.len();
            out.push_str(&html[i..start]);
            i = end;
        } else {
            break;
        }
    }
    out.push_str(&html[i..]);
    out
}
