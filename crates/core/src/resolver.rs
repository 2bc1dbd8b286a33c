//! Link-content resolution pipeline.
//!
//! This is the orchestration layer: given a URL it decides between the
//! direct HTML fetch and the scraping-service fallback, merges transcript
//! text with page or markdown content, bounds the output to a character
//! budget, and assembles diagnostics describing which strategy was used and
//! why. Each of the direct fetch and the scrape runs at most once per call;
//! there are no retries here.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::article::extract_article_text;
use crate::fetch::{DEFAULT_TIMEOUT_MS, HtmlFetcher, HttpFetcher};
use crate::firecrawl::{FirecrawlClient, FirecrawlDiagnostics, ScrapeClient, ScrapePayload};
use crate::metadata::{PageMetadata, pick_first_text, safe_hostname};
use crate::text::{normalize_for_prompt, truncate_to_characters};
use crate::transcript::{TranscriptDiagnostics, TranscriptMode, TranscriptResolver, YoutubeTranscripts};
use crate::youtube::{extract_short_description, is_youtube_url};
use crate::{Result, SkimError};

/// Default character budget for resolved content.
pub const DEFAULT_MAX_CONTENT_CHARACTERS: usize = 12_000;

/// Minimum normalized article length below which fetched HTML is judged
/// thin and worth a scraping-service retry.
const MIN_HTML_CONTENT_CHARACTERS: usize = 200;

fn blocked_hint_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)access denied|attention required|captcha|cloudflare|enable javascript|forbidden|please turn javascript on|verify you are human",
        )
        .unwrap()
    })
}

/// Options for one resolution call. Unset fields fall back to the defaults
/// documented on each.
#[derive(Debug, Clone, Default)]
pub struct FetchLinkContentOptions {
    /// Character budget for the final content. Default:
    /// [`DEFAULT_MAX_CONTENT_CHARACTERS`].
    pub max_characters: Option<usize>,
    /// Per-operation timeout. Default: [`DEFAULT_TIMEOUT_MS`].
    pub timeout_ms: Option<u64>,
    /// Transcript-backend policy. Default: auto.
    pub youtube_transcript: Option<TranscriptMode>,
}

/// Which top-level path produced the final content. Immutable once set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Firecrawl,
    Html,
}

/// All diagnostics for one resolution, keyed by concern.
#[derive(Debug, Clone, Serialize)]
pub struct ContentDiagnostics {
    pub strategy: Strategy,
    pub firecrawl: FirecrawlDiagnostics,
    pub transcript: TranscriptDiagnostics,
}

/// The resolved content for a link, ready for downstream summarization.
///
/// `content` is non-empty on every successful resolution and never exceeds
/// the effective character budget.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedLinkContent {
    pub url: String,
    pub content: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub site_name: Option<String>,
    pub diagnostics: ContentDiagnostics,
}

/// Collaborators the resolver orchestrates.
///
/// A `None` scraper means the scraping service is not configured, which
/// disables the fallback entirely.
pub struct ResolverDeps {
    pub fetcher: Box<dyn HtmlFetcher>,
    pub scraper: Option<Box<dyn ScrapeClient>>,
    pub transcripts: Box<dyn TranscriptResolver>,
}

impl ResolverDeps {
    /// Production wiring: HTTP fetcher, Firecrawl from `FIRECRAWL_API_KEY`
    /// (absent key disables the fallback), transcripts from
    /// `APIFY_API_TOKEN`.
    pub fn from_env() -> Self {
        Self {
            fetcher: Box::new(HttpFetcher::default()),
            scraper: FirecrawlClient::from_env().map(|c| Box::new(c) as Box<dyn ScrapeClient>),
            transcripts: Box::new(YoutubeTranscripts::from_env()),
        }
    }
}

/// Resolve readable content and metadata for `url`.
///
/// Fails only when no path produced usable content: the direct fetch failed
/// (or yielded nothing extractable) and the scraping-service fallback was
/// either ineligible, unconfigured, or empty.
pub async fn fetch_link_content(
    url: &str, options: &FetchLinkContentOptions, deps: &ResolverDeps,
) -> Result<ExtractedLinkContent> {
    let max_characters = options.max_characters.unwrap_or(DEFAULT_MAX_CONTENT_CHARACTERS);
    let timeout_ms = options.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
    let mode = options.youtube_transcript.unwrap_or_default();

    let fetched: Result<String> = deps.fetcher.fetch_html(url, timeout_ms).await;

    if let Some(scraper) = &deps.scraper
        && !is_youtube_url(url)
        && fetched.as_ref().map(|html| looks_blocked_or_thin(html)).unwrap_or(true)
    {
        let mut firecrawl = FirecrawlDiagnostics { attempted: true, ..Default::default() };
        firecrawl.push_note(if fetched.is_ok() {
            "HTML content looked blocked/thin; falling back to Firecrawl"
        } else {
            "HTML fetch failed; falling back to Firecrawl"
        });

        let payload = match scraper.scrape(url, timeout_ms).await {
            Ok(payload) => payload,
            Err(e) => {
                firecrawl.push_note(format!("Firecrawl request failed: {}", e));
                None
            }
        };

        if let Some(payload) = payload {
            match build_from_scrape(url, &payload, max_characters, mode, timeout_ms, firecrawl, deps).await {
                Ok(result) => return Ok(result),
                Err(returned) => {
                    firecrawl = returned;
                    firecrawl.push_note("Firecrawl returned empty content");
                }
            }
        }

        if let Ok(html) = &fetched {
            return build_from_html(url, html, max_characters, mode, timeout_ms, firecrawl, deps).await;
        }

        let fetch_error = fetched.err().map(|e| e.to_string());
        return Err(SkimError::NoUsableContent { notes: firecrawl.notes, fetch_error });
    }

    let html = fetched?;
    build_from_html(url, &html, max_characters, mode, timeout_ms, FirecrawlDiagnostics::default(), deps).await
}

/// Fetched HTML that is likely a bot-block page or carries too little
/// extractable text to be worth keeping.
fn looks_blocked_or_thin(html: &str) -> bool {
    if blocked_hint_pattern().is_match(html) {
        return true;
    }
    let normalized = normalize_for_prompt(&extract_article_text(html));
    normalized.chars().count() < MIN_HTML_CONTENT_CHARACTERS
}

/// Assemble a result from a scrape payload.
///
/// Returns the diagnostics (with an explanatory note appended) instead of a
/// result when the payload normalizes to nothing, so the caller can fall
/// back to the HTML path with the full note history intact.
async fn build_from_scrape(
    url: &str, payload: &ScrapePayload, max_characters: usize, mode: TranscriptMode, timeout_ms: u64,
    mut firecrawl: FirecrawlDiagnostics, deps: &ResolverDeps,
) -> std::result::Result<ExtractedLinkContent, FirecrawlDiagnostics> {
    let normalized_markdown = normalize_for_prompt(payload.markdown.as_deref().unwrap_or(""));
    if normalized_markdown.is_empty() {
        firecrawl.push_note("Firecrawl markdown normalization yielded empty text");
        return Err(firecrawl);
    }

    let transcript = deps
        .transcripts
        .resolve(url, payload.html.as_deref(), mode, timeout_ms)
        .await;
    let base_content = select_base_content(normalized_markdown, transcript.text.as_deref());
    if base_content.is_empty() {
        firecrawl.push_note("Firecrawl produced content that normalized to an empty string");
        return Err(firecrawl);
    }

    let html_metadata = payload.html.as_deref().map(PageMetadata::from_html).unwrap_or_default();
    let scrape_metadata = PageMetadata::from_scrape_metadata(payload.metadata.as_ref());
    let hostname = safe_hostname(url);

    let title = pick_first_text([scrape_metadata.title.as_deref(), html_metadata.title.as_deref()]);
    let description = pick_first_text([scrape_metadata.description.as_deref(), html_metadata.description.as_deref()]);
    let site_name = pick_first_text([
        scrape_metadata.site_name.as_deref(),
        html_metadata.site_name.as_deref(),
        hostname.as_deref(),
    ]);

    firecrawl.used = true;

    Ok(finalize(Finalize {
        url,
        base_content,
        max_characters,
        title,
        description,
        site_name,
        strategy: Strategy::Firecrawl,
        firecrawl,
        transcript: transcript.diagnostics,
    }))
}

/// Assemble a result from directly fetched HTML, carrying forward whatever
/// scraping diagnostics accumulated before this path was chosen.
async fn build_from_html(
    url: &str, html: &str, max_characters: usize, mode: TranscriptMode, timeout_ms: u64,
    firecrawl: FirecrawlDiagnostics, deps: &ResolverDeps,
) -> Result<ExtractedLinkContent> {
    let metadata = PageMetadata::from_html(html);
    let normalized = normalize_for_prompt(&extract_article_text(html));
    let transcript = deps.transcripts.resolve(url, Some(html), mode, timeout_ms).await;

    // Only video pages without a transcript get the short-description
    // substitute; everything else uses the extracted article text.
    let youtube_description = if transcript.text.is_none() { extract_short_description(html) } else { None };
    let base_candidate = match &youtube_description {
        Some(description) => normalize_for_prompt(description),
        None => normalized.clone(),
    };

    let mut base_content = select_base_content(base_candidate, transcript.text.as_deref());
    if base_content == normalized {
        base_content = strip_leading_title(&base_content, metadata.title.as_deref());
    }

    if base_content.is_empty() {
        return Err(SkimError::NoUsableContent { notes: firecrawl.notes, fetch_error: None });
    }

    Ok(finalize(Finalize {
        url,
        base_content,
        max_characters,
        title: metadata.title,
        description: metadata.description,
        site_name: metadata.site_name,
        strategy: Strategy::Html,
        firecrawl,
        transcript: transcript.diagnostics,
    }))
}

/// Merge rule: a non-empty transcript fully supersedes the primary
/// candidate; the two are never blended.
fn select_base_content(primary: String, transcript: Option<&str>) -> String {
    if let Some(transcript) = transcript {
        let normalized = normalize_for_prompt(transcript);
        if !normalized.is_empty() {
            return normalized;
        }
    }
    primary
}

/// Strip a leading duplicate of the page title from content.
///
/// Case-insensitive match at the start of the left-trimmed content; on a
/// match the title and any immediately following whitespace or control
/// characters are removed.
fn strip_leading_title(content: &str, title: Option<&str>) -> String {
    let Some(title) = title else { return content.to_string() };
    let title = title.trim();
    if title.is_empty() || content.is_empty() {
        return content.to_string();
    }

    let trimmed = content.trim_start();
    let title_chars = title.chars().count();
    let head: String = trimmed.chars().take(title_chars).collect();
    if head.to_lowercase() != title.to_lowercase() {
        return content.to_string();
    }

    let remainder: String = trimmed.chars().skip(title_chars).collect();
    remainder
        .trim_start_matches(|c: char| c.is_whitespace() || c.is_control())
        .to_string()
}

struct Finalize<'a> {
    url: &'a str,
    base_content: String,
    max_characters: usize,
    title: Option<String>,
    description: Option<String>,
    site_name: Option<String>,
    strategy: Strategy,
    firecrawl: FirecrawlDiagnostics,
    transcript: TranscriptDiagnostics,
}

fn finalize(parts: Finalize<'_>) -> ExtractedLinkContent {
    let content = truncate_to_characters(&parts.base_content, parts.max_characters);

    ExtractedLinkContent {
        url: parts.url.to_string(),
        content,
        title: parts.title,
        description: parts.description,
        site_name: parts.site_name,
        diagnostics: ContentDiagnostics {
            strategy: parts.strategy,
            firecrawl: parts.firecrawl,
            transcript: parts.transcript,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_hint_matches_case_insensitively() {
        assert!(looks_blocked_or_thin("<html><body>Verify You Are Human</body></html>"));
        assert!(looks_blocked_or_thin("<html><body>CAPTCHA required</body></html>"));
    }

    #[test]
    fn test_thin_html_is_flagged() {
        assert!(looks_blocked_or_thin("<html><body><p>Tiny.</p></body></html>"));
    }

    #[test]
    fn test_substantial_html_is_not_flagged() {
        let paragraph = "This sentence pads the article body far enough past the threshold. ".repeat(8);
        let html = format!("<html><body><article><p>{}</p></article></body></html>", paragraph);
        assert!(!looks_blocked_or_thin(&html));
    }

    #[test]
    fn test_select_base_content_prefers_transcript() {
        let merged = select_base_content("article text".to_string(), Some("transcript text"));
        assert_eq!(merged, "transcript text");
    }

    #[test]
    fn test_select_base_content_ignores_blank_transcript() {
        let merged = select_base_content("article text".to_string(), Some("   \n  "));
        assert_eq!(merged, "article text");
    }

    #[test]
    fn test_select_base_content_without_transcript() {
        let merged = select_base_content("article text".to_string(), None);
        assert_eq!(merged, "article text");
    }

    #[test]
    fn test_strip_leading_title_matches_case_insensitively() {
        let stripped = strip_leading_title("My Great Title\n\nBody starts here.", Some("my great title"));
        assert_eq!(stripped, "Body starts here.");
    }

    #[test]
    fn test_strip_leading_title_no_match() {
        let content = "Something else entirely.";
        assert_eq!(strip_leading_title(content, Some("My Great Title")), content);
    }

    #[test]
    fn test_strip_leading_title_without_title() {
        let content = "Body text.";
        assert_eq!(strip_leading_title(content, None), content);
        assert_eq!(strip_leading_title(content, Some("   ")), content);
    }

    #[test]
    fn test_options_default_to_auto_mode() {
        let options = FetchLinkContentOptions::default();
        assert!(options.youtube_transcript.is_none());
        assert_eq!(options.youtube_transcript.unwrap_or_default(), TranscriptMode::Auto);
    }

    #[test]
    fn test_strategy_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Strategy::Firecrawl).unwrap(), "\"firecrawl\"");
        assert_eq!(serde_json::to_string(&Strategy::Html).unwrap(), "\"html\"");
    }
}
