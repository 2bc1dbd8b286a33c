//! Transcript resolution for video URLs.
//!
//! Two backends are supported: scraping the watch page's own caption tracks
//! ("web") and a third-party transcript API ("apify"). The transcript mode
//! gates which backends may run; `auto` tries web first and falls back to
//! Apify when a token is configured. Backend failures are soft: they are
//! recorded in the resolution's diagnostics notes and never abort the
//! overall link resolution.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;

use crate::text::normalize_for_prompt;
use crate::youtube::{canonical_watch_url, caption_track_url, is_youtube_url};
use crate::{Result, SkimError};

const APIFY_ACTOR: &str = "pintostudio~youtube-transcript-scraper";

/// Which transcript backend(s) the resolver may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptMode {
    #[default]
    Auto,
    Web,
    Apify,
}

impl TranscriptMode {
    fn allows_web(self) -> bool {
        matches!(self, Self::Auto | Self::Web)
    }

    fn allows_apify(self) -> bool {
        matches!(self, Self::Auto | Self::Apify)
    }
}

/// The backend that produced a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptSource {
    Web,
    Apify,
}

/// Diagnostics describing the transcript leg of one resolution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TranscriptDiagnostics {
    pub attempted: bool,
    pub source: Option<TranscriptSource>,
    pub notes: Vec<String>,
}

impl TranscriptDiagnostics {
    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

/// Outcome of one transcript resolution attempt.
///
/// A `None` text means no transcript was available or applicable; the
/// diagnostics say why.
#[derive(Debug, Clone, Default)]
pub struct TranscriptResolution {
    pub text: Option<String>,
    pub diagnostics: TranscriptDiagnostics,
}

impl TranscriptResolution {
    /// Resolution for URLs where transcripts do not apply.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Transcript seam used by the resolver.
#[async_trait]
pub trait TranscriptResolver: Send + Sync {
    /// Resolve a transcript for `url`, reusing already-fetched page `html`
    /// when available. Never fails; problems land in the diagnostics.
    async fn resolve(&self, url: &str, html: Option<&str>, mode: TranscriptMode, timeout_ms: u64)
    -> TranscriptResolution;
}

/// Transcript resolver for YouTube URLs.
#[derive(Debug, Clone, Default)]
pub struct YoutubeTranscripts {
    apify_token: Option<String>,
}

impl YoutubeTranscripts {
    pub fn new(apify_token: Option<String>) -> Self {
        Self { apify_token }
    }

    /// Build from `APIFY_API_TOKEN`; without it only the web backend runs.
    pub fn from_env() -> Self {
        let apify_token = std::env::var("APIFY_API_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self { apify_token }
    }

    async fn resolve_via_web(&self, url: &str, html: Option<&str>, timeout_ms: u64) -> Result<Option<String>> {
        let page = match html {
            Some(html) => html.to_string(),
            None => {
                let config = crate::fetch::FetchConfig { timeout_ms, ..Default::default() };
                crate::fetch::fetch_url(url, &config).await?
            }
        };

        let Some(track_url) = caption_track_url(&page) else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(SkimError::HttpError)?;
        let body = client.get(&track_url).send().await?.text().await?;

        let text = normalize_for_prompt(&timed_text_to_plain(&body));
        Ok(if text.is_empty() { None } else { Some(text) })
    }

    async fn resolve_via_apify(&self, url: &str, token: &str, timeout_ms: u64) -> Result<Option<String>> {
        let endpoint = format!(
            "https://api.apify.com/v2/acts/{}/run-sync-get-dataset-items?token={}",
            APIFY_ACTOR, token
        );

        // The actor expects plain watch URLs; share and shorts links are
        // canonicalized first.
        let video_url = canonical_watch_url(url).unwrap_or_else(|| url.to_string());

        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(SkimError::HttpError)?;
        let items: serde_json::Value = client
            .post(&endpoint)
            .json(&serde_json::json!({ "videoUrl": video_url }))
            .send()
            .await?
            .json()
            .await
            .map_err(|e| SkimError::InvalidPayload(e.to_string()))?;

        let text = normalize_for_prompt(&collect_transcript_items(&items));
        Ok(if text.is_empty() { None } else { Some(text) })
    }
}

#[async_trait]
impl TranscriptResolver for YoutubeTranscripts {
    async fn resolve(
        &self, url: &str, html: Option<&str>, mode: TranscriptMode, timeout_ms: u64,
    ) -> TranscriptResolution {
        if !is_youtube_url(url) {
            return TranscriptResolution::none();
        }

        let mut diagnostics = TranscriptDiagnostics { attempted: true, ..Default::default() };

        if mode.allows_web() {
            match self.resolve_via_web(url, html, timeout_ms).await {
                Ok(Some(text)) => {
                    diagnostics.source = Some(TranscriptSource::Web);
                    return TranscriptResolution { text: Some(text), diagnostics };
                }
                Ok(None) => diagnostics.push_note("no caption tracks on watch page"),
                Err(e) => diagnostics.push_note(format!("web transcript fetch failed: {}", e)),
            }
        }

        if mode.allows_apify() {
            match &self.apify_token {
                Some(token) => match self.resolve_via_apify(url, token, timeout_ms).await {
                    Ok(Some(text)) => {
                        diagnostics.source = Some(TranscriptSource::Apify);
                        return TranscriptResolution { text: Some(text), diagnostics };
                    }
                    Ok(None) => diagnostics.push_note("Apify returned an empty transcript"),
                    Err(e) => diagnostics.push_note(format!("Apify transcript fetch failed: {}", e)),
                },
                None => {
                    if mode == TranscriptMode::Apify {
                        diagnostics.push_note("Apify transcript backend is not configured");
                    }
                }
            }
        }

        TranscriptResolution { text: None, diagnostics }
    }
}

fn timed_text_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

/// Flatten a timed-text XML document into plain text.
fn timed_text_to_plain(xml: &str) -> String {
    let stripped = timed_text_tag().replace_all(xml, " ");
    decode_entities(&stripped)
}

fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#10;", "\n")
}

/// Collect `text` fields from a dataset-items response, tolerating both a
/// flat item list and items nesting their segments under `data`.
fn collect_transcript_items(items: &serde_json::Value) -> String {
    let mut parts: Vec<String> = Vec::new();
    collect_text_fields(items, &mut parts);
    parts.join(" ")
}

fn collect_text_fields(value: &serde_json::Value, parts: &mut Vec<String>) {
    match value {
        serde_json::Value::Array(values) => {
            for v in values {
                collect_text_fields(v, parts);
            }
        }
        serde_json::Value::Object(map) => {
            if let Some(text) = map.get("text").and_then(|t| t.as_str()) {
                if !text.trim().is_empty() {
                    parts.push(text.trim().to_string());
                }
            } else if let Some(data) = map.get("data") {
                collect_text_fields(data, parts);
            }
        }
        _ => {}
    }
}
