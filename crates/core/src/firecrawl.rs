//! Scraping-service client (Firecrawl).
//!
//! The managed scraping backend is the fallback strategy for pages the
//! direct fetch cannot handle: bot walls, JavaScript-only rendering, thin
//! server HTML. The resolver talks to it through the [`ScrapeClient`] trait;
//! an unconfigured client (`None` in the deps) disables the fallback
//! entirely.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Result, SkimError};

const DEFAULT_ENDPOINT: &str = "https://api.firecrawl.dev/v2/scrape";

/// One scrape result: markdown rendering, raw HTML when the service captured
/// it, and the service's own metadata object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapePayload {
    pub markdown: Option<String>,
    pub html: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Diagnostics describing the scraping-service leg of one resolution.
///
/// `notes` is append-only: every fallback reason and recoverable failure
/// encountered during the resolution is pushed in order and never
/// overwritten.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FirecrawlDiagnostics {
    pub attempted: bool,
    pub used: bool,
    pub notes: Vec<String>,
}

impl FirecrawlDiagnostics {
    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

/// Scraping-service seam used by the resolver.
///
/// `Ok(None)` means the service answered but had nothing for this URL;
/// errors mean the request itself failed. Both are recoverable from the
/// resolver's point of view.
#[async_trait]
pub trait ScrapeClient: Send + Sync {
    async fn scrape(&self, url: &str, timeout_ms: u64) -> Result<Option<ScrapePayload>>;
}

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: &'a [&'a str],
}

#[derive(Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapePayload>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the Firecrawl scrape API.
#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    api_key: String,
    endpoint: String,
}

impl FirecrawlClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), endpoint: DEFAULT_ENDPOINT.to_string() }
    }

    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), endpoint: endpoint.into() }
    }

    /// Build a client from `FIRECRAWL_API_KEY`, or `None` when the service
    /// is not configured.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("FIRECRAWL_API_KEY").ok()?;
        let api_key = api_key.trim();
        if api_key.is_empty() { None } else { Some(Self::new(api_key)) }
    }
}

#[async_trait]
impl ScrapeClient for FirecrawlClient {
    async fn scrape(&self, url: &str, timeout_ms: u64) -> Result<Option<ScrapePayload>> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(SkimError::HttpError)?;

        let request = ScrapeRequest { url, formats: &["markdown", "html"] };
        let response = client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SkimError::Timeout { timeout_ms }
                } else {
                    SkimError::HttpError(e)
                }
            })?;

        let body: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| SkimError::InvalidPayload(e.to_string()))?;

        if !body.success {
            let reason = body.error.unwrap_or_else(|| "scrape request was not successful".to_string());
            return Err(SkimError::InvalidPayload(reason));
        }

        Ok(body.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_default() {
        let diagnostics = FirecrawlDiagnostics::default();
        assert!(!diagnostics.attempted);
        assert!(!diagnostics.used);
        assert!(diagnostics.notes.is_empty());
    }

    #[test]
    fn test_notes_append_in_order() {
        let mut diagnostics = FirecrawlDiagnostics::default();
        diagnostics.push_note("first");
        diagnostics.push_note("second");
        assert_eq!(diagnostics.notes, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_scrape_payload_deserializes_partial_data() {
        let payload: ScrapePayload = serde_json::from_str(r##"{"markdown": "# Hi"}"##).unwrap();
        assert_eq!(payload.markdown.as_deref(), Some("# Hi"));
        assert!(payload.html.is_none());
        assert!(payload.metadata.is_none());
    }

    #[test]
    fn test_scrape_response_envelope() {
        let raw = r#"{
            "success": true,
            "data": {
                "markdown": "content",
                "html": "<p>content</p>",
                "metadata": {"title": "A page"}
            }
        }"#;
        let response: ScrapeResponse = serde_json::from_str(raw).unwrap();
        assert!(response.success);
        let data = response.data.unwrap();
        assert_eq!(data.markdown.as_deref(), Some("content"));
        assert!(data.metadata.is_some());
    }

    #[test]
    fn test_scrape_response_error_envelope() {
        let raw = r#"{"success": false, "error": "rate limited"}"#;
        let response: ScrapeResponse = serde_json::from_str(raw).unwrap();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("rate limited"));
    }
}
