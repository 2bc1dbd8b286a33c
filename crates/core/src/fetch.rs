//! Direct HTML fetching over HTTP.
//!
//! This module provides the primary fetch strategy: a plain GET of the page
//! with a browser-like User-Agent and a per-request timeout. The
//! [`HtmlFetcher`] trait is the seam the resolver depends on, so tests can
//! substitute canned outcomes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::{Result, SkimError};

/// HTTP client configuration for fetching web pages.
///
/// This struct controls timeout and user agent settings for HTTP requests.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: "Mozilla/5.0 (compatible; Linkskim/0.1; +https://github.com/stormlightlabs/linkskim)"
                .to_string(),
        }
    }
}

/// Fetches HTML content from a URL.
///
/// This function performs an HTTP GET request and returns the response body as text.
/// It follows redirects, respects the configured timeout, and uses a browser-like
/// User-Agent for better compatibility.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = Url::parse(url).map_err(|e| SkimError::InvalidUrl(e.to_string()))?;

    if parsed_url.scheme().is_empty() {
        return Err(SkimError::InvalidUrl(
            "URL must include a scheme (http:// or https://)".to_string(),
        ));
    }

    let client = Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .build()
        .map_err(SkimError::HttpError)?;

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                SkimError::Timeout { timeout_ms: config.timeout_ms }
            } else {
                SkimError::HttpError(e)
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SkimError::FetchFailed(format!("HTTP {} fetching {}", status, url)));
    }

    let content = response.text().await?;

    Ok(content)
}

/// Fetch strategy seam used by the resolver.
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    /// Fetch the raw HTML document at `url`, failing on network errors or
    /// when `timeout_ms` elapses.
    async fn fetch_html(&self, url: &str, timeout_ms: u64) -> Result<String>;
}

/// reqwest-backed [`HtmlFetcher`].
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    pub user_agent: Option<String>,
}

#[async_trait]
impl HtmlFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str, timeout_ms: u64) -> Result<String> {
        let mut config = FetchConfig { timeout_ms, ..Default::default() };
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        fetch_url(url, &config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout_ms, 30_000);
        assert!(config.user_agent.contains("Linkskim"));
    }

    #[test]
    fn test_fetch_url_invalid() {
        let config = FetchConfig::default();
        let result = std::thread::spawn(move || {
            tokio::runtime::Runtime::new()
                .unwrap()
                .block_on(fetch_url("not-a-url", &config))
        })
        .join()
        .unwrap();

        assert!(matches!(result, Err(SkimError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_validation() {
        assert!(Url::parse("http://example.com").is_ok());
        assert!(Url::parse("https://example.com").is_ok());
        assert!(Url::parse("example.com").is_err()); // Missing scheme
    }

    #[test]
    fn test_error_timeout_message() {
        let err = SkimError::Timeout { timeout_ms: 30_000 };
        assert!(err.to_string().contains("30000"));
    }

    #[tokio::test]
    async fn test_fetch_url_error_status() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let _ = stream
                .write_all(b"HTTP/1.1 403 Forbidden\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .await;
        });

        let config = FetchConfig::default();
        let result = fetch_url(&format!("http://{}/blocked", addr), &config).await;

        match result {
            Err(SkimError::FetchFailed(message)) => assert!(message.contains("403")),
            other => panic!("expected FetchFailed, got {:?}", other.map(|_| ())),
        }
    }
}
