//! Error types for link content resolution.
//!
//! This module defines the main error type [`SkimError`] which represents
//! all possible errors that can occur while fetching, scraping, and
//! assembling link content.

use thiserror::Error;

/// Main error type for link content resolution.
///
/// This enum represents all possible errors that can occur during HTTP
/// fetching, scraping-service calls, and result assembly. Collaborator
/// failures the resolver can recover from (a failed scrape, a missing
/// transcript) are not errors; they are recorded as diagnostics notes
/// instead.
#[derive(Error, Debug)]
pub enum SkimError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed or is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The direct HTML fetch did not complete.
    ///
    /// Surfaced when no scraping-service fallback applies and the page could
    /// not be fetched.
    #[error("Failed to fetch HTML document: {0}")]
    FetchFailed(String),

    /// Neither the direct fetch nor the scraping service produced content.
    ///
    /// The message carries every accumulated diagnostics note plus the
    /// original fetch error, so callers can tell "site unreachable" apart
    /// from "site reachable but empty/blocked".
    #[error("No usable content{}{}", format_notes(.notes), format_fetch_error(.fetch_error))]
    NoUsableContent {
        notes: Vec<String>,
        fetch_error: Option<String>,
    },

    /// A remote service answered with a payload we could not interpret.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// File I/O errors.
    ///
    /// Wraps standard I/O errors for cache reads.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_notes(notes: &[String]) -> String {
    if notes.is_empty() { String::new() } else { format!("; notes: {}", notes.join("; ")) }
}

fn format_fetch_error(fetch_error: &Option<String>) -> String {
    match fetch_error {
        Some(e) => format!("; HTML error: {}", e),
        None => String::new(),
    }
}

/// Result type alias for SkimError.
///
/// This is a convenience alias for `std::result::Result<T, SkimError>`.
pub type Result<T> = std::result::Result<T, SkimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SkimError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_timeout_error() {
        let err = SkimError::Timeout { timeout_ms: 30_000 };
        assert!(err.to_string().contains("30000"));
    }

    #[test]
    fn test_no_usable_content_combines_notes_and_fetch_error() {
        let err = SkimError::NoUsableContent {
            notes: vec!["HTML fetch failed; falling back to Firecrawl".to_string()],
            fetch_error: Some("connection refused".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("falling back to Firecrawl"));
        assert!(message.contains("connection refused"));
    }

    #[test]
    fn test_no_usable_content_without_details() {
        let err = SkimError::NoUsableContent { notes: vec![], fetch_error: None };
        assert_eq!(err.to_string(), "No usable content");
    }
}
