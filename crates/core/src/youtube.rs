//! YouTube URL recognition and watch-page scraping helpers.
//!
//! Video URLs get special treatment in the resolver: they are exempt from
//! the scraping-service fallback (transcripts supersede page content there)
//! and their watch pages carry a short description plus caption-track
//! pointers inside embedded player JSON.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com", "music.youtube.com", "youtu.be"];

/// Whether `url` points at a recognized video-hosting page.
pub fn is_youtube_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else { return false };
    let Some(host) = parsed.host_str() else { return false };
    YOUTUBE_HOSTS.contains(&host.to_ascii_lowercase().as_str())
}

/// Extract the video id from a watch, share, shorts, or embed URL.
pub fn video_id_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();

    if !YOUTUBE_HOSTS.contains(&host.as_str()) {
        return None;
    }

    if host == "youtu.be" {
        let id = parsed.path_segments()?.next()?.to_string();
        return if id.is_empty() { None } else { Some(id) };
    }

    if let Some((_, id)) = parsed.query_pairs().find(|(k, _)| k == "v") {
        let id = id.to_string();
        return if id.is_empty() { None } else { Some(id) };
    }

    let mut segments = parsed.path_segments()?;
    match segments.next() {
        Some("shorts") | Some("embed") | Some("live") => {
            let id = segments.next()?.to_string();
            if id.is_empty() { None } else { Some(id) }
        }
        _ => None,
    }
}

/// Canonical watch-page URL for a video, when an id can be extracted.
///
/// Share, shorts, and embed links all map to the plain `watch?v=` form.
pub fn canonical_watch_url(url: &str) -> Option<String> {
    video_id_from_url(url).map(|id| format!("https://www.youtube.com/watch?v={}", id))
}

fn short_description_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""shortDescription"\s*:\s*("(?:[^"\\]|\\.)*")"#).unwrap())
}

fn caption_track_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""captionTracks"\s*:\s*\[\s*\{[^\]]*?"baseUrl"\s*:\s*("(?:[^"\\]|\\.)*")"#).unwrap())
}

/// Pull the `shortDescription` string out of the embedded player response.
///
/// Returns `None` for pages without player JSON or with an empty
/// description.
pub fn extract_short_description(html: &str) -> Option<String> {
    let captured = short_description_pattern().captures(html)?;
    let text = decode_json_string(captured.get(1)?.as_str())?;
    let text = text.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

/// First caption-track URL advertised by the watch page, if any.
pub fn caption_track_url(html: &str) -> Option<String> {
    let captured = caption_track_pattern().captures(html)?;
    let url = decode_json_string(captured.get(1)?.as_str())?;
    if url.is_empty() { None } else { Some(url) }
}

/// The captures above include the surrounding quotes, so the value is a
/// complete JSON string literal; serde handles the escapes.
fn decode_json_string(literal: &str) -> Option<String> {
    serde_json::from_str::<String>(literal).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://www.youtube.com/watch?v=abc123")]
    #[case("https://youtube.com/watch?v=abc123")]
    #[case("https://m.youtube.com/watch?v=abc123")]
    #[case("https://music.youtube.com/watch?v=abc123")]
    #[case("https://youtu.be/abc123")]
    fn test_is_youtube_url(#[case] url: &str) {
        assert!(is_youtube_url(url));
    }

    #[rstest]
    #[case("https://example.com/watch?v=abc123")]
    #[case("https://vimeo.com/12345")]
    #[case("not a url")]
    fn test_is_not_youtube_url(#[case] url: &str) {
        assert!(!is_youtube_url(url));
    }

    #[rstest]
    #[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    #[case("https://youtu.be/dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/shorts/dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/embed/dQw4w9WgXcQ", "dQw4w9WgXcQ")]
    fn test_video_id_from_url(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(video_id_from_url(url), Some(expected.to_string()));
    }

    #[test]
    fn test_video_id_absent() {
        assert_eq!(video_id_from_url("https://www.youtube.com/feed/subscriptions"), None);
        assert_eq!(video_id_from_url("https://example.com/watch?v=abc"), None);
    }

    #[rstest]
    #[case("https://youtu.be/dQw4w9WgXcQ")]
    #[case("https://www.youtube.com/shorts/dQw4w9WgXcQ")]
    #[case("https://m.youtube.com/watch?v=dQw4w9WgXcQ&t=42s")]
    fn test_canonical_watch_url(#[case] url: &str) {
        assert_eq!(
            canonical_watch_url(url),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_canonical_watch_url_absent() {
        assert_eq!(canonical_watch_url("https://example.com/watch?v=abc"), None);
        assert_eq!(canonical_watch_url("https://www.youtube.com/feed/subscriptions"), None);
    }

    #[test]
    fn test_extract_short_description() {
        let html = r#"<script>var ytInitialPlayerResponse = {"videoDetails":
            {"shortDescription":"Line one\nLine two & more"}};</script>"#;
        assert_eq!(
            extract_short_description(html),
            Some("Line one\nLine two & more".to_string())
        );
    }

    #[test]
    fn test_extract_short_description_empty() {
        let html = r#"{"shortDescription":""}"#;
        assert_eq!(extract_short_description(html), None);
        assert_eq!(extract_short_description("<html></html>"), None);
    }

    #[test]
    fn test_caption_track_url() {
        let html = r#"{"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[
            {"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en","name":{"simpleText":"English"}}
        ]}}}"#;
        assert_eq!(
            caption_track_url(html),
            Some("https://www.youtube.com/api/timedtext?v=abc&lang=en".to_string())
        );
    }

    #[test]
    fn test_caption_track_url_absent() {
        assert_eq!(caption_track_url("<html></html>"), None);
    }
}
