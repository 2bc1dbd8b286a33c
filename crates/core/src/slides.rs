//! Slide-extraction cache validation.
//!
//! Extracted slide decks are persisted as a `slides.json` payload next to
//! their images, one directory per source. Before an extraction is reused
//! the cached payload must match the current source and settings exactly,
//! and every referenced image must still exist on disk. Any mismatch or
//! unreadable payload simply invalidates the cache; nothing here errors.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Tunables that shaped an extraction. A cache hit requires all of them to
/// match the cached payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideSettings {
    pub output_dir: PathBuf,
    pub scene_threshold: f64,
    pub max_slides: u32,
    pub min_duration_seconds: f64,
    pub ocr: bool,
}

/// The video or deck an extraction came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideSource {
    pub source_id: String,
    pub kind: String,
    pub url: String,
}

/// One captured slide within an extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub image_path: PathBuf,
    #[serde(default)]
    pub timestamp_seconds: Option<f64>,
    #[serde(default)]
    pub ocr_text: Option<String>,
}

/// The persisted `slides.json` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideExtraction {
    pub source_id: String,
    pub source_kind: String,
    pub source_url: String,
    pub slides_dir: PathBuf,
    pub scene_threshold: f64,
    pub max_slides: u32,
    pub min_slide_duration: f64,
    pub ocr_requested: bool,
    pub slides: Vec<Slide>,
}

/// Directory holding one source's slides and payload.
pub fn slides_dir_for(output_dir: &Path, source_id: &str) -> PathBuf {
    output_dir.join(source_id)
}

fn normalize_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Check a cached extraction against the current source and settings.
///
/// Returns `None` when anything disagrees: source identity, slides
/// directory, extraction tunables, an empty slide list, or a slide image
/// missing from disk.
pub async fn validate_slide_cache(
    cached: SlideExtraction, source: &SlideSource, settings: &SlideSettings,
) -> Option<SlideExtraction> {
    if cached.source_id != source.source_id {
        return None;
    }
    if cached.source_kind != source.kind {
        return None;
    }
    if cached.source_url != source.url {
        return None;
    }

    let expected_dir = slides_dir_for(&settings.output_dir, &source.source_id);
    if normalize_path(&cached.slides_dir) != normalize_path(&expected_dir) {
        return None;
    }

    if cached.scene_threshold != settings.scene_threshold {
        return None;
    }
    if cached.max_slides != settings.max_slides {
        return None;
    }
    if cached.min_slide_duration != settings.min_duration_seconds {
        return None;
    }
    if cached.ocr_requested != settings.ocr {
        return None;
    }
    if cached.slides.is_empty() {
        return None;
    }

    for slide in &cached.slides {
        match tokio::fs::metadata(&slide.image_path).await {
            Ok(meta) if meta.is_file() => {}
            _ => return None,
        }
    }

    Some(cached)
}

/// Load and validate a cached extraction for `source`, or `None` when the
/// payload is absent, unparsable, or stale.
pub async fn read_slide_cache_if_valid(
    source: &SlideSource, settings: &SlideSettings,
) -> Option<SlideExtraction> {
    let payload_path = slides_dir_for(&settings.output_dir, &source.source_id).join("slides.json");
    let raw = tokio::fs::read_to_string(&payload_path).await.ok()?;
    let parsed: SlideExtraction = serde_json::from_str(&raw).ok()?;
    validate_slide_cache(parsed, source, settings).await
}
