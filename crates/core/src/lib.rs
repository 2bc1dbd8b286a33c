pub mod article;
pub mod error;
pub mod fetch;
pub mod firecrawl;
pub mod metadata;
pub mod resolver;
pub mod slides;
pub mod text;
pub mod transcript;
pub mod youtube;

pub use article::extract_article_text;
pub use error::{Result, SkimError};
pub use fetch::{DEFAULT_TIMEOUT_MS, FetchConfig, HtmlFetcher, HttpFetcher, fetch_url};
pub use firecrawl::{FirecrawlClient, FirecrawlDiagnostics, ScrapeClient, ScrapePayload};
pub use metadata::PageMetadata;
pub use resolver::{
    ContentDiagnostics, DEFAULT_MAX_CONTENT_CHARACTERS, ExtractedLinkContent, FetchLinkContentOptions, ResolverDeps,
    Strategy, fetch_link_content,
};
pub use slides::{Slide, SlideExtraction, SlideSettings, SlideSource, read_slide_cache_if_valid, validate_slide_cache};
pub use text::{TRUNCATION_INDICATOR, normalize_for_prompt, truncate_to_characters};
pub use transcript::{
    TranscriptDiagnostics, TranscriptMode, TranscriptResolution, TranscriptResolver, TranscriptSource,
    YoutubeTranscripts,
};
pub use youtube::{canonical_watch_url, extract_short_description, is_youtube_url, video_id_from_url};
