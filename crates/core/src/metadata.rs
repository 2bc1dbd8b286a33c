use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

/// Page metadata surfaced alongside resolved content.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub site_name: Option<String>,
}

impl PageMetadata {
    /// Extract metadata from raw HTML.
    ///
    /// Title priority: Open Graph `og:title`, Twitter `twitter:title`,
    /// `<title>` element, first `<h1>`. Description priority:
    /// `og:description`, `twitter:description`, meta `description`.
    /// Site name: `og:site_name` only; hostname fallbacks are the caller's
    /// call.
    pub fn from_html(html: &str) -> Self {
        let doc = Html::parse_document(html);

        let title = get_meta_content(&doc, "og:title")
            .or_else(|| get_meta_content(&doc, "twitter:title"))
            .or_else(|| element_text(&doc, "title"))
            .or_else(|| element_text(&doc, "h1"));

        let description = get_meta_content(&doc, "og:description")
            .or_else(|| get_meta_content(&doc, "twitter:description"))
            .or_else(|| get_meta_content(&doc, "description"));

        let site_name = get_meta_content(&doc, "og:site_name");

        Self { title, description, site_name }
    }

    /// Extract metadata from a scraping-service metadata object.
    ///
    /// Firecrawl reports both plain and `og`-prefixed keys; the plain key
    /// wins when both are present and non-empty.
    pub fn from_scrape_metadata(meta: Option<&serde_json::Value>) -> Self {
        let Some(meta) = meta else { return Self::default() };

        Self {
            title: json_text(meta, &["title", "ogTitle"]),
            description: json_text(meta, &["description", "ogDescription"]),
            site_name: json_text(meta, &["siteName", "ogSiteName"]),
        }
    }
}

/// First non-empty text among the candidates, trimmed.
pub fn pick_first_text<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

/// Hostname of `url`, or `None` when the URL does not parse.
pub fn safe_hostname(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_string)
}

/// Get meta tag content by name or property attribute.
fn get_meta_content(doc: &Html, attr: &str) -> Option<String> {
    for selector_str in [format!("meta[name=\"{}\"]", attr), format!("meta[property=\"{}\"]", attr)] {
        if let Ok(selector) = Selector::parse(&selector_str)
            && let Some(el) = doc.select(&selector).next()
            && let Some(content) = el.value().attr("content")
        {
            let content = content.trim();
            if !content.is_empty() {
                return Some(content.to_string());
            }
        }
    }

    None
}

fn element_text(doc: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    let text: String = doc.select(&selector).next()?.text().collect();
    let text = text.trim();
    if text.is_empty() { None } else { Some(text.to_string()) }
}

fn json_text(meta: &serde_json::Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| meta.get(key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}
