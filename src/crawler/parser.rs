//! HTML parser for extracting download links
//!
//! Every `<a href="...">` in the document is resolved against the page URL
//! and kept when the resolved path ends with the requested suffix.

use scraper::{Html, Selector};
use url::Url;

/// Extracts the links of an HTML document whose path ends with `suffix`
///
/// # Link Extraction Rules
///
/// - Only `<a>` elements with an `href` attribute are considered
/// - Relative hrefs are resolved against `base_url` (standard URL joining)
/// - `javascript:`, `mailto:`, `tel:`, `data:` and fragment-only hrefs are skipped
/// - The suffix match is exact and case-sensitive, against the URL path only,
///   so a query string or fragment does not hide a match
/// - Document order is preserved and duplicates are kept
///
/// # Example
///
/// ```
/// use link_harvester::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/files/game1.pgn">Game</a><a href="notes.txt">Notes</a>"#;
/// let base_url = Url::parse("https://example.com/files.html").unwrap();
/// let links = extract_links(html, &base_url, ".pgn");
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.com/files/game1.pgn");
/// ```
pub fn extract_links(html: &str, base_url: &Url, suffix: &str) -> Vec<Url> {
    let document = Html::parse_document(html);

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .filter(|link| link.path().ends_with(suffix))
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(href, error = %e, "Skipping unresolvable link");
            None
        }
    }
}
