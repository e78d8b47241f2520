//! Best-date selection across all locators.

use crate::label::find_date_near_label;
use crate::meta::find_meta_date;
use crate::page::{get_title, visible_text};
use scraper::Html;

/// `found_where` for dates taken from the response header.
pub const HTTP_HEADER_SOURCE: &str = "http_header:Last-Modified";

/// A normalized date and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCandidate {
    /// UTC ISO-8601.
    pub iso_date: String,
    /// e.g. `meta:property=article:modified_time`, `text_label:Last updated`.
    pub found_where: String,
}

/// Everything the report needs from a parsed page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageAnalysis {
    pub title: String,
    pub best: Option<DateCandidate>,
}

/// Pick the best date for a page.
///
/// Order: `<meta>` fields, then labeled visible text, then the (already
/// normalized) `Last-Modified` header.
pub fn extract(document: &Html, http_last_modified: Option<&str>) -> Option<DateCandidate> {
    if let Some(found) = find_meta_date(document) {
        return Some(found);
    }
    if let Some(found) = find_date_near_label(&visible_text(document)) {
        return Some(found);
    }
    http_last_modified
        .filter(|s| !s.is_empty())
        .map(|iso| DateCandidate {
            iso_date: iso.to_string(),
            found_where: HTTP_HEADER_SOURCE.to_string(),
        })
}

/// Parse `html` once and pull the title and best date out of it.
///
/// The parsed document is dropped before returning, so callers may hold the
/// result across `.await` points.
///
/// ```
/// use lastmod_web::analyze;
///
/// let page = analyze(
///     "<title>Docs</title><p>Last modified: 2024-01-15</p>",
///     Some("2015-10-21T07:28:00+00:00"),
/// );
/// assert_eq!(page.title, "Docs");
/// let best = page.best.unwrap();
/// assert_eq!(best.iso_date, "2024-01-15T00:00:00+00:00");
/// assert_eq!(best.found_where, "text_label:Last modified");
/// ```
pub fn analyze(html: &str, http_last_modified: Option<&str>) -> PageAnalysis {
    let document = Html::parse_document(html);
    PageAnalysis {
        title: get_title(&document),
        best: extract(&document, http_last_modified),
    }
}

/// Lowercase hex BLAKE3 of the raw body.
pub fn content_hash(body: &[u8]) -> String {
    blake3::hash(body).to_hex().to_string()
}
