//! `<meta>` date lookup.

use crate::date::normalize;
use crate::extract::DateCandidate;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

/// `(attribute, key)` pairs in priority order. Modification dates first,
/// publication dates as a last resort.
pub const META_KEYS: &[(&str, &str)] = &[
    ("property", "article:modified_time"),
    ("property", "og:updated_time"),
    ("name", "last-modified"),
    ("name", "dateModified"),
    ("itemprop", "dateModified"),
    ("name", "date"),
    ("property", "article:published_time"),
    ("itemprop", "datePublished"),
];

struct MetaKey {
    attr: &'static str,
    key: &'static str,
    selector: Selector,
}

static SELECTORS: Lazy<Vec<MetaKey>> = Lazy::new(|| {
    META_KEYS
        .iter()
        .filter_map(|&(attr, key)| {
            let css = format!(r#"meta[{attr}="{key}"]"#);
            let parsed = match Selector::parse(&css) {
                Ok(selector) => Some(MetaKey {
                    attr,
                    key,
                    selector,
                }),
                Err(e) => {
                    tracing::error!(css, error=%e.to_string(), "meta selector failed to parse");
                    None
                }
            };
            parsed
        })
        .collect()
});

/// First `<meta>` entry, in [`META_KEYS`] order, whose `content` parses as a
/// date.
pub fn find_meta_date(document: &Html) -> Option<DateCandidate> {
    for entry in SELECTORS.iter() {
        let Some(el) = document.select(&entry.selector).next() else {
            continue;
        };
        let content = el.value().attr("content").unwrap_or_default();
        match normalize(content) {
            Some(iso_date) => {
                return Some(DateCandidate {
                    iso_date,
                    found_where: format!("meta:{}={}", entry.attr, entry.key),
                })
            }
            None => {
                tracing::debug!(attr = entry.attr, key = entry.key, content, "meta.unparseable");
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(html: &str) -> Option<DateCandidate> {
        find_meta_date(&Html::parse_document(html))
    }

    #[test]
    fn every_key_compiles() {
        assert_eq!(SELECTORS.len(), META_KEYS.len());
    }

    #[test]
    fn modified_time_beats_published_time() {
        let html = r#"<html><head>
            <meta property="article:published_time" content="2020-01-01T00:00:00Z">
            <meta property="article:modified_time" content="2023-06-01T10:00:00+02:00">
        </head></html>"#;
        let found = find(html).unwrap();
        assert_eq!(found.iso_date, "2023-06-01T08:00:00+00:00");
        assert_eq!(found.found_where, "meta:property=article:modified_time");
    }

    #[test]
    fn unparseable_content_falls_through() {
        let html = r#"<head>
            <meta property="og:updated_time" content="sometime last week">
            <meta itemprop="dateModified" content="15/01/2024">
        </head>"#;
        let found = find(html).unwrap();
        assert_eq!(found.iso_date, "2024-01-15T00:00:00+00:00");
        assert_eq!(found.found_where, "meta:itemprop=dateModified");
    }

    #[test]
    fn only_first_element_per_key_is_considered() {
        let html = r#"<head>
            <meta name="date" content="">
            <meta name="date" content="2022-02-02">
            <meta itemprop="datePublished" content="2019-09-09">
        </head>"#;
        let found = find(html).unwrap();
        assert_eq!(found.found_where, "meta:itemprop=datePublished");
    }

    #[test]
    fn missing_content_attribute_is_skipped() {
        let html = r#"<head><meta name="last-modified"></head>"#;
        assert!(find(html).is_none());
    }

    #[test]
    fn pages_without_meta_yield_nothing() {
        assert!(find("<html><body><p>Hello</p></body></html>").is_none());
    }
}
