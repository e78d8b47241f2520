//! Page text helpers: title and visible text.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

static TITLE: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("title").ok());
static H1: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("h1").ok());

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of the document, whitespace-collapsed.
pub fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    collapse_whitespace(&out)
}

/// `<title>` text, else the first `<h1>`, else empty.
pub fn get_title(document: &Html) -> String {
    first_text(document, &TITLE)
        .or_else(|| first_text(document, &H1))
        .unwrap_or_default()
}

fn first_text(document: &Html, selector: &Option<Selector>) -> Option<String> {
    let el = document.select(selector.as_ref()?).next()?;
    let text = collapse_whitespace(&el.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_selectors_compile() {
        assert!(TITLE.is_some());
        assert!(H1.is_some());
    }

    #[test]
    fn collapses_all_whitespace() {
        assert_eq!(collapse_whitespace("  a\n\t b  c "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn title_prefers_title_tag() {
        let doc = Html::parse_document(
            "<html><head><title>\n  Gemeente   Utrecht \n</title></head><body><h1>Welkom</h1></body></html>",
        );
        assert_eq!(get_title(&doc), "Gemeente Utrecht");
    }

    #[test]
    fn title_falls_back_to_h1() {
        let doc = Html::parse_document("<body><h1>News <em>today</em></h1><h1>Other</h1></body>");
        assert_eq!(get_title(&doc), "News today");

        let doc = Html::parse_document("<head><title>   </title></head><body><h1>Heading</h1></body>");
        assert_eq!(get_title(&doc), "Heading");
    }

    #[test]
    fn title_is_empty_when_absent() {
        let doc = Html::parse_document("<body><p>No headings</p></body>");
        assert_eq!(get_title(&doc), "");
    }

    #[test]
    fn visible_text_skips_scripts_and_styles() {
        let doc = Html::parse_document(
            r#"<html><head><style>p { color: red }</style>
            <script>var updated = "Last updated: 2001-01-01";</script></head>
            <body><p>Hello</p>
            <noscript>Enable JS</noscript>
            <template><p>hidden</p></template>
            <div>  world  </div></body></html>"#,
        );
        assert_eq!(visible_text(&doc), "Hello world");
    }
}
