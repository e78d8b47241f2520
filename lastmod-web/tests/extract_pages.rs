use lastmod_web::{analyze, normalize, HTTP_HEADER_SOURCE};

const NEWS_ARTICLE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <title>City council approves budget | Daily Planet</title>
  <meta property="og:title" content="City council approves budget">
  <meta property="article:published_time" content="2023-05-30T09:00:00Z">
  <meta property="article:modified_time" content="2023-06-01T10:00:00+02:00">
</head>
<body>
  <h1>City council approves budget</h1>
  <p class="byline">Last updated: 2 June 2023</p>
</body>
</html>"#;

const GEMEENTE_PAGE: &str = r#"<html>
<head><title>Afvalkalender - Gemeente Voorbeeld</title></head>
<body>
  <nav>Home / Wonen / Afval</nav>
  <main>
    <h1>Afvalkalender</h1>
    <p>Bekijk wanneer uw container wordt geleegd.</p>
    <footer>Laatst bijgewerkt: 3 maart 2022</footer>
  </main>
  <script>window.dataLayer = [{"published on": "2010-01-01"}];</script>
</body>
</html>"#;

const BARE_PAGE: &str = "<html><body><h1>Opening hours</h1><p>Mon-Fri 9-17</p></body></html>";

#[test]
fn meta_field_wins_over_label_and_header() {
    let header = normalize("Wed, 21 Oct 2015 07:28:00 GMT");
    let page = analyze(NEWS_ARTICLE, header.as_deref());

    assert_eq!(page.title, "City council approves budget | Daily Planet");
    let best = page.best.expect("date found");
    assert_eq!(best.iso_date, "2023-06-01T08:00:00+00:00");
    assert_eq!(best.found_where, "meta:property=article:modified_time");
}

#[test]
fn dutch_label_is_found_in_visible_text() {
    let page = analyze(GEMEENTE_PAGE, None);

    assert_eq!(page.title, "Afvalkalender - Gemeente Voorbeeld");
    let best = page.best.expect("date found");
    assert_eq!(best.iso_date, "2022-03-03T00:00:00+00:00");
    assert!(best.found_where.starts_with("text_label:"));
    assert_eq!(best.found_where, "text_label:Laatst bijgewerkt");
}

#[test]
fn header_used_when_page_has_no_date() {
    let header = normalize("Wed, 21 Oct 2015 07:28:00 GMT");
    let page = analyze(BARE_PAGE, header.as_deref());

    assert_eq!(page.title, "Opening hours");
    let best = page.best.expect("header date");
    assert_eq!(best.iso_date, "2015-10-21T07:28:00+00:00");
    assert_eq!(best.found_where, HTTP_HEADER_SOURCE);
}

#[test]
fn no_source_means_no_date() {
    let page = analyze(BARE_PAGE, None);
    assert!(page.best.is_none());
}

#[test]
fn garbage_markup_never_panics() {
    let page = analyze("<<<>>><title>Half <b>open", None);
    assert!(page.best.is_none());

    let page = analyze("", None);
    assert_eq!(page.title, "");
    assert!(page.best.is_none());
}
