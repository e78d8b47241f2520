//! Single-shot page fetcher with safe logging and explicit failure values.
//!
//! - One GET per URL, bounded timeout, descriptive `User-Agent`
//! - No retries; redirects follow the transport default
//! - Status >= 400 short-circuits: the body is never read
//! - Failures are returned as [`Status`] values, never as errors
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), lastmod_http::HttpError> {
//! use lastmod_http::{ClientOpts, HttpClient, PageFetcher};
//!
//! let client = HttpClient::new(ClientOpts::default())?;
//! let fetched = client.fetch("https://example.com/").await;
//! println!("{} -> {}", fetched.url, fetched.status);
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated) and failures, plus raw
//! request/response lines (target `http.raw`) when `LASTMOD_HTTP_RAW=1`.

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use lastmod_common::{FetchErrorKind, Status};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use reqwest::header::{HeaderMap, CONTENT_TYPE, LAST_MODIFIED, USER_AGENT};
use reqwest::{Client, Url};
use std::borrow::Cow;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "LASTMOD_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug.
fn make_curl(url: &Url, user_agent: &str, timeout: Duration) -> String {
    format!(
        "curl -XGET --max-time {} -H '{}: {}' '{}'",
        timeout.as_secs().max(1),
        USER_AGENT.as_str(),
        user_agent.replace('\'', r"'\''"),
        url.as_str()
    )
}

fn header_pairs(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
        .collect()
}

static REQ_SEQ: AtomicU64 = AtomicU64::new(1);

fn next_req_id() -> String {
    format!("r{:x}", REQ_SEQ.fetch_add(1, Ordering::Relaxed))
}

// ==============================
// Errors & results
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("client build failed: {0}")]
    Build(String),
}

/// Outcome of one page fetch.
///
/// `body` and `last_modified` are only populated when `status` is
/// [`Status::Ok`].
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: String,
    pub status: Status,
    /// Raw response body bytes.
    pub body: Vec<u8>,
    /// `Last-Modified` response header, verbatim.
    pub last_modified: Option<String>,
    /// `charset` parameter of the `Content-Type` header.
    pub charset: Option<String>,
}

impl FetchResult {
    pub fn failed(url: &str, status: Status) -> Self {
        Self {
            url: url.to_string(),
            status,
            body: Vec::new(),
            last_modified: None,
            charset: None,
        }
    }

    /// Body decoded as text.
    ///
    /// A byte order mark wins, then the header charset, then a `<meta>`
    /// charset near the top of the document, then UTF-8. Invalid sequences
    /// are replaced.
    pub fn html(&self) -> Cow<'_, str> {
        let encoding = self
            .charset
            .as_deref()
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .or_else(|| meta_charset(&self.body))
            .unwrap_or(UTF_8);
        let (text, used, had_errors) = encoding.decode(&self.body);
        if had_errors {
            tracing::debug!(url=%self.url, encoding=used.name(), "http.body.decode_errors");
        }
        text
    }
}

/// Anything that can turn a URL into a [`FetchResult`].
///
/// Implementations must not fail: every problem is reported through
/// [`FetchResult::status`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult;
}

// ==============================
// Client
// ==============================

/// Construction knobs for [`HttpClient`].
///
/// ```
/// use lastmod_http::ClientOpts;
/// use std::time::Duration;
///
/// let opts = ClientOpts {
///     timeout: Duration::from_secs(5),
///     ..Default::default()
/// };
/// assert_eq!(opts.user_agent, "Mozilla/5.0 (UpdateChecker/1.0)");
/// assert_eq!(opts.connect_timeout, Duration::from_secs(10));
/// ```
#[derive(Clone, Debug)]
pub struct ClientOpts {
    /// Total budget for one request, body included.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOpts {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(25),
            connect_timeout: Duration::from_secs(10),
            user_agent: "Mozilla/5.0 (UpdateChecker/1.0)".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    pub timeout: Duration,
    pub user_agent: String,
}

impl HttpClient {
    /// Build a client from [`ClientOpts`].
    ///
    /// ```no_run
    /// use lastmod_http::{ClientOpts, HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new(ClientOpts::default())?;
    /// assert_eq!(client.timeout, Duration::from_secs(25));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(opts: ClientOpts) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(opts.connect_timeout)
            .user_agent(opts.user_agent.clone())
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            inner,
            timeout: opts.timeout,
            user_agent: opts.user_agent,
        })
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.timeout = dur;
        self
    }

    async fn get_page(&self, raw_url: &str) -> FetchResult {
        let url = match parse_page_url(raw_url) {
            Some(url) => url,
            None => {
                tracing::warn!(url = raw_url, "http.invalid_url");
                return FetchResult::failed(raw_url, Status::Error(FetchErrorKind::InvalidUrl));
            }
        };

        let req_id = next_req_id();
        tracing::debug!(
            req_id=%req_id,
            method="GET",
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            timeout_ms=self.timeout.as_millis() as u64,
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(&url, &self.user_agent, self.timeout);
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = std::time::Instant::now();
        let resp = match self.inner.get(url).timeout(self.timeout).send().await {
            Ok(resp) => resp,
            Err(err) => {
                let status = classify_error(&err);
                tracing::warn!(
                    req_id=%req_id,
                    status=%status,
                    message=%err,
                    "http.network_error.send"
                );
                return FetchResult::failed(raw_url, status);
            }
        };

        let code = resp.status();
        let headers = resp.headers().clone();
        let last_modified = headers
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let charset = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_param);

        tracing::debug!(
            req_id=%req_id,
            status=%code,
            final_url=%resp.url(),
            last_modified=?last_modified,
            charset=?charset,
            "http.response.headers"
        );

        if code.as_u16() >= 400 {
            // Error pages are not worth downloading.
            tracing::info!(req_id=%req_id, status=%code, "http.error");
            return FetchResult::failed(raw_url, Status::Http(code.as_u16()));
        }

        let bytes = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                let status = classify_error(&err);
                tracing::warn!(
                    req_id=%req_id,
                    status=%status,
                    message=%err,
                    "http.network_error.body"
                );
                return FetchResult::failed(raw_url, status);
            }
        };
        let dur_ms = t0.elapsed().as_millis() as u64;

        tracing::debug!(
            req_id=%req_id,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            "http.response.body"
        );

        if raw_enabled() {
            let hdrs = header_pairs(&headers);
            let truncated = bytes.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%code,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snip_body(&bytes),
            "http.response.body_snippet"
        );

        FetchResult {
            url: raw_url.to_string(),
            status: Status::Ok,
            body: bytes.to_vec(),
            last_modified,
            charset,
        }
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> FetchResult {
        self.get_page(url).await
    }
}

// ==============================
// Helpers
// ==============================

fn parse_page_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url),
        _ => None,
    }
}

/// Map a transport error onto the report's status vocabulary.
fn classify_error(err: &reqwest::Error) -> Status {
    if err.is_timeout() {
        Status::Timeout
    } else if err.is_builder() {
        Status::Error(FetchErrorKind::InvalidUrl)
    } else if err.is_redirect() {
        Status::Error(FetchErrorKind::Redirect)
    } else if err.is_connect() {
        Status::Error(FetchErrorKind::Connect)
    } else if err.is_decode() {
        Status::Error(FetchErrorKind::Decode)
    } else if err.is_body() {
        Status::Error(FetchErrorKind::Body)
    } else {
        Status::Error(FetchErrorKind::Request)
    }
}

/// `charset` parameter of a `Content-Type` value.
fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches(|c: char| c == '"' || c == '\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// How far into the body a `<meta charset>` declaration is looked for.
const META_SNIFF_BYTES: usize = 1024;

static META_CHARSET: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#).ok()
});

/// Encoding declared by `<meta charset=..>` or `<meta http-equiv=.. content="..; charset=..">`.
fn meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_SNIFF_BYTES)];
    let caps = META_CHARSET.as_ref()?.captures(head)?;
    Encoding::for_label(caps.get(1)?.as_bytes())
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(&body[..body.len().min(500)]).to_string();
    if body.len() > 500 {
        snip.push_str("...");
    }
    snip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_http_urls_with_hosts_are_fetchable() {
        assert!(parse_page_url("https://example.com/page").is_some());
        assert!(parse_page_url("  http://example.com  ").is_some());
        assert!(parse_page_url("ftp://example.com/file").is_none());
        assert!(parse_page_url("example.com").is_none());
        assert!(parse_page_url("mailto:someone@example.com").is_none());
    }

    #[test]
    fn failed_result_is_empty() {
        let r = FetchResult::failed("https://example.com", Status::Timeout);
        assert_eq!(r.status, Status::Timeout);
        assert!(r.body.is_empty());
        assert!(r.last_modified.is_none());
        assert_eq!(r.html(), "");
    }

    #[test]
    fn html_decodes_lossily() {
        let r = FetchResult {
            url: "https://example.com".into(),
            status: Status::Ok,
            body: vec![b'<', b'p', b'>', 0xff, b'<', b'/', b'p', b'>'],
            last_modified: None,
            charset: None,
        };
        assert_eq!(r.html(), "<p>\u{fffd}</p>");
    }

    fn page(body: &[u8], charset: Option<&str>) -> FetchResult {
        FetchResult {
            url: "https://example.com".into(),
            status: Status::Ok,
            body: body.to_vec(),
            last_modified: None,
            charset: charset.map(str::to_string),
        }
    }

    #[test]
    fn html_honours_header_charset() {
        let r = page(b"<title>Caf\xe9</title>", Some("ISO-8859-1"));
        assert_eq!(r.html(), "<title>Caf\u{e9}</title>");
    }

    #[test]
    fn html_falls_back_to_meta_charset() {
        let r = page(
            b"<head><meta charset=\"windows-1252\"><title>ge\xfcpdatet</title>",
            None,
        );
        assert!(r.html().contains("ge\u{fc}pdatet"));

        let r = page(
            b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=iso-8859-1\"><p>\xe9</p>",
            None,
        );
        assert!(r.html().ends_with("<p>\u{e9}</p>"));
    }

    #[test]
    fn unknown_charset_label_means_utf8() {
        let r = page("<p>caf\u{e9}</p>".as_bytes(), Some("x-made-up"));
        assert_eq!(r.html(), "<p>caf\u{e9}</p>");
    }

    #[test]
    fn charset_param_is_parsed_from_content_type() {
        assert_eq!(
            charset_param("text/html; charset=ISO-8859-1").as_deref(),
            Some("ISO-8859-1")
        );
        assert_eq!(
            charset_param("text/html;Charset=\"utf-8\"").as_deref(),
            Some("utf-8")
        );
        assert_eq!(charset_param("text/html"), None);
        assert_eq!(charset_param("text/html; charset="), None);
    }

    #[test]
    fn snip_body_truncates_long_bodies() {
        let long = vec![b'a'; 600];
        let snip = snip_body(&long);
        assert_eq!(snip.len(), 503);
        assert!(snip.ends_with("..."));
        assert_eq!(snip_body(b"short"), "short");
    }

    #[test]
    fn curl_line_quotes_user_agent() {
        let url = Url::parse("https://example.com/a").unwrap();
        let curl = make_curl(&url, "it's me", Duration::from_secs(25));
        assert!(curl.contains("--max-time 25"));
        assert!(curl.contains(r"it'\''s me"));
        assert!(curl.ends_with("'https://example.com/a'"));
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(next_req_id(), next_req_id());
    }
}
