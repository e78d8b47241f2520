use lastmod_common::Status;
use serde::Serialize;

/// Report header, in column order.
pub const COLUMNS: [&str; 8] = [
    "url",
    "title",
    "best_date_utc",
    "found_where",
    "http_last_modified",
    "status",
    "content_hash",
    "checked_at_utc",
];

/// One line of the report. Field order is column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub url: String,
    pub title: String,
    pub best_date_utc: String,
    pub found_where: String,
    /// Normalized `Last-Modified` header.
    pub http_last_modified: String,
    pub status: Status,
    pub content_hash: String,
    pub checked_at_utc: String,
}

impl ReportRow {
    /// Row for a URL whose fetch did not succeed: everything but the URL,
    /// status and check time stays empty.
    pub fn failed(url: &str, status: Status, checked_at_utc: String) -> Self {
        Self {
            url: url.to_string(),
            title: String::new(),
            best_date_utc: String::new(),
            found_where: String::new(),
            http_last_modified: String::new(),
            status,
            content_hash: String::new(),
            checked_at_utc,
        }
    }
}
