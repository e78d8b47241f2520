//! Per-URL pipeline and the run loop.

use crate::row::ReportRow;
use chrono::{SecondsFormat, Utc};
use futures::stream::{self, StreamExt};
use lastmod_common::Status;
use lastmod_http::PageFetcher;
use lastmod_web::{analyze, content_hash, normalize};

/// Fetch one URL and turn the outcome into a report row. Never fails.
pub async fn check_url(fetcher: &dyn PageFetcher, url: &str) -> ReportRow {
    let checked_at_utc = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false);
    let fetched = fetcher.fetch(url).await;

    if !fetched.status.is_ok() {
        tracing::info!(url, status=%fetched.status, "check.failed");
        return ReportRow::failed(url, fetched.status, checked_at_utc);
    }

    let hash = content_hash(&fetched.body);
    let http_last_modified = fetched.last_modified.as_deref().and_then(normalize);
    if fetched.last_modified.is_some() && http_last_modified.is_none() {
        tracing::debug!(url, raw = ?fetched.last_modified, "check.last_modified_unparseable");
    }

    let page = analyze(&fetched.html(), http_last_modified.as_deref());
    let (status, best_date_utc, found_where) = match page.best {
        Some(found) => (Status::Ok, found.iso_date, found.found_where),
        None => (Status::OkNoDateFound, String::new(), String::new()),
    };

    tracing::info!(
        url,
        status=%status,
        best_date=%best_date_utc,
        found_where=%found_where,
        "check.done"
    );

    ReportRow {
        url: url.to_string(),
        title: page.title,
        best_date_utc,
        found_where,
        http_last_modified: http_last_modified.unwrap_or_default(),
        status,
        content_hash: hash,
        checked_at_utc,
    }
}

/// Check every URL with at most `concurrency` fetches in flight.
///
/// Rows come back in input order whatever the completion order.
pub async fn check_all(
    fetcher: &dyn PageFetcher,
    urls: &[String],
    concurrency: usize,
) -> Vec<ReportRow> {
    let total = urls.len();
    let limit = concurrency.max(1);
    tracing::info!(total, concurrency = limit, "run.start");

    let rows: Vec<ReportRow> = stream::iter(urls.iter().enumerate())
        .map(|(i, url)| async move {
            tracing::info!(n = i + 1, total, url = url.as_str(), "checking");
            check_url(fetcher, url).await
        })
        .buffered(limit)
        .collect()
        .await;

    let dated = rows.iter().filter(|r| r.status == Status::Ok).count();
    let undated = rows
        .iter()
        .filter(|r| r.status == Status::OkNoDateFound)
        .count();
    tracing::info!(
        total,
        dated,
        undated,
        failed = total - dated - undated,
        "run.done"
    );
    rows
}
