use crate::row::{ReportRow, COLUMNS};
use lastmod_common::{LastmodError, Result};
use std::path::Path;

/// Write `rows` as CSV to `path`, creating parent directories as needed.
///
/// The header is always written, even for an empty row set.
pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(report_err)?;
    wtr.write_record(COLUMNS).map_err(report_err)?;
    for row in rows {
        wtr.serialize(row).map_err(report_err)?;
    }
    wtr.flush()?;

    tracing::info!(path=%path.display(), rows = rows.len(), "report written");
    Ok(())
}

fn report_err(e: csv::Error) -> LastmodError {
    LastmodError::Report(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lastmod_common::Status;
    use tempfile::TempDir;

    fn row(url: &str, title: &str, status: Status) -> ReportRow {
        ReportRow {
            url: url.into(),
            title: title.into(),
            best_date_utc: "2024-01-15T00:00:00+00:00".into(),
            found_where: "meta:name=date".into(),
            http_last_modified: String::new(),
            status,
            content_hash: "abc".into(),
            checked_at_utc: "2024-02-01T12:00:00.000000+00:00".into(),
        }
    }

    #[test]
    fn writes_header_and_rows_into_new_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("output").join("update_report.csv");

        write_report(&path, &[row("https://a.example", "A, with comma", Status::Ok)]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("url,title,best_date_utc,found_where,http_last_modified,status,content_hash,checked_at_utc")
        );
        assert_eq!(
            lines.next(),
            Some("https://a.example,\"A, with comma\",2024-01-15T00:00:00+00:00,meta:name=date,,OK,abc,2024-02-01T12:00:00.000000+00:00")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_report_still_has_header() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.csv");
        write_report(&path, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn failed_rows_render_status_only() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("r.csv");
        let failed = ReportRow::failed("https://gone.example", Status::Http(404), "t".into());
        write_report(&path, &[failed]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().nth(1), Some("https://gone.example,,,,,HTTP_404,,t"));
    }

    #[test]
    fn unwritable_path_is_a_report_error() {
        let tmp = TempDir::new().unwrap();
        // The target is an existing directory, so the file cannot be created.
        let err = write_report(tmp.path(), &[]).unwrap_err();
        assert!(matches!(err, LastmodError::Report(_) | LastmodError::Io(_)));
    }
}
