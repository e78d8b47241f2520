use lastmod_common::{LastmodError, Result};
use std::path::Path;

/// Usable URLs from list text: lines trimmed, blank and `#` lines dropped.
pub fn parse_urls(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read the URL list at `path`.
///
/// A missing file or a file without usable lines is fatal.
pub fn read_urls(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(LastmodError::UrlListMissing(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    let urls = parse_urls(&text);
    if urls.is_empty() {
        return Err(LastmodError::UrlListEmpty(path.to_path_buf()));
    }
    tracing::info!(path=%path.display(), count = urls.len(), "url list loaded");
    Ok(urls)
}
