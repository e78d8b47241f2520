//! Page analysis: dates, titles and content fingerprints.
//!
//! - Date normalization from free text (`date`)
//! - `<meta>` date lookup (`meta`)
//! - Date lookup next to "last updated"-style labels (`label`)
//! - Title and visible-text helpers (`page`)
//! - Best-date selection and content hashing (`extract`)
//!
//! Note: only English and Dutch labels and month names are recognized.

pub mod date;
pub mod extract;
pub mod label;
pub mod meta;
pub mod page;

pub use date::normalize;
pub use extract::{analyze, content_hash, extract, DateCandidate, PageAnalysis, HTTP_HEADER_SOURCE};
pub use page::get_title;
