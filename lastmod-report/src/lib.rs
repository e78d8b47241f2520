//! URL list in, CSV report out.
//!
//! - [`read_urls`]: load and validate the URL list (`source`)
//! - [`check_url`] / [`check_all`]: fetch and analyze pages (`checker`)
//! - [`ReportRow`]: one line of the report (`row`)
//! - [`write_report`]: CSV writer (`writer`)

pub mod checker;
pub mod row;
pub mod source;
pub mod writer;

pub use checker::{check_all, check_url};
pub use row::{ReportRow, COLUMNS};
pub use source::{parse_urls, read_urls};
pub use writer::write_report;
