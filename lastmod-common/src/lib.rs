//! Common types shared across the lastmod crates.
//!
//! This crate defines the status vocabulary written to the report, the fatal
//! error type, and the observability helpers. It stays dependency-light so
//! every other crate can depend on it.
//!
//! # Overview
//!
//! - [`Status`]: per-URL outcome, rendered as the stable `status` column
//! - [`FetchErrorKind`]: transport failure categories behind `ERROR_<Kind>`
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`LastmodError`] and [`Result`]: fatal, process-level errors
//!
//! # Examples
//!
//! ```rust
//! use lastmod_common::{FetchErrorKind, Status};
//!
//! assert_eq!(Status::Http(404).to_string(), "HTTP_404");
//! assert_eq!(Status::Error(FetchErrorKind::Connect).to_string(), "ERROR_Connect");
//! assert!(Status::OkNoDateFound.is_ok());
//! ```
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

pub mod observability;

/// Outcome of checking a single URL.
///
/// The string form is a contract with downstream consumers of the report:
/// `OK`, `OK_NO_DATE_FOUND`, `HTTP_<code>`, `ERROR_TIMEOUT`, `ERROR_<Kind>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Page fetched and a date was found (or extraction has not run yet).
    Ok,
    /// Page fetched, but no strategy produced a date.
    OkNoDateFound,
    /// Server answered with a status code >= 400.
    Http(u16),
    /// The request exceeded its time budget.
    Timeout,
    /// Any other transport or protocol failure.
    Error(FetchErrorKind),
}

impl Status {
    /// True when the page body was retrieved.
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok | Status::OkNoDateFound)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => f.write_str("OK"),
            Status::OkNoDateFound => f.write_str("OK_NO_DATE_FOUND"),
            Status::Http(code) => write!(f, "HTTP_{code}"),
            Status::Timeout => f.write_str("ERROR_TIMEOUT"),
            Status::Error(kind) => write!(f, "ERROR_{}", kind.as_str()),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Transport failure categories, distinguishable in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The URL could not be parsed or uses an unsupported scheme.
    InvalidUrl,
    /// DNS, TCP or TLS connection failure.
    Connect,
    /// Redirect loop or too many redirects.
    Redirect,
    /// Reading the response body failed midway.
    Body,
    /// Response body could not be decoded.
    Decode,
    /// Anything else the transport reports.
    Request,
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchErrorKind::InvalidUrl => "InvalidUrl",
            FetchErrorKind::Connect => "Connect",
            FetchErrorKind::Redirect => "Redirect",
            FetchErrorKind::Body => "Body",
            FetchErrorKind::Decode => "Decode",
            FetchErrorKind::Request => "Request",
        }
    }
}

/// Fatal errors. Any of these aborts the run before a report is written.
#[derive(thiserror::Error, Debug)]
pub enum LastmodError {
    /// The URL list file does not exist.
    #[error("Missing URL list {} (one URL per line)", .0.display())]
    UrlListMissing(PathBuf),

    /// The URL list has no usable lines.
    #[error("URL list {} is empty", .0.display())]
    UrlListEmpty(PathBuf),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Writing the report failed.
    #[error("Report error: {0}")]
    Report(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient alias for results that use [`LastmodError`].
pub type Result<T> = std::result::Result<T, LastmodError>;
