//! Unified error types for pwa-offline.
//!
//! Every failure in the worker and the page controller ends up here. None of
//! them are fatal: callers convert them into the offline document or the
//! offline page.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// A required anchor was absent from a fetched HTML document.
///
/// Each variant names the anchor so diagnostics can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractFailure {
    #[error("content region is missing")]
    MissingContent,

    #[error("HTML missing schema markup")]
    MissingStructuredData,

    #[error("structured data is not valid JSON: {0}")]
    InvalidStructuredData(String),

    #[error("title tag is missing")]
    MissingTitle,

    #[error("canonical tag is missing")]
    MissingCanonical,
}

/// Unified error types for pwa-offline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The transport could not reach the server.
    ///
    /// HTTP error statuses are responses, not failures, and never map here.
    #[error("NETWORK_UNREACHABLE: {0}")]
    NetworkUnreachable(String),

    /// A fetched HTML document lacked a required anchor.
    #[error("EXTRACT_FAILED: {0}")]
    Extract(#[from] ExtractFailure),

    /// A JSON page envelope could not be decoded.
    #[error("INVALID_PAYLOAD: {0}")]
    InvalidPayload(String),

    /// The live page surface lacks an anchor the controller writes to.
    #[error("MISSING_ANCHOR: {0}")]
    MissingAnchor(String),

    /// No cache entry found for the given key.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::Extract(failure) => (-32000, failure.to_string()),
            Error::CacheMiss(msg) => (-32001, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::NetworkUnreachable(msg) => (-32004, msg.clone()),
            Error::InvalidPayload(msg) => (-32005, msg.clone()),
            Error::MissingAnchor(msg) => (-32006, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
