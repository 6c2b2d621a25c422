//! Error types for `rapyd-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`.

use std::path::PathBuf;

/// Unified error type for all core operations.
///
/// Each variant captures just enough context for the caller to display
/// a meaningful message or take corrective action. None of them is fatal
/// to a browsing session.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The request never produced an HTTP response (connection refused,
    /// timeout, TLS failure, ...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The listing service answered with a non-success status.
    #[error("listing of '{path}' failed with status {status}")]
    ListStatus { path: String, status: u16 },

    /// The listing body could not be decoded as an array of entries.
    #[error("malformed listing payload: {0}")]
    MalformedPayload(String),

    /// A content, thumbnail or download request answered with a non-success status.
    #[error("fetching '{path}' failed with status {status}")]
    ContentStatus { path: String, status: u16 },

    /// Fetched content could not be decoded for preview.
    #[error("cannot decode content: {0}")]
    UndecodableContent(String),

    /// The configured server base URL cannot be used to build request URLs.
    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    /// A directory was expected but the entry is a file.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout `rapyd-core`.
pub type CoreResult<T> = Result<T, CoreError>;
