//! Error types produced by the extract crate.
//!
//! Every failure an upload can trigger during extraction is typed so the
//! HTTP layer can tell caller mistakes apart from internal faults without
//! string matching.
//!
//! # Error Categories
//!
//! | Error | Category | Description |
//! |-------|----------|-------------|
//! | [`EmptyArchive`](ExtractError::EmptyArchive) | Client | Zero-byte upload |
//! | [`ArchiveTooLarge`](ExtractError::ArchiveTooLarge) | Client | Size ceiling exceeded |
//! | [`NoEntries`](ExtractError::NoEntries) | Client | Container parses but holds nothing |
//! | [`UnsafePath`](ExtractError::UnsafePath) | Client | Entry would escape the workspace |
//! | [`InvalidArchive`](ExtractError::InvalidArchive) | Internal | Decoder could not parse the container |
//! | [`Io`](ExtractError::Io) | Internal | Filesystem failure while extracting |
//!
//! # HTTP Status Code Mapping
//!
//! ```rust
//! use extract::ExtractError;
//!
//! let err = ExtractError::ArchiveTooLarge { size: 10, limit: 5 };
//! assert_eq!(err.http_status_code(), 413);
//!
//! let err = ExtractError::UnsafePath("../etc/passwd".into());
//! assert_eq!(err.http_status_code(), 400);
//!
//! let err = ExtractError::InvalidArchive("bad central directory".into());
//! assert_eq!(err.http_status_code(), 500);
//! ```
use thiserror::Error;

/// Errors that can occur while validating or unpacking an uploaded archive.
///
/// Variants carry owned strings instead of source errors so the type stays
/// `Clone + PartialEq`, which keeps test assertions and metrics observers simple.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExtractError {
    /// The upload contained zero bytes.
    #[error("empty archive")]
    EmptyArchive,

    /// The upload (or its decompressed content) exceeds the configured ceiling.
    #[error("archive too large: {size} bytes exceeds limit of {limit} bytes")]
    ArchiveTooLarge { size: u64, limit: u64 },

    /// The container was readable but holds no entries.
    #[error("archive contains no files")]
    NoEntries,

    /// An entry path is empty, absolute, or traverses out of the workspace.
    ///
    /// The payload is the raw entry name as stored in the archive.
    #[error("unsafe path in archive: {0}")]
    UnsafePath(String),

    /// The decoder rejected the container (corrupt or not a zip).
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// A filesystem operation failed while populating the workspace.
    #[error("io failure during extraction: {0}")]
    Io(String),
}

impl ExtractError {
    /// Returns true if this error was caused by the uploaded content itself.
    ///
    /// ```rust
    /// use extract::ExtractError;
    ///
    /// assert!(ExtractError::NoEntries.is_client_error());
    /// assert!(!ExtractError::Io("disk full".into()).is_client_error());
    /// ```
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExtractError::EmptyArchive
                | ExtractError::ArchiveTooLarge { .. }
                | ExtractError::NoEntries
                | ExtractError::UnsafePath(_)
        )
    }

    /// Returns a suggested HTTP status code for this error.
    ///
    /// - `ArchiveTooLarge`: 413
    /// - other client errors: 400
    /// - internal faults: 500
    pub fn http_status_code(&self) -> u16 {
        match self {
            ExtractError::ArchiveTooLarge { .. } => 413,
            e if e.is_client_error() => 400,
            _ => 500,
        }
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::Io(err.to_string())
    }
}

impl From<zip::result::ZipError> for ExtractError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => ExtractError::Io(io.to_string()),
            other => ExtractError::InvalidArchive(other.to_string()),
        }
    }
}
