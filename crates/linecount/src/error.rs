use thiserror::Error;

/// Errors that abort a counting request.
///
/// Per-file problems (unreadable files, invalid UTF-8) never surface here: they
/// degrade to a binary classification or a zero line count.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CountError {
    /// A count was requested with an empty extension selection.
    #[error("no extensions selected")]
    NoExtensionsSelected,

    /// The workspace root itself could not be listed.
    #[error("failed to walk workspace: {0}")]
    Walk(String),
}

impl CountError {
    /// Returns true if the caller can fix this by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CountError::NoExtensionsSelected)
    }

    /// Suggested HTTP status code: 400 for client errors, 500 otherwise.
    pub fn http_status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }
}
