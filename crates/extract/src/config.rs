//! Configuration types for archive extraction.
//!
//! [`ExtractConfig`] carries the size ceiling and the workspace placement used
//! by [`extract_archive`](crate::extract_archive). The defaults are the
//! production policy; tests shrink the limits to keep fixtures small.
//!
//! ```rust
//! use extract::{ExtractConfig, MAX_ARCHIVE_BYTES};
//!
//! let config = ExtractConfig::default();
//! assert_eq!(config.max_archive_bytes, MAX_ARCHIVE_BYTES);
//! config.validate().expect("defaults are valid");
//! ```
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upload ceiling: 200 MiB.
pub const MAX_ARCHIVE_BYTES: u64 = 200 * 1024 * 1024;

/// Prefix for workspace directory names. A random suffix is always appended.
pub const DEFAULT_WORKSPACE_PREFIX: &str = "locstat-";

/// Runtime configuration for the safe extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Maximum size of the compressed upload, checked before the container is opened.
    ///
    /// Default: [`MAX_ARCHIVE_BYTES`]
    pub max_archive_bytes: u64,

    /// Optional ceiling on the total number of bytes written to the workspace.
    ///
    /// Guards against highly compressible payloads. Exceeding it fails with
    /// [`ExtractError::ArchiveTooLarge`](crate::ExtractError::ArchiveTooLarge).
    ///
    /// Default: `None` (unlimited)
    #[serde(default)]
    pub max_uncompressed_bytes: Option<u64>,

    /// Directory under which workspaces are created.
    ///
    /// Default: `None` (the system temp directory)
    #[serde(default)]
    pub workspace_parent: Option<PathBuf>,

    /// Name prefix for workspace directories.
    ///
    /// Default: [`DEFAULT_WORKSPACE_PREFIX`]
    pub workspace_prefix: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_archive_bytes: MAX_ARCHIVE_BYTES,
            max_uncompressed_bytes: None,
            workspace_parent: None,
            workspace_prefix: DEFAULT_WORKSPACE_PREFIX.to_string(),
        }
    }
}

impl ExtractConfig {
    /// Sets the parent directory for workspaces.
    pub fn with_workspace_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.workspace_parent = Some(parent.into());
        self
    }

    /// Sets the compressed upload ceiling.
    pub fn with_max_archive_bytes(mut self, limit: u64) -> Self {
        self.max_archive_bytes = limit;
        self
    }

    /// Sets the cumulative decompressed ceiling.
    pub fn with_max_uncompressed_bytes(mut self, limit: u64) -> Self {
        self.max_uncompressed_bytes = Some(limit);
        self
    }

    /// Validates the configuration for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_archive_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_archive_bytes must be greater than zero".into(),
            ));
        }
        if self.max_uncompressed_bytes == Some(0) {
            return Err(ConfigError::InvalidLimit(
                "max_uncompressed_bytes must be greater than zero when set".into(),
            ));
        }
        let prefix = self.workspace_prefix.trim();
        if prefix.is_empty() || prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidPrefix(self.workspace_prefix.clone()));
        }
        Ok(())
    }
}

/// Errors returned by [`ExtractConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid limit: {0}")]
    InvalidLimit(String),

    #[error("invalid workspace prefix: {0:?}")]
    InvalidPrefix(String),
}
