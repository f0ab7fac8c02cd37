//! Configuration for classification and counting.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of leading bytes inspected when deciding binary vs. text.
pub const BINARY_SNIFF_BYTES: usize = 2048;

/// Maximum number of entries in a report's `top_files` list.
pub const TOP_FILES_LIMIT: usize = 200;

/// Runtime configuration for the classifier and the reporter.
///
/// ```rust
/// use linecount::{CountConfig, BINARY_SNIFF_BYTES, TOP_FILES_LIMIT};
///
/// let cfg = CountConfig::default();
/// assert_eq!(cfg.sniff_bytes, BINARY_SNIFF_BYTES);
/// assert_eq!(cfg.top_files_limit, TOP_FILES_LIMIT);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountConfig {
    /// Prefix length read by the binary sniffer.
    pub sniff_bytes: usize,

    /// Cap on the ranked file list.
    pub top_files_limit: usize,

    /// Classify and count files on the rayon pool instead of the calling thread.
    ///
    /// Output is identical either way; results are reassembled in discovery order.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            sniff_bytes: BINARY_SNIFF_BYTES,
            top_files_limit: TOP_FILES_LIMIT,
            parallel: default_parallel(),
        }
    }
}

impl CountConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sniff_bytes == 0 {
            return Err(ConfigError::InvalidValue(
                "sniff_bytes must be greater than zero".into(),
            ));
        }
        if self.top_files_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "top_files_limit must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn default_parallel() -> bool {
    true
}

/// Errors returned by [`CountConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid count config: {0}")]
    InvalidValue(String),
}
