//! Workspace umbrella crate for locstat.
//!
//! This crate stitches archive extraction and line counting together so
//! callers can go from uploaded zip bytes to a report with a single call:
//! [`scan_archive`] lists the text extensions an archive contains and
//! [`count_archive`] builds the full per-extension line report.
//!
//! Each call owns a private [`Workspace`] that is removed before the call
//! returns, whatever the outcome.

pub use extract::{
    ArchiveEntry, ExtractConfig, ExtractError, ExtractReport, ExtractedEntry, MAX_ARCHIVE_BYTES,
    Workspace, extract_archive, list_entries, normalize_entry_path, resolve_within,
    validate_archive_bytes, with_workspace,
};
pub use linecount::{
    BINARY_SNIFF_BYTES, CountConfig, CountError, CountResult, FileKind, FileLineEntry,
    RankedCounts, TOP_FILES_LIMIT, count_lines_in_str, count_tree, discover_extensions,
    extension_of, normalize_selection,
};

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};
use tracing::{info_span, warn};

/// Caller-facing message used for every internal fault.
pub const INTERNAL_FAULT_MESSAGE: &str = "internal error while processing archive";

/// Errors that can occur while running an archive through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Extract(ExtractError),
    Count(CountError),
    InvalidConfig(String),
}

/// Stable classification of a [`PipelineError`] for callers and wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyArchive,
    ArchiveTooLarge,
    NoEntries,
    UnsafePath,
    NoExtensionsSelected,
    InternalFault,
}

impl ErrorKind {
    /// Machine-readable code, e.g. `"archive_too_large"`.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::EmptyArchive => "empty_archive",
            ErrorKind::ArchiveTooLarge => "archive_too_large",
            ErrorKind::NoEntries => "no_entries",
            ErrorKind::UnsafePath => "unsafe_path",
            ErrorKind::NoExtensionsSelected => "no_extensions_selected",
            ErrorKind::InternalFault => "internal_fault",
        }
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Extract(ExtractError::EmptyArchive) => ErrorKind::EmptyArchive,
            PipelineError::Extract(ExtractError::ArchiveTooLarge { .. }) => {
                ErrorKind::ArchiveTooLarge
            }
            PipelineError::Extract(ExtractError::NoEntries) => ErrorKind::NoEntries,
            PipelineError::Extract(ExtractError::UnsafePath(_)) => ErrorKind::UnsafePath,
            PipelineError::Count(CountError::NoExtensionsSelected) => {
                ErrorKind::NoExtensionsSelected
            }
            _ => ErrorKind::InternalFault,
        }
    }

    /// Returns true if the caller can fix this by sending a different request.
    pub fn is_client_error(&self) -> bool {
        self.kind() != ErrorKind::InternalFault
    }

    /// Suggested HTTP status code: 413 for oversized archives, 400 for other
    /// client errors, 500 for internal faults.
    pub fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::ArchiveTooLarge => 413,
            ErrorKind::InternalFault => 500,
            _ => 400,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Internal faults collapse to [`INTERNAL_FAULT_MESSAGE`]; the detailed
    /// [`Display`](fmt::Display) form is for logs only.
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            INTERNAL_FAULT_MESSAGE.to_string()
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Extract(err) if err.is_client_error() => write!(f, "{err}"),
            PipelineError::Extract(err) => write!(f, "extraction failure: {err}"),
            PipelineError::Count(err) if err.is_client_error() => write!(f, "{err}"),
            PipelineError::Count(err) => write!(f, "counting failure: {err}"),
            PipelineError::InvalidConfig(msg) => write!(f, "invalid pipeline configuration: {msg}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Extract(err) => Some(err),
            PipelineError::Count(err) => Some(err),
            PipelineError::InvalidConfig(_) => None,
        }
    }
}

impl From<ExtractError> for PipelineError {
    fn from(value: ExtractError) -> Self {
        PipelineError::Extract(value)
    }
}

impl From<CountError> for PipelineError {
    fn from(value: CountError) -> Self {
        PipelineError::Count(value)
    }
}

/// Configuration for both pipeline stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub count: CountConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.extract
            .validate()
            .map_err(|err| PipelineError::InvalidConfig(err.to_string()))?;
        self.count
            .validate()
            .map_err(|err| PipelineError::InvalidConfig(err.to_string()))
    }
}

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    fn record_extract(&self, latency: Duration, result: Result<(), ExtractError>);
    fn record_scan(&self, latency: Duration, result: Result<(), PipelineError>);
    fn record_count(&self, latency: Duration, result: Result<(), PipelineError>);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    fn record_extract(self, result: Result<(), ExtractError>) {
        self.recorder.record_extract(self.start.elapsed(), result);
    }

    fn record_scan(self, result: Result<(), PipelineError>) {
        self.recorder.record_scan(self.start.elapsed(), result);
    }

    fn record_count(self, result: Result<(), PipelineError>) {
        self.recorder.record_count(self.start.elapsed(), result);
    }
}

fn outcome<T>(result: &Result<T, PipelineError>) -> Result<(), PipelineError> {
    match result {
        Ok(_) => Ok(()),
        Err(err) => Err(err.clone()),
    }
}

fn extract_into(
    bytes: &[u8],
    workspace: &Workspace,
    cfg: &ExtractConfig,
) -> Result<ExtractReport, PipelineError> {
    let span = MetricsSpan::start();
    let result = extract_archive(bytes, workspace, cfg);
    if let Some(span) = span {
        span.record_extract(result.as_ref().map(|_| ()).map_err(|err| err.clone()));
    }
    Ok(result?)
}

fn log_internal<T>(op: &str, result: &Result<T, PipelineError>) {
    if let Err(err) = result {
        if !err.is_client_error() {
            warn!(operation = op, error = %err, "pipeline_internal_fault");
        }
    }
}

/// List the sorted, distinct extensions of the text files in `bytes` using
/// default configuration.
pub fn scan_archive(bytes: &[u8]) -> Result<Vec<String>, PipelineError> {
    scan_archive_with_config(bytes, &PipelineConfig::default())
}

/// Scan helper that accepts explicit configuration for both stages.
pub fn scan_archive_with_config(
    bytes: &[u8],
    cfg: &PipelineConfig,
) -> Result<Vec<String>, PipelineError> {
    let _span = info_span!("scan_archive", archive_bytes = bytes.len()).entered();
    let metrics = MetricsSpan::start();

    let result = run_scan(bytes, cfg);
    log_internal("scan", &result);
    if let Some(span) = metrics {
        span.record_scan(outcome(&result));
    }
    result
}

fn run_scan(bytes: &[u8], cfg: &PipelineConfig) -> Result<Vec<String>, PipelineError> {
    cfg.validate()?;
    validate_archive_bytes(bytes, &cfg.extract)?;

    with_workspace(&cfg.extract, |workspace| {
        extract_into(bytes, workspace, &cfg.extract)?;
        Ok(discover_extensions(workspace.path(), &cfg.count)?)
    })
}

/// Build the full line report for the selected extensions using default configuration.
///
/// `extensions` is normalized with [`normalize_selection`], so `"RS"`, `"rs"`
/// and `".rs"` all select the same files.
pub fn count_archive<I, S>(bytes: &[u8], extensions: I) -> Result<CountResult, PipelineError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    count_archive_with_config(bytes, extensions, &PipelineConfig::default())
}

/// Count helper that accepts explicit configuration for both stages.
///
/// Checks run in a fixed order: archive size, then the selection, then
/// extraction and counting. A request that is both oversized and missing a
/// selection reports the size problem.
pub fn count_archive_with_config<I, S>(
    bytes: &[u8],
    extensions: I,
    cfg: &PipelineConfig,
) -> Result<CountResult, PipelineError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let _span = info_span!("count_archive", archive_bytes = bytes.len()).entered();
    let metrics = MetricsSpan::start();

    let result = run_count(bytes, extensions, cfg);
    log_internal("count", &result);
    if let Some(span) = metrics {
        span.record_count(outcome(&result));
    }
    result
}

fn run_count<I, S>(
    bytes: &[u8],
    extensions: I,
    cfg: &PipelineConfig,
) -> Result<CountResult, PipelineError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cfg.validate()?;
    validate_archive_bytes(bytes, &cfg.extract)?;
    let selection = normalize_selection(extensions)?;

    with_workspace(&cfg.extract, |workspace| {
        extract_into(bytes, workspace, &cfg.extract)?;
        Ok(count_tree(workspace.path(), &selection, &cfg.count)?)
    })
}
