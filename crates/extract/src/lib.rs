//! Archive Extract Layer
//!
//! This is where an uploaded project archive becomes a directory tree. We take
//! the raw bytes of a zip container, check them against the size policy, and
//! unpack every entry into a disposable per-request [`Workspace`].
//!
//! ## What we do here
//!
//! - **Bound the input** - empty and oversized uploads are rejected before the
//!   container is even opened.
//! - **Keep entries inside the workspace** - every entry name is normalized and
//!   then checked again after being resolved against the workspace root. Either
//!   guard failing is an [`ExtractError::UnsafePath`].
//! - **Write payloads verbatim** - no content is interpreted here; classification
//!   happens downstream.
//! - **Clean up unconditionally** - a [`Workspace`] deletes itself on drop.
//!
//! ## Example
//!
//! ```
//! use std::io::{Cursor, Write};
//! use extract::{extract_archive, ExtractConfig, Workspace};
//!
//! let mut buf = Cursor::new(Vec::new());
//! {
//!     let mut zip = zip::ZipWriter::new(&mut buf);
//!     zip.start_file("src/main.rs", zip::write::SimpleFileOptions::default()).unwrap();
//!     zip.write_all(b"fn main() {}\n").unwrap();
//!     zip.finish().unwrap();
//! }
//!
//! let config = ExtractConfig::default();
//! let workspace = Workspace::create(&config).unwrap();
//! let report = extract_archive(buf.get_ref(), &workspace, &config).unwrap();
//!
//! assert_eq!(report.file_count, 1);
//! assert!(workspace.path().join("src/main.rs").is_file());
//! ```
use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::time::Instant;

use tracing::{debug, info, warn};
use zip::ZipArchive;

mod config;
mod error;
mod sanitize;
mod types;
mod workspace;

pub use crate::config::{ConfigError, ExtractConfig, DEFAULT_WORKSPACE_PREFIX, MAX_ARCHIVE_BYTES};
pub use crate::error::ExtractError;
pub use crate::sanitize::{normalize_entry_path, resolve_within};
pub use crate::types::{ArchiveEntry, ExtractReport, ExtractedEntry};
pub use crate::workspace::{with_workspace, Workspace};

/// Reject uploads that are empty or exceed the configured ceiling.
///
/// Runs before any decompression work.
pub fn validate_archive_bytes(bytes: &[u8], cfg: &ExtractConfig) -> Result<(), ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::EmptyArchive);
    }
    let size = bytes.len() as u64;
    if size > cfg.max_archive_bytes {
        return Err(ExtractError::ArchiveTooLarge {
            size,
            limit: cfg.max_archive_bytes,
        });
    }
    Ok(())
}

/// List the records of an archive without writing anything to disk.
///
/// The same size checks as extraction apply before the container is opened.
pub fn list_entries(
    bytes: &[u8],
    cfg: &ExtractConfig,
) -> Result<Vec<ArchiveEntry>, ExtractError> {
    validate_archive_bytes(bytes, cfg)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let file = archive.by_index(index)?;
        let is_dir = file.is_dir();
        entries.push(ArchiveEntry {
            path: file.name().to_string(),
            is_dir,
            size: if is_dir { 0 } else { file.size() },
        });
    }
    Ok(entries)
}

/// Validate `bytes` and unpack every entry into `workspace`.
///
/// Fails on the first unsafe entry. Entries written before the failure stay in
/// the workspace until it is dropped; callers never observe them.
pub fn extract_archive(
    bytes: &[u8],
    workspace: &Workspace,
    cfg: &ExtractConfig,
) -> Result<ExtractReport, ExtractError> {
    let start = Instant::now();
    let span = tracing::info_span!("extract.extract_archive", archive_bytes = bytes.len());
    let _guard = span.enter();

    match extract_inner(bytes, workspace, cfg) {
        Ok(report) => {
            info!(
                files = report.file_count,
                dirs = report.dir_count,
                bytes_written = report.bytes_written,
                elapsed_micros = start.elapsed().as_micros(),
                "extract_success"
            );
            Ok(report)
        }
        Err(err) => {
            warn!(
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "extract_failure"
            );
            Err(err)
        }
    }
}

fn extract_inner(
    bytes: &[u8],
    workspace: &Workspace,
    cfg: &ExtractConfig,
) -> Result<ExtractReport, ExtractError> {
    validate_archive_bytes(bytes, cfg)?;

    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    if archive.is_empty() {
        return Err(ExtractError::NoEntries);
    }

    let root = workspace.path();
    let mut report = ExtractReport::default();

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        let raw_name = file.name().to_string();
        let normalized = normalize_entry_path(&raw_name)?;
        let target = resolve_within(root, &normalized)?;

        if file.is_dir() {
            fs::create_dir_all(&target)?;
            debug!(entry = %normalized, "extract_dir");
            report.push_dir(normalized);
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        let written = match cfg.max_uncompressed_bytes {
            Some(limit) => {
                let remaining = limit.saturating_sub(report.bytes_written);
                let mut limited = (&mut file).take(remaining.saturating_add(1));
                let copied = io::copy(&mut limited, &mut out)?;
                if copied > remaining {
                    return Err(ExtractError::ArchiveTooLarge {
                        size: report.bytes_written + copied,
                        limit,
                    });
                }
                copied
            }
            None => io::copy(&mut file, &mut out)?,
        };
        debug!(entry = %normalized, bytes = written, "extract_file");
        report.push_file(normalized, written);
    }

    Ok(report)
}
