//! Line counting over an extracted source tree.
//!
//! Given a workspace directory this crate:
//!
//! - walks every regular file ([`walk_files`]),
//! - derives its lowercase extension ([`extension_of`]) and sniffs the first
//!   [`BINARY_SNIFF_BYTES`] bytes for a NUL to separate binary from text ([`sniff_kind`]),
//! - counts lines of selected text files ([`count_lines`]),
//! - and folds everything into a [`CountResult`] ([`Aggregator`]).
//!
//! Two entry points mirror the two request modes: [`discover_extensions`] for
//! the extension scan and [`count_tree`] for the full report.
//!
//! ```
//! use std::fs;
//! use linecount::{count_tree, normalize_selection, CountConfig};
//!
//! let dir = tempfile::tempdir().unwrap();
//! fs::write(dir.path().join("a.py"), "x=1\ny=2\nz=3").unwrap();
//!
//! let selection = normalize_selection([".py"]).unwrap();
//! let result = count_tree(dir.path(), &selection, &CountConfig::default()).unwrap();
//!
//! assert_eq!(result.total_files, 1);
//! assert_eq!(result.total_lines, 3);
//! assert_eq!(result.top_files[0].path, "a.py");
//! ```
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::info;

mod classify;
mod config;
mod count;
mod error;
mod report;

pub use crate::classify::{
    classify_tree, discover_extensions, extension_of, relative_slash_path, sniff_kind, walk_files,
    ClassifiedFile, FileKind,
};
pub use crate::config::{ConfigError, CountConfig, BINARY_SNIFF_BYTES, TOP_FILES_LIMIT};
pub use crate::count::{count_lines, count_lines_in_str};
pub use crate::error::CountError;
pub use crate::report::{
    normalize_selection, Aggregator, CountResult, ExtensionSummary, FileLineEntry, RankedCounts,
};

use crate::classify::classify_file;

/// Build the full report for the text files under `root` whose extension is in `selection`.
///
/// `selection` is expected to be normalized already (see [`normalize_selection`]).
/// An empty selection is rejected here as well.
pub fn count_tree(
    root: &Path,
    selection: &BTreeSet<String>,
    cfg: &CountConfig,
) -> Result<CountResult, CountError> {
    if selection.is_empty() {
        return Err(CountError::NoExtensionsSelected);
    }
    let start = Instant::now();

    let candidates: Vec<PathBuf> = walk_files(root)?
        .into_iter()
        .filter(|path| selection.contains(&extension_of(path)))
        .collect();

    let measure = |path: PathBuf| {
        let file = classify_file(root, path, cfg.sniff_bytes);
        let lines = if file.is_binary() {
            None
        } else {
            Some(count_lines(&file.path))
        };
        (file, lines)
    };
    let measured: Vec<(ClassifiedFile, Option<u64>)> = if cfg.parallel {
        candidates.into_par_iter().map(measure).collect()
    } else {
        candidates.into_iter().map(measure).collect()
    };

    let mut aggregator = Aggregator::new();
    let mut skipped_binary = 0usize;
    for (file, lines) in &measured {
        match lines {
            Some(lines) => aggregator.record(&file.extension, &file.relative_path, *lines),
            None => skipped_binary += 1,
        }
    }
    let result = aggregator.finish(cfg.top_files_limit);

    info!(
        selected_extensions = selection.len(),
        total_files = result.total_files,
        total_lines = result.total_lines,
        skipped_binary,
        elapsed_micros = start.elapsed().as_micros(),
        "count_complete"
    );
    Ok(result)
}
