//! Workspace traversal and binary/text classification.
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::CountConfig;
use crate::error::CountError;

/// Content classification of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Text,
    Binary,
}

/// A regular file found in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedFile {
    /// Absolute location on disk.
    pub path: PathBuf,
    /// Forward-slash path relative to the workspace root.
    pub relative_path: String,
    /// Lowercase extension including the dot; empty when the name has no dot.
    pub extension: String,
    pub kind: FileKind,
}

impl ClassifiedFile {
    pub fn is_binary(&self) -> bool {
        self.kind == FileKind::Binary
    }
}

/// Extension of `path`: the file name from its last `.` onwards, lowercased.
///
/// ```rust
/// use std::path::Path;
/// use linecount::extension_of;
///
/// assert_eq!(extension_of(Path::new("src/Main.RS")), ".rs");
/// assert_eq!(extension_of(Path::new("archive.tar.gz")), ".gz");
/// assert_eq!(extension_of(Path::new(".gitignore")), ".gitignore");
/// assert_eq!(extension_of(Path::new("Makefile")), "");
/// ```
pub fn extension_of(path: &Path) -> String {
    let Some(name) = path.file_name() else {
        return String::new();
    };
    let name = name.to_string_lossy();
    match name.rfind('.') {
        Some(idx) => name[idx..].to_lowercase(),
        None => String::new(),
    }
}

/// Classify a file by looking for a NUL byte in its first `sniff_bytes` bytes.
///
/// Unreadable files are reported as binary.
pub fn sniff_kind(path: &Path, sniff_bytes: usize) -> FileKind {
    let mut prefix = Vec::with_capacity(sniff_bytes);
    let read = File::open(path)
        .and_then(|file| file.take(sniff_bytes as u64).read_to_end(&mut prefix));
    match read {
        Ok(_) if prefix.contains(&0) => FileKind::Binary,
        Ok(_) => FileKind::Text,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "sniff_read_failed");
            FileKind::Binary
        }
    }
}

/// Collect every regular file below `root`.
///
/// Entries are visited depth-first with siblings in byte order of their names,
/// so files and sub-directories interleave by name. Nothing is filtered out:
/// hidden files and ignore files get no special treatment. Symlinks are not
/// followed. Entries that cannot be read are skipped with a warning; only an
/// unreadable `root` is an error.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>, CountError> {
    fs::read_dir(root).map_err(|err| CountError::Walk(err.to_string()))?;

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    let mut files = Vec::new();
    let mut skipped: u64 = 0;

    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                skipped = skipped.saturating_add(1);
                warn!(error = %err, "walk_skip_entry");
                continue;
            }
        };

        match entry.file_type() {
            Some(ft) if ft.is_file() => files.push(entry.into_path()),
            Some(ft) if ft.is_dir() => {}
            _ => debug!(path = %entry.path().display(), "walk_skip_special"),
        }
    }

    if skipped > 0 {
        warn!(root = %root.display(), skipped, "walk_incomplete");
    }
    Ok(files)
}

/// Forward-slash rendering of `path` relative to `root`.
pub fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

pub(crate) fn classify_file(root: &Path, path: PathBuf, sniff_bytes: usize) -> ClassifiedFile {
    ClassifiedFile {
        relative_path: relative_slash_path(root, &path),
        extension: extension_of(&path),
        kind: sniff_kind(&path, sniff_bytes),
        path,
    }
}

/// Walk and classify the whole tree, keeping discovery order.
pub fn classify_tree(root: &Path, cfg: &CountConfig) -> Result<Vec<ClassifiedFile>, CountError> {
    let paths = walk_files(root)?;
    let sniff = cfg.sniff_bytes;
    let classified = if cfg.parallel {
        paths
            .into_par_iter()
            .map(|path| classify_file(root, path, sniff))
            .collect()
    } else {
        paths
            .into_iter()
            .map(|path| classify_file(root, path, sniff))
            .collect()
    };
    Ok(classified)
}

/// Sorted, deduplicated extensions of the text files under `root`.
///
/// Files without an extension and binary files are ignored.
pub fn discover_extensions(root: &Path, cfg: &CountConfig) -> Result<Vec<String>, CountError> {
    let start = Instant::now();
    let classified = classify_tree(root, cfg)?;
    let scanned = classified.len();
    let found: BTreeSet<String> = classified
        .into_iter()
        .filter(|file| !file.is_binary() && !file.extension.is_empty())
        .map(|file| file.extension)
        .collect();

    info!(
        scanned_files = scanned,
        extensions = found.len(),
        elapsed_micros = start.elapsed().as_micros(),
        "scan_complete"
    );
    Ok(found.into_iter().collect())
}
