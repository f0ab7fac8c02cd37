//! Entry path sanitization (zip-slip prevention).
//!
//! Two independent guards run for every entry:
//!
//! 1. [`normalize_entry_path`] works on the stored name as a string and rejects
//!    anything empty, absolute, or starting with a parent-directory segment.
//! 2. [`resolve_within`] joins the normalized name onto the workspace root,
//!    resolves it lexically, and requires the result to sit strictly below the root.
use std::path::{Component, Path, PathBuf};

use crate::error::ExtractError;

/// Normalize an archive entry name into a relative, forward-slash path.
///
/// Backslashes are treated as separators, `.` and empty segments are dropped
/// and `name/..` pairs are folded. The result never starts with `..`.
///
/// ```rust
/// use extract::normalize_entry_path;
///
/// assert_eq!(normalize_entry_path("src\\lib.rs").unwrap(), "src/lib.rs");
/// assert_eq!(normalize_entry_path("./a//b/../c.txt").unwrap(), "a/c.txt");
/// assert!(normalize_entry_path("../escape.txt").is_err());
/// assert!(normalize_entry_path("/etc/passwd").is_err());
/// ```
pub fn normalize_entry_path(raw: &str) -> Result<String, ExtractError> {
    let unsafe_path = || ExtractError::UnsafePath(raw.to_string());

    if raw.contains('\0') {
        return Err(unsafe_path());
    }

    let unified = raw.replace('\\', "/");
    if is_absolute_name(&unified) {
        return Err(unsafe_path());
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    match segments.first() {
        None => Err(unsafe_path()),
        Some(&"..") => Err(unsafe_path()),
        Some(_) => Ok(segments.join("/")),
    }
}

/// Resolve a normalized entry path against `root` and confirm containment.
///
/// Returns the output path on success. The root itself is not a valid target;
/// every entry must land strictly inside it.
pub fn resolve_within(root: &Path, normalized: &str) -> Result<PathBuf, ExtractError> {
    let base = lexical_normalize(root);
    let resolved = lexical_normalize(&base.join(normalized));

    if resolved == base || !resolved.starts_with(&base) {
        return Err(ExtractError::UnsafePath(normalized.to_string()));
    }
    Ok(resolved)
}

/// `/x`, `\\server\share` (already unified to `//…`) and drive-letter names.
fn is_absolute_name(name: &str) -> bool {
    if name.starts_with('/') {
        return true;
    }
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            Component::Normal(part) => result.push(part),
            Component::RootDir => result.push(component.as_os_str()),
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
        }
    }
    result
}
