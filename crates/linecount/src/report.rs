//! Aggregation of per-file counts into the final report.
//!
//! # Ordering
//!
//! - Extension maps: descending by count, ties broken by extension in
//!   ascending byte order.
//! - `top_files`: descending by line count, ties keep discovery order (the
//!   deterministic walk order of [`walk_files`](crate::walk_files)).
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CountError;

/// Aggregate totals for one extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSummary {
    pub extension: String,
    pub lines: u64,
    pub files: u64,
}

/// A single file's contribution to the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLineEntry {
    pub path: String,
    pub lines: u64,
}

/// Extension → count pairs kept in rank order.
///
/// Serialized as a JSON object whose keys appear in rank order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedCounts(Vec<(String, u64)>);

impl RankedCounts {
    /// Build from pairs, ranking by descending count then ascending key.
    pub fn ranked(mut pairs: Vec<(String, u64)>) -> Self {
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self(pairs)
    }

    pub fn get(&self, extension: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|(ext, _)| ext == extension)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(ext, count)| (ext.as_str(), *count))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(ext, _)| ext.as_str())
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[(String, u64)] {
        &self.0
    }
}

impl Serialize for RankedCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (ext, count) in &self.0 {
            map.serialize_entry(ext, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RankedCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RankedVisitor;

        impl<'de> Visitor<'de> for RankedVisitor {
            type Value = RankedCounts;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of extension to count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((ext, count)) = access.next_entry::<String, u64>()? {
                    pairs.push((ext, count));
                }
                Ok(RankedCounts(pairs))
            }
        }

        deserializer.deserialize_map(RankedVisitor)
    }
}

/// Final report for a count request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResult {
    pub total_files: u64,
    pub total_lines: u64,
    pub line_counts_by_ext: RankedCounts,
    pub file_counts_by_ext: RankedCounts,
    pub top_files: Vec<FileLineEntry>,
}

/// Request-local accumulator for per-file results.
///
/// Totals are sums, so the result does not depend on the order files are
/// recorded in, except for the `top_files` tie-break.
#[derive(Debug, Default)]
pub struct Aggregator {
    by_extension: BTreeMap<String, ExtensionSummary>,
    files: Vec<FileLineEntry>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one included text file.
    pub fn record(&mut self, extension: &str, relative_path: &str, lines: u64) {
        let summary = self
            .by_extension
            .entry(extension.to_string())
            .or_insert_with(|| ExtensionSummary {
                extension: extension.to_string(),
                ..Default::default()
            });
        summary.lines += lines;
        summary.files += 1;

        self.files.push(FileLineEntry {
            path: relative_path.to_string(),
            lines,
        });
    }

    /// Per-extension totals in extension order.
    pub fn summaries(&self) -> impl Iterator<Item = &ExtensionSummary> {
        self.by_extension.values()
    }

    /// Rank everything and cap `top_files` at `top_limit` entries.
    pub fn finish(self, top_limit: usize) -> CountResult {
        let Aggregator {
            by_extension,
            mut files,
        } = self;

        let total_files = files.len() as u64;
        let total_lines = by_extension.values().map(|s| s.lines).sum();

        let line_counts_by_ext = RankedCounts::ranked(
            by_extension
                .values()
                .map(|s| (s.extension.clone(), s.lines))
                .collect(),
        );
        let file_counts_by_ext = RankedCounts::ranked(
            by_extension
                .into_values()
                .map(|s| (s.extension, s.files))
                .collect(),
        );

        // Stable sort: equal counts keep the order they were recorded in.
        files.sort_by(|a, b| b.lines.cmp(&a.lines));
        files.truncate(top_limit);

        CountResult {
            total_files,
            total_lines,
            line_counts_by_ext,
            file_counts_by_ext,
            top_files: files,
        }
    }
}

/// Normalize a caller's extension selection.
///
/// Values are trimmed and lowercased, a missing leading `.` is added, and
/// blanks are dropped. An empty result is [`CountError::NoExtensionsSelected`].
///
/// ```rust
/// use linecount::normalize_selection;
///
/// let selected = normalize_selection([".PY", "rs", "  "]).unwrap();
/// assert!(selected.contains(".py"));
/// assert!(selected.contains(".rs"));
/// assert_eq!(selected.len(), 2);
/// ```
pub fn normalize_selection<I, S>(extensions: I) -> Result<BTreeSet<String>, CountError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let selected: BTreeSet<String> = extensions
        .into_iter()
        .filter_map(|ext| {
            let ext = ext.as_ref().trim().to_lowercase();
            if ext.is_empty() {
                None
            } else if ext.starts_with('.') {
                Some(ext)
            } else {
                Some(format!(".{ext}"))
            }
        })
        .collect();

    if selected.is_empty() {
        return Err(CountError::NoExtensionsSelected);
    }
    Ok(selected)
}
