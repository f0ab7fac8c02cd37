use serde::{Deserialize, Serialize};

/// A record stored inside an uploaded archive, as seen before extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Entry name exactly as stored in the container.
    pub path: String,
    pub is_dir: bool,
    /// Uncompressed size declared by the container (0 for directories).
    pub size: u64,
}

/// One entry written into the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntry {
    /// Normalized forward-slash path relative to the workspace root.
    pub relative_path: String,
    pub size: u64,
    pub is_dir: bool,
}

/// Summary of a completed extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractReport {
    pub file_count: usize,
    pub dir_count: usize,
    pub bytes_written: u64,
    pub entries: Vec<ExtractedEntry>,
}

impl ExtractReport {
    pub(crate) fn push_dir(&mut self, relative_path: String) {
        self.dir_count += 1;
        self.entries.push(ExtractedEntry {
            relative_path,
            size: 0,
            is_dir: true,
        });
    }

    pub(crate) fn push_file(&mut self, relative_path: String, size: u64) {
        self.file_count += 1;
        self.bytes_written += size;
        self.entries.push(ExtractedEntry {
            relative_path,
            size,
            is_dir: false,
        });
    }

    /// Total number of entries processed.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_tracks_files_and_dirs() {
        let mut report = ExtractReport::default();
        report.push_dir("src".into());
        report.push_file("src/lib.rs".into(), 42);
        report.push_file("README.md".into(), 8);

        assert_eq!(report.dir_count, 1);
        assert_eq!(report.file_count, 2);
        assert_eq!(report.bytes_written, 50);
        assert_eq!(report.entry_count(), 3);
        assert!(report.entries[0].is_dir);
    }
}
