use std::fs;
use std::path::Path;

use tracing::debug;

/// Count lines in a file.
///
/// The whole file is read as UTF-8 text. Read or decode failures count as zero
/// lines so a single bad file cannot fail the request.
pub fn count_lines(path: &Path) -> u64 {
    match fs::read_to_string(path) {
        Ok(text) => count_lines_in_str(&text),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "count_read_failed");
            0
        }
    }
}

/// Number of `\n` terminators plus one; empty text is zero lines.
///
/// A trailing newline still adds the final (empty) segment, so `"a\n"` counts
/// as two lines. Downstream reports depend on this exact rule.
///
/// ```rust
/// use linecount::count_lines_in_str;
///
/// assert_eq!(count_lines_in_str(""), 0);
/// assert_eq!(count_lines_in_str("x=1\ny=2\nz=3"), 3);
/// assert_eq!(count_lines_in_str("x=1\ny=2\nz=3\n"), 4);
/// ```
pub fn count_lines_in_str(text: &str) -> u64 {
    if text.is_empty() {
        return 0;
    }
    text.bytes().filter(|&b| b == b'\n').count() as u64 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_rule() {
        let cases = [
            ("", 0),
            ("single", 1),
            ("\n", 2),
            ("hello\n", 2),
            ("a\nb", 2),
            ("a\r\nb\r\n", 3),
            ("only\rcarriage", 1),
            ("\n\n\n", 4),
        ];
        for (input, expected) in cases {
            assert_eq!(count_lines_in_str(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn reads_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.py");
        fs::write(&path, "x=1\ny=2\nz=3").unwrap();
        assert_eq!(count_lines(&path), 3);
    }

    #[test]
    fn invalid_utf8_counts_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, [b'c', b'a', b'f', 0xE9, b'\n']).unwrap();
        assert_eq!(count_lines(&path), 0);
    }

    #[test]
    fn missing_file_counts_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(count_lines(&dir.path().join("nope.txt")), 0);
    }
}
