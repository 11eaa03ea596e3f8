//! Dataset file loading

use memchr::memchr_iter;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to turn the dataset file into lines
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The path does not exist
    #[error("dataset file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The path exists but could not be read
    #[error("failed to read dataset file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file was read but is not valid UTF-8
    #[error("dataset file {} is not valid UTF-8 at line {line}", path.display())]
    InvalidUtf8 { path: PathBuf, line: usize },
}

impl DatasetError {
    /// True when the failure means the file is simply absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatasetError::NotFound { .. })
    }
}

/// Read `path` into its non-empty, whitespace-trimmed lines in file order
pub fn load_lines(path: &Path) -> Result<Vec<String>, DatasetError> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            DatasetError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            DatasetError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    split_lines(&bytes).map_err(|line| DatasetError::InvalidUtf8 {
        path: path.to_path_buf(),
        line,
    })
}

/// Split raw bytes on `\n`, returning the 1-based number of the first line that
/// is not valid UTF-8 on failure
fn split_lines(bytes: &[u8]) -> Result<Vec<String>, usize> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut line_no: usize = 0;

    let ends = memchr_iter(b'\n', bytes).chain(std::iter::once(bytes.len()));
    for end in ends {
        line_no += 1;
        let raw = &bytes[start..end];
        start = end + 1;

        let text = std::str::from_utf8(raw).map_err(|_| line_no)?;
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_preserves_order_and_drops_blanks() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "20;0;11;21;0;18;3;0;\n\n  3;1;  \r\nzeta\n\n").unwrap();

        let lines = load_lines(file.path()).unwrap();
        assert_eq!(lines, vec!["20;0;11;21;0;18;3;0;", "3;1;", "zeta"]);
    }

    #[test]
    fn test_load_without_trailing_newline() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a\nb").unwrap();

        assert_eq!(load_lines(file.path()).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_file_is_empty_dataset() {
        let file = NamedTempFile::new().unwrap();
        assert!(load_lines(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_lines(&dir.path().join("nope.txt")).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_lines(dir.path()).unwrap_err();
        assert!(matches!(err, DatasetError::Unreadable { .. }));
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"ok\nfine\n\xff\xfe\n").unwrap();

        match load_lines(file.path()).unwrap_err() {
            DatasetError::InvalidUtf8 { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
