//! Buffered line reader for benchmark logs.
//!
//! Wraps any `BufRead` (a file in normal use, an in-memory buffer in tests)
//! and keeps track of the current line number for error reporting.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Buffer size for reading log files (8KB).
const BUFFER_SIZE: usize = 8 * 1024;

/// Line-oriented log reader.
pub struct LogLoader<R = BufReader<File>> {
    reader: R,
    path: Option<PathBuf>,
    line_buffer: String,
    line_number: usize,
}

impl LogLoader<BufReader<File>> {
    /// Open a log file.
    ///
    /// # Parameters
    ///
    /// * `path` - Path to the log file
    ///
    /// # Returns
    ///
    /// `Ok(LogLoader)` if file opens successfully, `Err` otherwise.
    pub fn open(path: &Path) -> Result<Self, std::io::Error> {
        let file = File::open(path)?;
        let mut loader = Self::from_reader(BufReader::with_capacity(BUFFER_SIZE, file));
        loader.path = Some(path.to_path_buf());
        Ok(loader)
    }
}

impl<R: BufRead> LogLoader<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            path: None,
            line_buffer: String::with_capacity(512),
            line_number: 0,
        }
    }

    /// Read the next line without its line terminator.
    ///
    /// Blank lines are returned as empty strings; `Ok(None)` signals EOF.
    pub fn next_line(&mut self) -> Result<Option<&str>, std::io::Error> {
        self.line_buffer.clear();
        if self.reader.read_line(&mut self.line_buffer)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        Ok(Some(self.line_buffer.trim_end_matches(['\n', '\r'])))
    }

    /// 1-based number of the line most recently returned by `next_line`.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Source file, if the loader was opened from a path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_lines_and_counts_them() {
        let mut loader = LogLoader::from_reader("first\r\n\nthird".as_bytes());
        assert_eq!(loader.next_line().unwrap(), Some("first"));
        assert_eq!(loader.line_number(), 1);
        assert_eq!(loader.next_line().unwrap(), Some(""));
        assert_eq!(loader.next_line().unwrap(), Some("third"));
        assert_eq!(loader.line_number(), 3);
        assert_eq!(loader.next_line().unwrap(), None);
        assert!(loader.path().is_none());
    }

    #[test]
    fn open_remembers_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "-- Read --").unwrap();
        let mut loader = LogLoader::open(file.path()).unwrap();
        assert_eq!(loader.path(), Some(file.path()));
        assert_eq!(loader.next_line().unwrap(), Some("-- Read --"));
        assert_eq!(loader.next_line().unwrap(), None);
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LogLoader::open(&dir.path().join("missing.txt")).is_err());
    }
}
