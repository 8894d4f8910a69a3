//! File-based data source.
//!
//! Polls a JSON file holding the latest reading, in the same shape as the
//! `/api/realtime` payload. Useful for offline demos and for running
//! against a local logger that writes its latest sample to disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::wire::RealtimeReading;
use super::{Reading, ReadingSource};

/// A data source that reads the latest reading from a JSON file.
///
/// The source tracks the file's modification time and only returns a
/// reading when the file has been rewritten since the last poll.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&mut self) -> Option<Reading> {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<RealtimeReading>(&content) {
                Ok(wire) => {
                    self.last_error = None;
                    Some(wire.into())
                }
                Err(e) => {
                    self.last_error = Some(format!("Parse error: {}", e));
                    None
                }
            },
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                None
            }
        }
    }
}

impl ReadingSource for FileSource {
    fn poll(&mut self) -> Option<Reading> {
        let current_modified = self.modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,        // First poll, always read
            (Some(_), None) => false, // File disappeared, keep last values
            (Some(last), Some(current)) => current > last,
        };

        if file_changed {
            if let Some(reading) = self.read_file() {
                self.last_modified = current_modified;
                return Some(reading);
            }
        }

        None
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "front_pressure": 0.182,
            "rear_pressure": 0.176,
            "timestamp": "2026-03-01T09:15:30"
        }"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/reading.json");
        assert_eq!(source.path(), Path::new("/tmp/reading.json"));
        assert_eq!(source.description(), "file: /tmp/reading.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_poll_reads_latest_reading() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", sample_json()).unwrap();
        file.flush().unwrap();

        let mut source = FileSource::new(file.path());

        let reading = source.poll().unwrap();
        assert_eq!(reading.front, 0.182);
        assert_eq!(reading.rear, 0.176);

        // Second poll without a rewrite returns nothing
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_malformed_file_reports_error_keeps_polling() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ \"front_pressure\": 0.1 }}").unwrap();
        file.flush().unwrap();

        let mut source = FileSource::new(file.path());
        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let mut source = FileSource::new("/nonexistent/reading.json");
        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Read error"));
    }
}
