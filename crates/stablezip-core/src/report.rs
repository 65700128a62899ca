//! Archive run reporting.

use crate::ContentDigest;
use chrono::DateTime;
use chrono::Local;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

/// Report of a completed archive run.
///
/// Produced only on success; it carries the values the invoking
/// environment reports back (`hash` and `time`).
#[derive(Debug, Clone)]
pub struct ArchiveReport {
    /// Where the archive was written.
    pub output_path: PathBuf,

    /// Digest of the archive bytes.
    pub digest: ContentDigest,

    /// Resolved source files, in processing order.
    pub files: Vec<PathBuf>,

    /// Number of entries in the archive (fewer than `files` on collisions).
    pub entries: usize,

    /// Total bytes read from source files.
    pub bytes_read: u64,

    /// Size of the serialized archive.
    pub archive_size: u64,

    /// Duration of the run.
    pub duration: Duration,

    /// Local time the run finished.
    pub completed_at: DateTime<Local>,

    /// Warnings generated during the run.
    pub warnings: Vec<String>,
}

impl ArchiveReport {
    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the lowercase hex digest (the `hash` output).
    #[must_use]
    pub fn hash(&self) -> String {
        self.digest.to_hex()
    }

    /// Returns the human-readable completion time (the `time` output).
    ///
    /// Formatted as `HH:MM:SS GMT+hhmm` in host local time.
    #[must_use]
    pub fn time(&self) -> String {
        self.completed_at.format("%H:%M:%S GMT%z").to_string()
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if the archive is empty.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.archive_size == 0 {
            return 0.0;
        }
        self.bytes_read as f64 / self.archive_size as f64
    }
}

/// Callback trait for progress reporting while an archive is built.
///
/// # Examples
///
/// ```
/// use stablezip_core::ProgressCallback;
/// use std::path::Path;
///
/// struct Counter(usize);
///
/// impl ProgressCallback for Counter {
///     fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}
///     fn on_bytes_read(&mut self, _bytes: u64) {}
///     fn on_entry_complete(&mut self, _path: &Path) {
///         self.0 += 1;
///     }
///     fn on_complete(&mut self) {}
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before a file is read.
    ///
    /// # Arguments
    ///
    /// * `path` - File being processed
    /// * `total` - Number of resolved files
    /// * `current` - Current file number (1-indexed)
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called with the number of bytes read for the current file.
    fn on_bytes_read(&mut self, bytes: u64);

    /// Called after the file has been inserted.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once after the archive has been written.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_read(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn report() -> ArchiveReport {
        ArchiveReport {
            output_path: PathBuf::from("out.zip"),
            digest: ContentDigest::compute(b"hello"),
            files: vec![PathBuf::from("a.txt")],
            entries: 1,
            bytes_read: 1000,
            archive_size: 250,
            duration: Duration::from_millis(5),
            completed_at: Local::now(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_hash_output() {
        assert_eq!(report().hash(), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_warnings() {
        let mut report = report();
        assert!(!report.has_warnings());
        report.add_warning("duplicate entry");
        assert!(report.has_warnings());
        assert_eq!(report.warnings, vec!["duplicate entry"]);
    }

    #[test]
    fn test_compression_ratio() {
        let mut report = report();
        assert!((report.compression_ratio() - 4.0).abs() < f64::EPSILON);
        report.archive_size = 0;
        assert!(report.compression_ratio().abs() < f64::EPSILON);
    }

    #[test]
    fn test_time_format() {
        let mut report = report();
        if let Some(at) = Local.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).single() {
            report.completed_at = at;
            let time = report.time();
            assert!(time.starts_with("07:08:09 GMT"), "{time}");
        }
    }
}
