//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::Status;
use anyhow::Result;
use serde::Serialize;
use stablezip_core::ArchiveReport;
use stablezip_core::ContentDigest;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

#[derive(Serialize)]
struct CreationOutput {
    output_path: String,
    hash: String,
    time: String,
    files: Vec<String>,
    entries: usize,
    bytes_read: u64,
    archive_size: u64,
    compression_ratio: f64,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl From<&ArchiveReport> for CreationOutput {
    fn from(report: &ArchiveReport) -> Self {
        Self {
            output_path: report.output_path.display().to_string(),
            hash: report.hash(),
            time: report.time(),
            files: report
                .files
                .iter()
                .map(|f| f.display().to_string())
                .collect(),
            entries: report.entries,
            bytes_read: report.bytes_read,
            archive_size: report.archive_size,
            compression_ratio: report.compression_ratio(),
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        }
    }
}

#[derive(Serialize)]
struct HashOutput {
    path: String,
    hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    matches: Option<bool>,
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_creation_result(&self, report: &ArchiveReport) -> Result<()> {
        Self::output(&JsonOutput::success("create", CreationOutput::from(report)))
    }

    fn format_hash(
        &self,
        path: &Path,
        digest: &ContentDigest,
        matches: Option<bool>,
    ) -> Result<()> {
        let status = if matches == Some(false) {
            Status::Mismatch
        } else {
            Status::Success
        };
        let data = HashOutput {
            path: path.display().to_string(),
            hash: digest.to_hex(),
            matches,
        };
        Self::output(&JsonOutput::new("hash", status, data))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_creation_output_fields() {
        let report = ArchiveReport {
            output_path: PathBuf::from("/tmp/out.zip"),
            digest: ContentDigest::compute(b"hello"),
            files: vec![PathBuf::from("/tmp/a.txt")],
            entries: 1,
            bytes_read: 5,
            archive_size: 120,
            duration: Duration::from_millis(42),
            completed_at: Local::now(),
            warnings: vec!["replaced".to_string()],
        };

        let value =
            serde_json::to_value(JsonOutput::success("create", CreationOutput::from(&report)))
                .unwrap();
        let data = &value["data"];
        assert_eq!(data["hash"], "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(data["output_path"], "/tmp/out.zip");
        assert_eq!(data["files"][0], "/tmp/a.txt");
        assert_eq!(data["entries"], 1);
        assert_eq!(data["duration_ms"], 42);
        assert_eq!(data["warnings"][0], "replaced");
        assert!(data["time"].as_str().unwrap().contains("GMT"));
    }

    #[test]
    fn test_hash_output_omits_unset_match() {
        let data = HashOutput {
            path: "f".to_string(),
            hash: "00".to_string(),
            matches: None,
        };
        let value = serde_json::to_value(&data).unwrap();
        assert!(value.get("matches").is_none());
    }
}
