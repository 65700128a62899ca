//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use stablezip_core::ArchiveReport;
use stablezip_core::ContentDigest;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of a `create` run
    fn format_creation_result(&self, report: &ArchiveReport) -> Result<()>;

    /// Format a file digest; `matches` is set when an expected digest was given
    fn format_hash(&self, path: &Path, digest: &ContentDigest, matches: Option<bool>)
    -> Result<()>;
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    pub data: T,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Mismatch,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn new(operation: impl Into<String>, status: Status, data: T) -> Self {
        Self {
            operation: operation.into(),
            status,
            data,
        }
    }

    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self::new(operation, Status::Success, data)
    }
}
