//! Error types for deterministic archive creation.

use crate::pipeline::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that can occur while resolving, building or writing an archive.
///
/// Every variant is fatal to the run: nothing is retried and nothing is
/// recovered locally.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// No patterns were given, or all of them were blank.
    #[error("the paths should not be empty")]
    EmptyInput,

    /// The patterns matched zero files.
    #[error("no files matched the given patterns: {}", patterns.join(", "))]
    NoMatch {
        /// Patterns that were expanded.
        patterns: Vec<String>,
    },

    /// A matched symbolic link points to a target that does not exist.
    #[error("broken symbolic link: {}", path.display())]
    BrokenLink {
        /// Path of the dangling link.
        path: PathBuf,
    },

    /// A pattern could not be compiled.
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying glob error.
        source: globset::Error,
    },

    /// A directory could not be traversed while expanding a pattern.
    #[error("cannot traverse {}: {source}", path.display())]
    Traversal {
        /// Directory or entry that failed.
        path: PathBuf,
        /// Underlying walk error.
        source: walkdir::Error,
    },

    /// Reading a resolved file failed.
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Creating the output directory failed.
    #[error("failed to create output directory {}: {source}", path.display())]
    DirectoryCreate {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing the archive to its destination failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An invocation input has an unusable value.
    #[error("invalid value for input '{name}': {reason}")]
    InvalidInput {
        /// Input key.
        name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Compression level outside `1..=9`.
    #[error("invalid compression level {level}, expected 1-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },

    /// The base name of a file is not valid UTF-8 and cannot name a ZIP entry.
    #[error("file name is not valid UTF-8: {}", path.display())]
    InvalidEntryName {
        /// Source file path.
        path: PathBuf,
    },

    /// Two files share a base name and collisions are configured as errors.
    #[error("duplicate archive entry '{name}' from {}", path.display())]
    EntryNameCollision {
        /// Entry name present twice.
        name: String,
        /// The file that would have replaced the earlier entry.
        path: PathBuf,
    },

    /// The ZIP writer rejected an operation.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Returns the pipeline stage this error belongs to.
    ///
    /// Configuration errors report [`Stage::Idle`]: they are raised before
    /// any filesystem access. Plain I/O errors carry no stage.
    ///
    /// # Examples
    ///
    /// ```
    /// use stablezip_core::ArchiveError;
    /// use stablezip_core::Stage;
    ///
    /// assert_eq!(ArchiveError::EmptyInput.stage(), Some(Stage::Idle));
    /// let err = ArchiveError::NoMatch { patterns: vec!["*.txt".into()] };
    /// assert_eq!(err.stage(), Some(Stage::Resolving));
    /// ```
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::EmptyInput | Self::InvalidInput { .. } | Self::InvalidCompressionLevel { .. } => {
                Some(Stage::Idle)
            }
            Self::NoMatch { .. }
            | Self::BrokenLink { .. }
            | Self::InvalidPattern { .. }
            | Self::Traversal { .. } => Some(Stage::Resolving),
            Self::FileRead { .. }
            | Self::InvalidEntryName { .. }
            | Self::EntryNameCollision { .. }
            | Self::Zip(_) => Some(Stage::Building),
            Self::DirectoryCreate { .. } | Self::Write { .. } => Some(Stage::Finalizing),
            Self::Io(_) => None,
        }
    }

    /// Returns the filesystem path the error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::BrokenLink { path }
            | Self::Traversal { path, .. }
            | Self::FileRead { path, .. }
            | Self::DirectoryCreate { path, .. }
            | Self::Write { path, .. }
            | Self::InvalidEntryName { path }
            | Self::EntryNameCollision { path, .. } => Some(path),
            _ => None,
        }
    }
}
