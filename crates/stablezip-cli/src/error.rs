//! Error conversion utilities for CLI.
//!
//! Converts stablezip-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance. The core message is
//! always kept as the first line.

use anyhow::anyhow;
use stablezip_core::ArchiveError;
use std::io;

/// Converts `ArchiveError` to a user-friendly anyhow error with a hint
pub fn convert_archive_error(err: ArchiveError) -> anyhow::Error {
    match &err {
        ArchiveError::EmptyInput => anyhow!(
            "{err}\n\
             HINT: Pass at least one --paths pattern or set INPUT_PATHS."
        ),
        ArchiveError::NoMatch { .. } => anyhow!(
            "{err}\n\
             HINT: Patterns are resolved against the working directory (or --root)."
        ),
        ArchiveError::BrokenLink { .. } => anyhow!(
            "{err}\n\
             HINT: Fix or remove the link, or exclude it with a '!' pattern."
        ),
        ArchiveError::Write { source, .. } if source.kind() == io::ErrorKind::NotFound => anyhow!(
            "{err}\n\
             HINT: Use --auto-create-output-dir to create missing directories."
        ),
        ArchiveError::EntryNameCollision { .. } => anyhow!(
            "{err}\n\
             HINT: Entries are named by file name only. Rename one file or drop --strict-names."
        ),
        ArchiveError::InvalidPattern { .. } => anyhow!(
            "{err}\n\
             HINT: Escape literal metacharacters with a backslash."
        ),
        _ => anyhow::Error::from(err),
    }
}
