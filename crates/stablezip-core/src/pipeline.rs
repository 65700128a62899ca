//! The resolve → build → finalize run.

use crate::Archive;
use crate::ArchiveConfig;
use crate::ArchiveError;
use crate::ArchiveReport;
use crate::FIXED_TIMESTAMP;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::archive::Insertion;
use crate::archive::entry_name;
use crate::finalize::finalize_with_mode;
use crate::resolve::resolve;
use std::fmt;
use std::time::Instant;

/// Stages of one archive run.
///
/// A run moves `Idle → Resolving → Building → Finalizing → Done`; an error at
/// any stage ends it in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Configuration is being validated.
    Idle,
    /// Patterns are being expanded.
    Resolving,
    /// Files are being read into the archive.
    Building,
    /// The archive is being digested and written.
    Finalizing,
    /// The run completed.
    Done,
    /// The run failed.
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Building => "building",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Runs the full pipeline for `config`.
///
/// # Examples
///
/// ```no_run
/// use stablezip_core::ArchiveConfig;
/// use stablezip_core::create_archive;
///
/// let config = ArchiveConfig::new(vec!["dist/*".to_string()], "bundle.zip");
/// let report = create_archive(&config)?;
/// println!("hash={}", report.hash());
/// # Ok::<(), stablezip_core::ArchiveError>(())
/// ```
///
/// # Errors
///
/// Returns the first error of any stage; see [`ArchiveError`].
pub fn create_archive(config: &ArchiveConfig) -> Result<ArchiveReport> {
    create_archive_with_progress(config, &mut NoopProgress)
}

/// Runs the full pipeline, reporting per-file progress.
///
/// Patterns are validated before the filesystem is touched. Nothing is
/// written unless resolution and building both succeed.
///
/// # Errors
///
/// Returns an error if:
/// - no usable pattern is configured ([`ArchiveError::EmptyInput`])
/// - nothing matched ([`ArchiveError::NoMatch`])
/// - resolution, reading, serialization or writing fails
pub fn create_archive_with_progress(
    config: &ArchiveConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ArchiveReport> {
    let span = tracing::info_span!("archive", output = %config.output_file.display());
    let _guard = span.enter();

    run(config, progress).inspect_err(|err| {
        let failed_in = err.stage().unwrap_or(Stage::Failed);
        tracing::debug!(stage = %Stage::Failed, failed_in = %failed_in, error = %err, "run failed");
    })
}

fn enter(stage: Stage) {
    tracing::debug!(stage = %stage, "entering stage");
}

fn run(config: &ArchiveConfig, progress: &mut dyn ProgressCallback) -> Result<ArchiveReport> {
    let start = Instant::now();

    enter(Stage::Idle);
    config.validate()?;
    let patterns: Vec<String> = config
        .patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    tracing::info!(paths = ?patterns, "paths");
    if config.milliseconds.is_some() {
        tracing::debug!("milliseconds input is reserved and ignored");
    }

    enter(Stage::Resolving);
    let root = config.resolved_root()?;
    let files = resolve(&patterns, &root)?;
    if files.is_empty() {
        return Err(ArchiveError::NoMatch { patterns });
    }

    enter(Stage::Building);
    let total = files.len();
    let mut archive = Archive::new();
    let mut warnings = Vec::new();
    let mut bytes_read = 0u64;

    for (idx, file) in files.iter().enumerate() {
        let current = idx + 1;
        tracing::info!("processing [{current:03}] {}", file.display());
        progress.on_entry_start(file, total, current);

        let outcome = archive.insert_file(file, config.collision_policy)?;
        let name = entry_name(file)?;
        let size = archive.entry(name).map_or(0, |e| e.data.len() as u64);
        bytes_read += size;
        progress.on_bytes_read(size);

        if outcome == Insertion::Replaced {
            tracing::warn!(entry = name, path = %file.display(), "entry name collision, earlier content replaced");
            warnings.push(format!(
                "entry '{name}' replaced by {}",
                file.display()
            ));
        }
        progress.on_entry_complete(file);
    }

    archive.set_timestamp(FIXED_TIMESTAMP);
    let entries = archive.len();
    let buffer = archive.into_bytes(config.compression_level)?;

    enter(Stage::Finalizing);
    let digest = finalize_with_mode(
        &buffer,
        &config.output_file,
        config.auto_create_output_dir,
        config.write_mode,
    )?;
    tracing::info!(hash = %digest, "archive digest");
    progress.on_complete();

    enter(Stage::Done);
    Ok(ArchiveReport {
        output_path: config.output_file.clone(),
        digest,
        files,
        entries,
        bytes_read,
        archive_size: buffer.len() as u64,
        duration: start.elapsed(),
        completed_at: chrono::Local::now(),
        warnings,
    })
}
