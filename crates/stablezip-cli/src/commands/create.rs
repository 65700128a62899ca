//! Create command implementation.

use crate::cli::CreateArgs;
use crate::error::convert_archive_error;
use crate::output::OutputFormatter;
use crate::outputs;
use crate::progress::CliProgress;
use anyhow::Result;
use stablezip_core::ArchiveConfig;
use stablezip_core::CollisionPolicy;
use stablezip_core::NoopProgress;
use stablezip_core::WriteMode;
use stablezip_core::create_archive_with_progress;

pub fn execute(
    args: &CreateArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let config = build_config(args)?;

    // Use progress bar if TTY is detected (not quiet, not JSON, is terminal)
    let result = if show_progress && CliProgress::should_show() {
        let mut progress = CliProgress::new("Archiving");
        create_archive_with_progress(&config, &mut progress)
    } else {
        create_archive_with_progress(&config, &mut NoopProgress)
    };
    let report = result.map_err(convert_archive_error)?;

    if let Some(path) = &args.outputs_file {
        let (hash, time) = (report.hash(), report.time());
        outputs::append(path, &[("hash", hash.as_str()), ("time", time.as_str())])?;
    }

    formatter.format_creation_result(&report)?;

    Ok(())
}

/// Maps CLI arguments onto the core configuration.
fn build_config(args: &CreateArgs) -> Result<ArchiveConfig> {
    let mut config =
        ArchiveConfig::from_raw(args.paths.iter().map(String::as_str), &args.output_file)
            .map_err(convert_archive_error)?
            .with_auto_create_output_dir(args.auto_create_output_dir)
            .with_compression_level(args.compression_level)
            .with_milliseconds(args.milliseconds.clone());

    if args.strict_names {
        config = config.with_collision_policy(CollisionPolicy::Error);
    }
    if args.atomic {
        config = config.with_write_mode(WriteMode::Atomic);
    }
    if let Some(root) = &args.root {
        config = config.with_root(root);
    }

    Ok(config)
}
