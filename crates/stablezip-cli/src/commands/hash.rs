//! Hash command implementation

use crate::cli::HashArgs;
use crate::error::convert_archive_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;
use stablezip_core::ContentDigest;

pub fn execute(args: &HashArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let digest = ContentDigest::of_file(&args.file).map_err(convert_archive_error)?;

    let expected = args
        .expect
        .as_deref()
        .map(str::parse::<ContentDigest>)
        .transpose()
        .map_err(convert_archive_error)?;
    let matches = expected.map(|e| e == digest);

    formatter.format_hash(&args.file, &digest, matches)?;

    if let (Some(expected), Some(false)) = (expected, matches) {
        bail!(
            "digest mismatch for '{}': expected {expected}, got {digest}",
            args.file.display()
        );
    }

    Ok(())
}
