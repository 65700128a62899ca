//! Key/value outputs for the invoking pipeline.
//!
//! Lines are appended as `key=value`, the format CI runners read from the
//! file named by `GITHUB_OUTPUT`.

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Appends `pairs` to `path`, creating the file if needed.
pub fn append(path: &Path, pairs: &[(&str, &str)]) -> Result<()> {
    let mut buf = String::new();
    for (key, value) in pairs {
        if value.contains(['\n', '\r']) {
            bail!("output '{key}' must be a single line");
        }
        buf.push_str(key);
        buf.push('=');
        buf.push_str(value);
        buf.push('\n');
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open outputs file '{}'", path.display()))?;
    file.write_all(buf.as_bytes())
        .with_context(|| format!("failed to write outputs file '{}'", path.display()))?;

    tracing::debug!(path = %path.display(), count = pairs.len(), "outputs recorded");
    Ok(())
}
