//! Digesting and persisting a serialized archive.

use crate::ArchiveError;
use crate::ContentDigest;
use crate::Result;
use crate::config::WriteMode;
use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Computes the digest of `buffer` and writes it to `dest`.
///
/// With `create_dirs`, the parent of `dest` is created recursively first.
/// An existing file at `dest` is overwritten.
///
/// # Examples
///
/// ```no_run
/// use stablezip_core::finalize::finalize;
/// use std::path::Path;
///
/// let digest = finalize(b"PK\x05\x06", Path::new("out/empty.zip"), true)?;
/// println!("{digest}");
/// # Ok::<(), stablezip_core::ArchiveError>(())
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - the parent directory cannot be created ([`ArchiveError::DirectoryCreate`])
/// - the file cannot be written ([`ArchiveError::Write`])
pub fn finalize(buffer: &[u8], dest: &Path, create_dirs: bool) -> Result<ContentDigest> {
    finalize_with_mode(buffer, dest, create_dirs, WriteMode::Overwrite)
}

/// Like [`finalize`], choosing how the file is written.
///
/// [`WriteMode::Atomic`] writes to a temporary file in the destination
/// directory and renames it into place, so `dest` is either the old file or
/// the complete new one.
///
/// # Errors
///
/// Same as [`finalize`].
pub fn finalize_with_mode(
    buffer: &[u8],
    dest: &Path,
    create_dirs: bool,
    mode: WriteMode,
) -> Result<ContentDigest> {
    let digest = ContentDigest::compute(buffer);

    if create_dirs && let Some(parent) = parent_dir(dest) {
        fs::create_dir_all(parent).map_err(|source| ArchiveError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    match mode {
        WriteMode::Overwrite => write_in_place(buffer, dest)?,
        WriteMode::Atomic => write_atomic(buffer, dest)?,
    }

    tracing::debug!(path = %dest.display(), bytes = buffer.len(), "archive written");
    Ok(digest)
}

/// Parent directory, ignoring the empty parent of a bare file name.
fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

fn write_in_place(buffer: &[u8], dest: &Path) -> Result<()> {
    fs::write(dest, buffer).map_err(|source| ArchiveError::Write {
        path: dest.to_path_buf(),
        source,
    })
}

fn write_atomic(buffer: &[u8], dest: &Path) -> Result<()> {
    let write_err = |source: io::Error| ArchiveError::Write {
        path: dest.to_path_buf(),
        source,
    };

    let dir = parent_dir(dest).unwrap_or_else(|| Path::new("."));
    let mut temp = temp_file_in(dir).map_err(write_err)?;
    // A replaced archive keeps its mode; a new one gets the umask default.
    if let Ok(existing) = fs::metadata(dest) {
        temp.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_err)?;
    }
    temp.write_all(buffer).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(dest).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Temp file created with the same default mode as `fs::write`.
fn temp_file_in(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".stablezip-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_finalize_writes_and_digests() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out.zip");

        let digest = finalize(b"archive bytes", &dest, false).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"archive bytes");
        assert_eq!(digest, ContentDigest::compute(b"archive bytes"));
    }

    #[test]
    fn test_finalize_overwrites() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out.zip");
        fs::write(&dest, "a much longer previous content").unwrap();

        finalize(b"new", &dest, false).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn test_finalize_creates_dirs() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("a/b/c/out.zip");

        finalize(b"data", &dest, true).unwrap();
        assert!(dest.exists());
    }

    #[test]
    fn test_finalize_missing_dir_without_create() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("missing/out.zip");

        let err = finalize(b"data", &dest, false).unwrap_err();
        assert!(matches!(err, ArchiveError::Write { .. }));
        assert!(!temp.path().join("missing").exists());
    }

    #[test]
    fn test_finalize_directory_create_failure() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("blocker"), "file").unwrap();
        let dest = temp.path().join("blocker/sub/out.zip");

        let err = finalize(b"data", &dest, true).unwrap_err();
        assert!(matches!(err, ArchiveError::DirectoryCreate { .. }));
    }

    #[test]
    fn test_finalize_atomic() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out.zip");
        fs::write(&dest, "old").unwrap();

        let digest = finalize_with_mode(b"fresh", &dest, false, WriteMode::Atomic).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"fresh");
        assert_eq!(digest, ContentDigest::compute(b"fresh"));

        let leftovers = fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_finalize_atomic_mode_matches_overwrite() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let plain = temp.path().join("plain.zip");
        let atomic = temp.path().join("atomic.zip");
        finalize_with_mode(b"x", &plain, false, WriteMode::Overwrite).unwrap();
        finalize_with_mode(b"x", &atomic, false, WriteMode::Atomic).unwrap();

        let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&atomic), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_finalize_atomic_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out.zip");
        fs::write(&dest, "old").unwrap();
        fs::set_permissions(&dest, fs::Permissions::from_mode(0o640)).unwrap();

        finalize_with_mode(b"new", &dest, false, WriteMode::Atomic).unwrap();
        let mode = fs::metadata(&dest).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("out.zip")), None);
        assert_eq!(parent_dir(Path::new("a/out.zip")), Some(Path::new("a")));
    }
}
