//! In-memory archive assembly and deterministic ZIP serialization.
//!
//! Entries are keyed by base name and kept in insertion order. Serialized
//! output depends only on entry names, contents and order: every entry gets
//! the same fixed modification time and the same permissions, whatever the
//! source files carried.

use crate::ArchiveError;
use crate::Result;
use crate::config::CollisionPolicy;
use crate::config::DEFAULT_COMPRESSION_LEVEL;
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Unix mode stored for every entry.
const ENTRY_PERMISSIONS: u32 = 0o644;

/// A calendar date-time stamped on every archive entry.
///
/// Stored in the archive as an MS-DOS date/time with no timezone, so the
/// value is written verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedTimestamp {
    /// Year, 1980-2107.
    pub year: u16,
    /// Month, 1-12.
    pub month: u8,
    /// Day of month, 1-31.
    pub day: u8,
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
    /// Second, 0-58 (stored with two-second resolution).
    pub second: u8,
}

/// The timestamp every archive carries: 2000-12-24 23:00:00.
///
/// Part of the output contract; changing it changes every digest.
pub const FIXED_TIMESTAMP: FixedTimestamp = FixedTimestamp {
    year: 2000,
    month: 12,
    day: 24,
    hour: 23,
    minute: 0,
    second: 0,
};

impl FixedTimestamp {
    /// Converts to the ZIP writer's date-time type.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidInput`] if the value is outside the
    /// range an MS-DOS timestamp can represent.
    pub fn to_zip(self) -> Result<zip::DateTime> {
        zip::DateTime::from_date_and_time(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        )
        .map_err(|e| ArchiveError::InvalidInput {
            name: "timestamp".to_string(),
            reason: format!("{self} cannot be stored in a ZIP entry: {e}"),
        })
    }
}

impl Default for FixedTimestamp {
    fn default() -> Self {
        FIXED_TIMESTAMP
    }
}

impl std::fmt::Display for FixedTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// A named payload inside an [`Archive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Name inside the archive.
    pub name: String,
    /// Uncompressed content.
    pub data: Vec<u8>,
}

/// Outcome of inserting an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// A new entry was appended.
    Added,
    /// An entry with the same name existed; its content was replaced in place.
    Replaced,
}

/// An ordered set of entries waiting to be serialized.
///
/// # Examples
///
/// ```
/// use stablezip_core::Archive;
///
/// let mut archive = Archive::new();
/// archive.insert("a.txt", b"hello".to_vec());
/// archive.insert("b.txt", b"world".to_vec());
///
/// let first = archive.clone().into_bytes(9)?;
/// let second = archive.into_bytes(9)?;
/// assert_eq!(first, second);
/// # Ok::<(), stablezip_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: Vec<ArchiveEntry>,
    index: HashMap<String, usize>,
    timestamp: FixedTimestamp,
}

impl Archive {
    /// Creates an empty archive stamped with [`FIXED_TIMESTAMP`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing the content of a same-named one.
    ///
    /// A replaced entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) -> Insertion {
        let name = name.into();
        if let Some(&slot) = self.index.get(&name) {
            self.entries[slot].data = data;
            return Insertion::Replaced;
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(ArchiveEntry { name, data });
        Insertion::Added
    }

    /// Reads `path` and inserts it under its base name.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the path has no UTF-8 file name ([`ArchiveError::InvalidEntryName`])
    /// - the file cannot be read ([`ArchiveError::FileRead`])
    /// - the name is taken and `policy` is [`CollisionPolicy::Error`]
    pub fn insert_file(&mut self, path: &Path, policy: CollisionPolicy) -> Result<Insertion> {
        let name = entry_name(path)?;
        if policy == CollisionPolicy::Error && self.contains(name) {
            return Err(ArchiveError::EntryNameCollision {
                name: name.to_string(),
                path: path.to_path_buf(),
            });
        }

        let data = fs::read(path).map_err(|source| ArchiveError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.insert(name, data))
    }

    /// Stamps every entry with `timestamp`.
    pub fn set_timestamp(&mut self, timestamp: FixedTimestamp) {
        self.timestamp = timestamp;
    }

    /// Returns the timestamp every entry will carry.
    #[must_use]
    pub fn timestamp(&self) -> FixedTimestamp {
        self.timestamp
    }

    /// Returns whether an entry with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the entry stored under `name`.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&ArchiveEntry> {
        self.index.get(name).map(|&slot| &self.entries[slot])
    }

    /// Returns the entries in archive order.
    #[must_use]
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total uncompressed size of all entries.
    #[must_use]
    pub fn content_size(&self) -> u64 {
        self.entries.iter().map(|e| e.data.len() as u64).sum()
    }

    /// Serializes the archive into ZIP bytes, DEFLATE at `level`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `level` is not in 1-9
    /// - the timestamp is not representable
    /// - the ZIP writer fails
    pub fn into_bytes(self, level: u8) -> Result<Vec<u8>> {
        if !(1..=9).contains(&level) {
            return Err(ArchiveError::InvalidCompressionLevel { level });
        }

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(level)))
            .last_modified_time(self.timestamp.to_zip()?)
            .unix_permissions(ENTRY_PERMISSIONS);

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            zip.start_file(entry.name.as_str(), options)?;
            zip.write_all(&entry.data)?;
        }

        Ok(zip.finish()?.into_inner())
    }
}

/// Returns the base name used as a file's entry name.
///
/// # Errors
///
/// Returns [`ArchiveError::InvalidEntryName`] if the path has no file name
/// or it is not valid UTF-8.
pub fn entry_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ArchiveError::InvalidEntryName {
            path: path.to_path_buf(),
        })
}

/// Builds the serialized archive for `files`, in order.
///
/// Each file is read and inserted under its base name before the next is
/// considered; same-named files replace earlier content.
///
/// # Examples
///
/// ```no_run
/// use stablezip_core::FIXED_TIMESTAMP;
/// use stablezip_core::archive::build;
/// use std::path::PathBuf;
///
/// let bytes = build(&[PathBuf::from("a.txt")], FIXED_TIMESTAMP)?;
/// assert!(!bytes.is_empty());
/// # Ok::<(), stablezip_core::ArchiveError>(())
/// ```
///
/// # Errors
///
/// Returns an error if any file cannot be read or serialization fails.
pub fn build<P: AsRef<Path>>(files: &[P], timestamp: FixedTimestamp) -> Result<Vec<u8>> {
    let mut archive = Archive::new();
    for file in files {
        archive.insert_file(file.as_ref(), CollisionPolicy::LastWins)?;
    }
    archive.set_timestamp(timestamp);
    archive.into_bytes(DEFAULT_COMPRESSION_LEVEL)
}
