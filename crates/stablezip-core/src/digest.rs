//! Content digest of a serialized archive.

use crate::ArchiveError;
use crate::Result;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// 128-bit MD5 digest identifying archive bytes.
///
/// Displays as 32 lowercase hex characters.
///
/// # Examples
///
/// ```
/// use stablezip_core::ContentDigest;
///
/// let digest = ContentDigest::compute(b"");
/// assert_eq!(digest.to_string(), "d41d8cd98f00b204e9800998ecf8427e");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 16]);

impl ContentDigest {
    /// Hashes `bytes`.
    #[must_use]
    pub fn compute(bytes: &[u8]) -> Self {
        Self(md5::compute(bytes).0)
    }

    /// Hashes the contents of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::FileRead`] if the file cannot be read.
    pub fn of_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| ArchiveError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::compute(&bytes))
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Returns the lowercase hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for ContentDigest {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| ArchiveError::InvalidInput {
            name: "hash".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid("expected 32 hex characters"));
        }

        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| invalid("expected 32 hex characters"))?;
        }
        Ok(Self(bytes))
    }
}
