//! Deterministic ZIP archive creation with content digests.
//!
//! `stablezip-core` expands glob patterns into a list of files, packs them
//! into a ZIP archive whose bytes depend only on entry names, contents and
//! order, and writes the archive together with its MD5 digest. Every entry
//! carries the same fixed modification time ([`FIXED_TIMESTAMP`]), so two
//! runs over identical inputs produce identical output.
//!
//! # Examples
//!
//! ```no_run
//! use stablezip_core::ArchiveConfig;
//! use stablezip_core::create_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ArchiveConfig::new(vec!["dist/**/*.js".to_string()], "out/bundle.zip")
//!     .with_auto_create_output_dir(true);
//! let report = create_archive(&config)?;
//! println!("hash={}", report.hash());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod config;
pub mod digest;
pub mod error;
pub mod finalize;
pub mod pipeline;
pub mod report;
pub mod resolve;

// Re-export main API types
pub use archive::Archive;
pub use archive::ArchiveEntry;
pub use archive::FIXED_TIMESTAMP;
pub use archive::FixedTimestamp;
pub use config::ArchiveConfig;
pub use config::CollisionPolicy;
pub use config::WriteMode;
pub use digest::ContentDigest;
pub use error::ArchiveError;
pub use error::Result;
pub use pipeline::Stage;
pub use pipeline::create_archive;
pub use pipeline::create_archive_with_progress;
pub use report::ArchiveReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
