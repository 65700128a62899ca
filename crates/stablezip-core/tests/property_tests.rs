//! Property-based tests for archive determinism.
//!
//! These tests use proptest to generate arbitrary entry sets and verify that
//! serialized output depends only on names, contents and order.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use stablezip_core::Archive;
use stablezip_core::ArchiveConfig;
use stablezip_core::ContentDigest;
use stablezip_core::create_archive;
use std::collections::BTreeMap;
use std::fs;
use std::io::Cursor;
use std::io::Read;
use tempfile::TempDir;
use zip::ZipArchive;

fn entry_set() -> impl Strategy<Value = BTreeMap<String, Vec<u8>>> {
    prop::collection::btree_map(
        "[a-z]{1,8}\\.(txt|bin)",
        prop::collection::vec(any::<u8>(), 0..512),
        1..6,
    )
}

fn archive_of(entries: &BTreeMap<String, Vec<u8>>) -> Archive {
    let mut archive = Archive::new();
    for (name, data) in entries {
        archive.insert(name.as_str(), data.clone());
    }
    archive
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Serializing the same entries twice gives the same bytes.
    #[test]
    fn prop_serialization_is_deterministic(entries in entry_set()) {
        let first = archive_of(&entries).into_bytes(9).unwrap();
        let second = archive_of(&entries).into_bytes(9).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Every inserted entry reads back with its exact content.
    #[test]
    fn prop_contents_survive(entries in entry_set()) {
        let bytes = archive_of(&entries).into_bytes(9).unwrap();
        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        prop_assert_eq!(zip.len(), entries.len());

        for (name, data) in &entries {
            let mut file = zip.by_name(name).unwrap();
            let mut read = Vec::new();
            file.read_to_end(&mut read).unwrap();
            prop_assert_eq!(&read, data);
        }
    }

    /// Files written to disk and archived by the pipeline hash the same as
    /// the in-memory archive of the same entries.
    #[test]
    fn prop_pipeline_matches_in_memory_archive(entries in entry_set()) {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        for (name, data) in &entries {
            fs::write(src.join(name), data).unwrap();
        }

        let config = ArchiveConfig::new(vec!["src/*".to_string()], temp.path().join("out.zip"))
            .with_root(temp.path());
        let report = create_archive(&config).unwrap();

        let expected = ContentDigest::compute(&archive_of(&entries).into_bytes(9).unwrap());
        prop_assert_eq!(report.digest, expected);
    }
}
