//! Integration Tests for the Archive Reader
//!
//! Exercises format dispatch, listing and extraction against real zip files.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use mod_companion::archive::{
    ArchiveBackend, ArchiveContext, ArchiveEntry, ArchiveReader, RarBackend, SevenZipBridge,
};
use mod_companion::error::ArchiveError;
use tokio::sync::mpsc;
use zip::write::SimpleFileOptions;

// == Helper Functions ==

fn context(temp_root: &Path) -> ArchiveContext {
    ArchiveContext::new(
        Arc::new(SevenZipBridge::new("/nonexistent/7za")),
        temp_root,
    )
}

fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in files {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

/// Stored rar holding `Data/`, `Data/plugin.esp` and `readme.txt`.
fn rar_fixture() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mod.rar")
}

// == Listing ==

#[tokio::test]
async fn test_zip_synthesizes_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("only-file.ZIP");
    write_zip(&path, &[("a/b.txt", b"bee")]);

    let reader = ArchiveReader::open(&path, &context(dir.path()));
    let entries = reader.get_entries().await;

    let names: Vec<_> = entries.iter().map(|e| e.entry_name.as_str()).collect();
    assert_eq!(names, vec!["a/", "a/b.txt"]);
    assert!(entries[0].is_directory);
    assert!(!entries[1].is_directory);
    assert_eq!(entries[1].size, 3);
}

#[tokio::test]
async fn test_entries_are_stable_between_calls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mod.zip");
    write_zip(&path, &[("z.esp", b"z"), ("m/a.esp", b"a")]);

    let reader = ArchiveReader::open(&path, &context(dir.path()));
    let first: Vec<String> = reader
        .get_entries()
        .await
        .iter()
        .map(|e| e.entry_name.clone())
        .collect();

    // Changing the file on disk does not change a loaded listing.
    write_zip(&path, &[("other.txt", b"o")]);
    let second: Vec<String> = reader
        .get_entries()
        .await
        .iter()
        .map(|e| e.entry_name.clone())
        .collect();

    assert_eq!(first, vec!["m/", "m/a.esp", "z.esp"]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_corrupt_and_unknown_archives_list_empty() {
    let dir = tempfile::tempdir().unwrap();
    let corrupt = dir.path().join("broken.zip");
    std::fs::write(&corrupt, b"PK not really").unwrap();
    let ctx = context(dir.path());

    assert!(ArchiveReader::open(&corrupt, &ctx).get_entries().await.is_empty());
    assert!(ArchiveReader::open(dir.path().join("mod.tar"), &ctx)
        .get_entries()
        .await
        .is_empty());
    assert!(ArchiveReader::open(dir.path().join("missing.rar"), &ctx)
        .get_entries()
        .await
        .is_empty());
    // The tool does not exist, so the 7z listing fails soft as well.
    assert!(ArchiveReader::open(dir.path().join("mod.7z"), &ctx)
        .get_entries()
        .await
        .is_empty());
}

#[tokio::test]
async fn test_rar_entries_are_resident_after_listing() {
    let entries = RarBackend::new(&rar_fixture()).list_entries().await.unwrap();

    let names: Vec<&str> = entries.iter().map(|e| e.entry_name.as_str()).collect();
    assert_eq!(names, vec!["Data/", "Data/plugin.esp", "readme.txt"]);
    assert!(entries[0].is_directory);
    assert_eq!(entries[1].size, 11);
    assert!(entries
        .iter()
        .filter(|e| !e.is_directory)
        .all(|e| e.is_resident()));
    assert_eq!(entries[2].data().await.unwrap(), b"read me");
}

#[tokio::test]
async fn test_rar_reads_single_entry_by_name() {
    let backend = RarBackend::new(&rar_fixture());

    assert_eq!(
        backend.read_entry("Data/plugin.esp").await.unwrap(),
        b"TES4 plugin"
    );
    assert!(matches!(
        backend.read_entry("Data/missing.esp").await,
        Err(ArchiveError::EntryNotFound(_))
    ));
}

// == Extraction ==

#[tokio::test]
async fn test_extract_rar_archive() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let reader = ArchiveReader::open(rar_fixture(), &context(dir.path()));

    let count = reader.extract_all_to(&out, true, &[]).await.unwrap();

    assert_eq!(count, 3);
    assert!(out.join("Data").is_dir());
    assert_eq!(std::fs::read(out.join("Data/plugin.esp")).unwrap(), b"TES4 plugin");
    assert_eq!(std::fs::read(out.join("readme.txt")).unwrap(), b"read me");
}

#[tokio::test]
async fn test_extract_unreadable_zip_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let corrupt = dir.path().join("corrupt.zip");
    std::fs::write(&corrupt, b"PK garbage").unwrap();
    let out = dir.path().join("out");
    let ctx = context(dir.path());

    let missing = ArchiveReader::open(dir.path().join("missing.zip"), &ctx)
        .extract_all_to(&out, true, &[])
        .await;
    assert!(matches!(missing, Err(ArchiveError::Io(_))));

    let broken = ArchiveReader::open(&corrupt, &ctx)
        .extract_all_to(&out, true, &[])
        .await;
    assert!(matches!(broken, Err(ArchiveError::Zip(_))));
    assert!(!out.exists());
}

#[tokio::test]
async fn test_extract_all_writes_tree_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mod.zip");
    write_zip(
        &path,
        &[
            ("Data/textures/stone.dds", b"DDS "),
            ("Data/plugin.esp", b"TES4"),
            ("fomod/info.xml", b"<fomod/>"),
        ],
    );
    let out = dir.path().join("out");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let reader = ArchiveReader::open(&path, &context(dir.path())).with_progress(tx);
    let extracted = reader
        .extract_all_to(&out, true, &["fomod/info.xml".to_string(), "fomod/".to_string()])
        .await
        .unwrap();

    assert_eq!(extracted, 4);
    assert_eq!(std::fs::read(out.join("Data/plugin.esp")).unwrap(), b"TES4");
    assert_eq!(std::fs::read(out.join("Data/textures/stone.dds")).unwrap(), b"DDS ");
    assert!(!out.join("fomod").exists());

    let mut order = Vec::new();
    while let Ok(event) = rx.try_recv() {
        order.push(event.entry_name);
    }
    assert_eq!(
        order,
        vec!["Data/", "Data/plugin.esp", "Data/textures/", "Data/textures/stone.dds"]
    );
}

#[tokio::test]
async fn test_overwrite_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mod.zip");
    write_zip(&path, &[("readme.txt", b"from archive")]);
    let out = dir.path().join("out");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("readme.txt"), b"local edit").unwrap();

    let reader = ArchiveReader::open(&path, &context(dir.path()));

    assert_eq!(reader.extract_all_to(&out, false, &[]).await.unwrap(), 0);
    assert_eq!(std::fs::read(out.join("readme.txt")).unwrap(), b"local edit");

    assert_eq!(reader.extract_all_to(&out, true, &[]).await.unwrap(), 1);
    assert_eq!(std::fs::read(out.join("readme.txt")).unwrap(), b"from archive");
}

#[tokio::test]
async fn test_extract_refuses_escaping_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mod.zip");
    write_zip(&path, &[("readme.txt", b"x")]);
    let out = dir.path().join("out");

    let reader = ArchiveReader::open(&path, &context(dir.path()));
    let escaping = ArchiveEntry::resident("../escape.txt", b"x".to_vec());
    let result = reader.extract_entry(&escaping, &out).await;

    assert!(matches!(result, Err(ArchiveError::UnsafePath(_))));
    assert!(!dir.path().join("escape.txt").exists());
}
