//! ZIP Archive Backend Module
//!
//! Reads zip archives in-process. The index is read eagerly; entry bytes are
//! decompressed on demand.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use zip::ZipArchive;

use crate::archive::entry::normalize_entry_name;
use crate::archive::{ArchiveBackend, ArchiveEntry};
use crate::error::{ArchiveError, Result};

/// Upper bound on the buffer reserved before an entry is read.
const MAX_PREALLOC: u64 = 8 << 20;

/// ZIP archive loader
pub struct ZipBackend {
    path: PathBuf,
}

impl ZipBackend {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Reads the central directory into entries, adding implied directories.
    fn read_index(path: &Path) -> Result<Vec<ArchiveEntry>> {
        let mut archive = ZipArchive::new(File::open(path)?)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let file = archive.by_index(i)?;
            let entry = if file.is_dir() {
                ArchiveEntry::directory(file.name())
            } else {
                ArchiveEntry::file(file.name(), file.size())
            };
            entries.push(entry);
        }

        Ok(with_synthesized_directories(entries))
    }

    fn read_file(path: &Path, name: &str) -> Result<Vec<u8>> {
        let mut archive = ZipArchive::new(File::open(path)?)?;

        let index = match archive.index_for_name(name) {
            Some(index) => index,
            None => (0..archive.len())
                .find(|&i| {
                    archive
                        .by_index_raw(i)
                        .is_ok_and(|file| normalize_entry_name(file.name()) == name)
                })
                .ok_or_else(|| ArchiveError::EntryNotFound(name.to_string()))?,
        };

        let mut file = archive.by_index(index)?;
        let mut buffer = Vec::with_capacity(initial_capacity(file.size()));
        file.read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

/// The declared size comes from the archive itself and is not trusted.
fn initial_capacity(declared: u64) -> usize {
    declared.min(MAX_PREALLOC) as usize
}

#[async_trait]
impl ArchiveBackend for ZipBackend {
    async fn list_entries(&self) -> Result<Vec<ArchiveEntry>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::read_index(&path))
            .await
            .map_err(|e| ArchiveError::Io(std::io::Error::other(e)))?
    }

    async fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path.clone();
        let name = name.to_string();
        tokio::task::spawn_blocking(move || Self::read_file(&path, &name))
            .await
            .map_err(|e| ArchiveError::Io(std::io::Error::other(e)))?
    }
}

/// Adds a directory entry for every intermediate path prefix that has no
/// explicit record, then sorts by name.
///
/// Some zip producers only store file records, so `a/b/c.txt` alone must
/// still yield `a/` and `a/b/`.
pub fn with_synthesized_directories(mut entries: Vec<ArchiveEntry>) -> Vec<ArchiveEntry> {
    let mut seen: HashSet<String> = entries
        .iter()
        .filter(|entry| entry.is_directory)
        .map(|entry| entry.entry_name.clone())
        .collect();

    let mut synthesized = Vec::new();
    for entry in &entries {
        let name = entry.entry_name.trim_end_matches('/');
        let mut prefix = String::new();
        let segments: Vec<&str> = name.split('/').collect();

        for segment in &segments[..segments.len().saturating_sub(1)] {
            prefix.push_str(segment);
            prefix.push('/');
            if seen.insert(prefix.clone()) {
                synthesized.push(ArchiveEntry::directory(&prefix));
            }
        }
    }

    entries.extend(synthesized);
    entries.sort_by(|a, b| a.entry_name.cmp(&b.entry_name));
    entries
}
