//! RAR Archive Backend Module
//!
//! Reads rar archives in-process, decoding every file while listing so all
//! entry bytes are resident once the listing completes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use unrar::Archive;

use crate::archive::entry::normalize_entry_name;
use crate::archive::{ArchiveBackend, ArchiveEntry};
use crate::error::{ArchiveError, Result};

/// RAR archive loader
pub struct RarBackend {
    path: PathBuf,
}

impl RarBackend {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Walks every header, reading file bodies and skipping directories.
    ///
    /// When `only` is set, stops at the first file with that name.
    fn decode(path: &Path, only: Option<&str>) -> Result<Vec<ArchiveEntry>> {
        let mut archive = Archive::new(path).open_for_processing()?;
        let mut entries = Vec::new();

        while let Some(header) = archive.read_header()? {
            let (name, is_directory) = {
                let entry = header.entry();
                (
                    normalize_entry_name(&entry.filename.to_string_lossy()),
                    entry.is_directory(),
                )
            };

            let wanted = only.map_or(true, |target| target == name);
            archive = if is_directory {
                if only.is_none() {
                    entries.push(ArchiveEntry::directory(&name));
                }
                header.skip()?
            } else if wanted {
                let (bytes, next) = header.read()?;
                entries.push(ArchiveEntry::resident(&name, bytes));
                if only.is_some() {
                    break;
                }
                next
            } else {
                header.skip()?
            };
        }

        Ok(entries)
    }
}

#[async_trait]
impl ArchiveBackend for RarBackend {
    async fn list_entries(&self) -> Result<Vec<ArchiveEntry>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::decode(&path, None))
            .await
            .map_err(|e| ArchiveError::Io(std::io::Error::other(e)))?
    }

    /// Entries from [`RarBackend::list_entries`] are resident, so this only
    /// runs for callers holding a bare name.
    async fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path.clone();
        let target = name.to_string();
        let found = tokio::task::spawn_blocking(move || Self::decode(&path, Some(&target)))
            .await
            .map_err(|e| ArchiveError::Io(std::io::Error::other(e)))??;

        match found.into_iter().next() {
            Some(entry) => entry.data().await,
            None => Err(ArchiveError::EntryNotFound(name.to_string())),
        }
    }
}
