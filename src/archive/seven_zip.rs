//! 7z Archive Backend Module
//!
//! Lists through the archive tool and fetches bytes per request. Each request
//! unpacks the whole archive into its own temporary directory, reads the one
//! file it wants and removes the directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::archive::reader::safe_join;
use crate::archive::{ArchiveBackend, ArchiveEntry, SevenZipBridge};
use crate::error::{ArchiveError, Result};

/// 7z archive loader
pub struct SevenZipBackend {
    path: PathBuf,
    bridge: Arc<SevenZipBridge>,
    temp_root: PathBuf,
}

impl SevenZipBackend {
    pub fn new(path: &Path, bridge: Arc<SevenZipBridge>, temp_root: PathBuf) -> Self {
        Self {
            path: path.to_path_buf(),
            bridge,
            temp_root,
        }
    }

    /// Fresh directory under the temp root, removed when dropped.
    async fn scratch_dir(&self) -> Result<tempfile::TempDir> {
        tokio::fs::create_dir_all(&self.temp_root).await?;
        let dir = tempfile::Builder::new()
            .prefix("7z-")
            .tempdir_in(&self.temp_root)?;
        Ok(dir)
    }
}

#[async_trait]
impl ArchiveBackend for SevenZipBackend {
    async fn list_entries(&self) -> Result<Vec<ArchiveEntry>> {
        let records = self.bridge.list(&self.path).await?;

        Ok(records
            .into_iter()
            .map(|record| {
                if record.is_directory {
                    ArchiveEntry::directory(&record.entry_name)
                } else {
                    ArchiveEntry::file(&record.entry_name, record.size)
                }
            })
            .collect())
    }

    async fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        let scratch = self.scratch_dir().await?;
        debug!(archive = %self.path.display(), entry = name, dir = %scratch.path().display(), "Unpacking for single entry");

        self.bridge.unpack(&self.path, Some(scratch.path())).await?;

        let target = safe_join(scratch.path(), Path::new(name))?;
        let bytes = match tokio::fs::read(&target).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ArchiveError::MissingExtractionResult {
                    entry: name.to_string(),
                    dir: scratch.path().to_path_buf(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        // Remove the scratch directory off the async workers.
        tokio::task::spawn_blocking(move || scratch.close())
            .await
            .map_err(|e| ArchiveError::Io(std::io::Error::other(e)))??;
        Ok(bytes)
    }
}
