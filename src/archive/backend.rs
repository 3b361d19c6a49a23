//! Archive Backend Module
//!
//! Capability shared by every format loader.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::archive::{ArchiveEntry, SevenZipBridge};
use crate::error::Result;

/// Format-specific loader behind an [`crate::archive::ArchiveReader`].
#[async_trait]
pub trait ArchiveBackend: Send + Sync {
    /// Enumerates the archive's entries.
    async fn list_entries(&self) -> Result<Vec<ArchiveEntry>>;

    /// Reads the bytes of one file entry by its normalized name.
    async fn read_entry(&self, name: &str) -> Result<Vec<u8>>;
}

/// Shared resources the loaders need.
#[derive(Debug, Clone)]
pub struct ArchiveContext {
    pub bridge: Arc<SevenZipBridge>,
    /// Root under which per-request extraction directories are created
    pub temp_root: PathBuf,
}

impl ArchiveContext {
    pub fn new(bridge: Arc<SevenZipBridge>, temp_root: impl Into<PathBuf>) -> Self {
        Self {
            bridge,
            temp_root: temp_root.into(),
        }
    }
}
