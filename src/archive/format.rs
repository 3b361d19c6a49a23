//! Archive Format Module
//!
//! Picks the loader for a path from its extension.

use std::path::Path;
use std::sync::Arc;

use crate::archive::{ArchiveBackend, ArchiveContext, RarBackend, SevenZipBackend, ZipBackend};
use crate::error::{ArchiveError, Result};

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Rar,
    SevenZip,
}

impl ArchiveFormat {
    /// Detects the format from the file extension, ignoring case.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();
        Self::from_extension(&extension)
    }

    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_lowercase().as_str() {
            "zip" => Ok(ArchiveFormat::Zip),
            "rar" => Ok(ArchiveFormat::Rar),
            "7z" => Ok(ArchiveFormat::SevenZip),
            other => Err(ArchiveError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn is_supported_extension(extension: &str) -> bool {
        Self::from_extension(extension).is_ok()
    }

    /// Builds the loader for `path`.
    pub fn backend(self, path: &Path, ctx: &ArchiveContext) -> Arc<dyn ArchiveBackend> {
        match self {
            ArchiveFormat::Zip => Arc::new(ZipBackend::new(path)),
            ArchiveFormat::Rar => Arc::new(RarBackend::new(path)),
            ArchiveFormat::SevenZip => Arc::new(SevenZipBackend::new(
                path,
                ctx.bridge.clone(),
                ctx.temp_root.clone(),
            )),
        }
    }
}
