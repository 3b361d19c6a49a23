//! Archive Entry Module
//!
//! One file or directory record of an archive, with lazy access to its bytes.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::archive::ArchiveBackend;
use crate::error::{ArchiveError, Result};

// == Archive Entry ==
/// Entry of a loaded archive.
///
/// Bytes are either resident (decoded during load) or fetched from the
/// backend that listed the entry when [`ArchiveEntry::data`] is awaited.
#[derive(Clone)]
pub struct ArchiveEntry {
    /// Forward-slash path inside the archive; directories end with `/`
    pub entry_name: String,
    pub is_directory: bool,
    /// Uncompressed size in bytes
    pub size: u64,
    /// Relative output path overriding `entry_name` on extraction
    pub output_path: Option<PathBuf>,
    resident: Option<Arc<[u8]>>,
    source: Option<Arc<dyn ArchiveBackend>>,
}

impl ArchiveEntry {
    /// File entry whose bytes live in the archive.
    pub fn file(name: &str, size: u64) -> Self {
        Self {
            entry_name: normalize_entry_name(name),
            is_directory: false,
            size,
            output_path: None,
            resident: None,
            source: None,
        }
    }

    /// Directory entry; the name gets a trailing `/` if it lacks one.
    pub fn directory(name: &str) -> Self {
        let mut entry_name = normalize_entry_name(name);
        if !entry_name.ends_with('/') {
            entry_name.push('/');
        }
        Self {
            entry_name,
            is_directory: true,
            size: 0,
            output_path: None,
            resident: None,
            source: None,
        }
    }

    /// File entry whose bytes were already decoded.
    pub fn resident(name: &str, bytes: Vec<u8>) -> Self {
        let mut entry = Self::file(name, bytes.len() as u64);
        entry.resident = Some(bytes.into());
        entry
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(output_path.into());
        self
    }

    /// Attaches the backend that serves this entry's bytes on demand.
    pub(crate) fn bind(mut self, source: Arc<dyn ArchiveBackend>) -> Self {
        if self.resident.is_none() && !self.is_directory {
            self.source = Some(source);
        }
        self
    }

    pub fn is_resident(&self) -> bool {
        self.resident.is_some()
    }

    // == Data Accessor ==
    /// Produces the entry's bytes. Directories yield an empty buffer.
    pub async fn data(&self) -> Result<Vec<u8>> {
        if let Some(bytes) = &self.resident {
            return Ok(bytes.to_vec());
        }
        if self.is_directory {
            return Ok(Vec::new());
        }
        match &self.source {
            Some(source) => source.read_entry(&self.entry_name).await,
            None => Err(ArchiveError::EntryNotFound(self.entry_name.clone())),
        }
    }
}

impl fmt::Debug for ArchiveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("entry_name", &self.entry_name)
            .field("is_directory", &self.is_directory)
            .field("size", &self.size)
            .field("output_path", &self.output_path)
            .field("resident", &self.resident.is_some())
            .finish()
    }
}

/// Converts Windows separators to `/` and drops leading `./`.
pub fn normalize_entry_name(name: &str) -> String {
    let name = name.replace('\\', "/");
    name.trim_start_matches("./").to_string()
}
