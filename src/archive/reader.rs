//! Archive Reader Module
//!
//! Uniform entry listing and extraction over every supported format.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, OnceCell};
use tracing::{debug, error, info};

use crate::archive::{ArchiveBackend, ArchiveContext, ArchiveEntry, ArchiveFormat};
use crate::error::{ArchiveError, Result};

/// Emitted right before an entry is written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractProgress {
    pub entry_name: String,
    pub path: PathBuf,
}

// == Archive Reader ==
/// Reads one archive file.
///
/// The format is fixed at construction. Entries are loaded on the first
/// successful [`ArchiveReader::get_entries`] and never change afterwards.
pub struct ArchiveReader {
    path: PathBuf,
    /// The loader, or the extension that had none
    backend: std::result::Result<Arc<dyn ArchiveBackend>, String>,
    entries: OnceCell<Vec<ArchiveEntry>>,
    progress: Option<mpsc::UnboundedSender<ExtractProgress>>,
}

impl ArchiveReader {
    /// Opens `path` with the loader matching its extension.
    ///
    /// An unsupported extension is not an error here; the reader lists no
    /// entries and refuses to extract.
    pub fn open(path: impl Into<PathBuf>, ctx: &ArchiveContext) -> Self {
        let path = path.into();
        let backend = ArchiveFormat::from_path(&path)
            .map(|format| format.backend(&path, ctx))
            .map_err(|err| match err {
                ArchiveError::UnsupportedFormat(extension) => extension,
                other => other.to_string(),
            });
        Self {
            path,
            backend,
            entries: OnceCell::new(),
            progress: None,
        }
    }

    /// Uses a caller-supplied loader regardless of the extension.
    pub fn with_backend(path: impl Into<PathBuf>, backend: Arc<dyn ArchiveBackend>) -> Self {
        Self {
            path: path.into(),
            backend: Ok(backend),
            entries: OnceCell::new(),
            progress: None,
        }
    }

    /// Sends an [`ExtractProgress`] for every entry about to be written.
    pub fn with_progress(mut self, progress: mpsc::UnboundedSender<ExtractProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Get Entries ==
    /// Returns the archive's entries, loading them on first use.
    ///
    /// Listing failures are logged and yield an empty list; a later call
    /// tries again.
    pub async fn get_entries(&self) -> &[ArchiveEntry] {
        match self.load_entries().await {
            Ok(entries) => entries,
            Err(err) => {
                error!(path = %self.path.display(), "Failed to list archive entries: {}", err);
                &[]
            }
        }
    }

    async fn load_entries(&self) -> Result<&[ArchiveEntry]> {
        let entries = self.entries.get_or_try_init(|| self.load()).await?;
        Ok(entries)
    }

    async fn load(&self) -> Result<Vec<ArchiveEntry>> {
        let backend = match &self.backend {
            Ok(backend) => backend,
            Err(extension) => return Err(ArchiveError::UnsupportedFormat(extension.clone())),
        };

        let entries = backend.list_entries().await?;
        debug!(path = %self.path.display(), count = entries.len(), "Loaded archive entries");

        Ok(entries
            .into_iter()
            .map(|entry| entry.bind(Arc::clone(backend)))
            .collect())
    }

    // == Extract Entry ==
    /// Writes `entry` under `output`, creating parent directories.
    ///
    /// Returns the path written.
    pub async fn extract_entry(&self, entry: &ArchiveEntry, output: &Path) -> Result<PathBuf> {
        let target = output_path_for(entry, output)?;

        info!(entry = %entry.entry_name, path = %target.display(), "Extracting entry");
        if let Some(progress) = &self.progress {
            // The listener going away does not stop extraction.
            let _ = progress.send(ExtractProgress {
                entry_name: entry.entry_name.clone(),
                path: target.clone(),
            });
        }

        if entry.is_directory {
            tokio::fs::create_dir_all(&target).await?;
        } else {
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let bytes = entry.data().await?;
            tokio::fs::write(&target, bytes).await?;
        }

        Ok(target)
    }

    // == Extract All ==
    /// Extracts every entry in list order, one at a time.
    ///
    /// Entries named verbatim in `ignores` are skipped. Without `overwrite`,
    /// files already present on disk are left alone. Returns how many entries
    /// were written. Unlike listing, an unreadable archive is an error here.
    pub async fn extract_all_to(
        &self,
        output: &Path,
        overwrite: bool,
        ignores: &[String],
    ) -> Result<usize> {
        let mut extracted = 0;

        for entry in self.load_entries().await? {
            if ignores.iter().any(|ignored| *ignored == entry.entry_name) {
                debug!(entry = %entry.entry_name, "Ignoring entry");
                continue;
            }

            if !overwrite && !entry.is_directory {
                let target = output_path_for(entry, output)?;
                if tokio::fs::try_exists(&target).await? {
                    debug!(path = %target.display(), "Keeping existing file");
                    continue;
                }
            }

            self.extract_entry(entry, output).await?;
            extracted += 1;
        }

        Ok(extracted)
    }
}

fn output_path_for(entry: &ArchiveEntry, output: &Path) -> Result<PathBuf> {
    let relative = entry
        .output_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(&entry.entry_name));
    safe_join(output, &relative)
}

/// Joins `relative` onto `base`, refusing paths that climb out of `base`.
pub(crate) fn safe_join(base: &Path, relative: &Path) -> Result<PathBuf> {
    let mut joined = base.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ArchiveError::UnsafePath(relative.display().to_string()));
            }
        }
    }
    Ok(joined)
}
