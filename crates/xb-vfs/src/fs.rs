//! In-memory emulated filesystem
//!
//! A flat namespace of files keyed by basename, the same shape the
//! emulator sees in its working directory. Files are either resident
//! (bytes already in memory) or lazy (backed by a URL and fetched the
//! first time they are read or staged).

use crate::remote::Fetcher;
use crate::writer::ResourceWriter;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use xb_core::VfsError;

/// Where a file's contents come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Bytes held in memory
    Resident(Vec<u8>),
    /// Fetched on demand from the URL
    Lazy { url: String },
}

/// Result of staging the filesystem into a host directory
#[derive(Debug, Clone, Default)]
pub struct StageSummary {
    /// Host paths written
    pub written: Vec<PathBuf>,
    /// Files that could not be staged, with the reason
    pub failed: Vec<(String, String)>,
}

/// Emulated filesystem shared between resolvers and the launcher
#[derive(Debug, Default)]
pub struct EmulatedFs {
    files: RwLock<BTreeMap<String, FileSource>>,
}

impl EmulatedFs {
    /// Create an empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Store resident bytes, replacing any previous entry
    pub fn write_file(&self, name: &str, bytes: Vec<u8>) -> Result<(), VfsError> {
        validate_name(name)?;
        tracing::debug!("Writing to emulator filesystem: {} ({} bytes)", name, bytes.len());
        self.files
            .write()
            .insert(name.to_string(), FileSource::Resident(bytes));
        Ok(())
    }

    /// Register a URL-backed file, replacing any previous entry
    pub fn create_lazy_file(&self, name: &str, url: &str) -> Result<(), VfsError> {
        validate_name(name)?;
        tracing::debug!("Registering lazy file: {} -> {}", name, url);
        self.files.write().insert(
            name.to_string(),
            FileSource::Lazy {
                url: url.to_string(),
            },
        );
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.files.read().contains_key(name)
    }

    /// File names in sorted order
    pub fn list(&self) -> Vec<String> {
        self.files.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    /// Current source of a file
    pub fn source(&self, name: &str) -> Option<FileSource> {
        self.files.read().get(name).cloned()
    }

    /// Read a file, fetching and caching it if it is lazy
    pub async fn read<F: Fetcher>(&self, name: &str, fetcher: &F) -> Result<Vec<u8>, VfsError> {
        let url = match self.source(name) {
            Some(FileSource::Resident(bytes)) => return Ok(bytes),
            Some(FileSource::Lazy { url }) => url,
            None => return Err(VfsError::NotFound(name.to_string())),
        };

        let bytes = fetcher
            .fetch_bytes(&url)
            .await
            .map_err(|source| VfsError::Fetch {
                name: name.to_string(),
                source,
            })?;

        // Keep the lazy entry if something replaced it while we were fetching
        let mut files = self.files.write();
        if let Some(entry) = files.get_mut(name) {
            if matches!(entry, FileSource::Lazy { url: current } if *current == url) {
                *entry = FileSource::Resident(bytes.clone());
            }
        }

        Ok(bytes)
    }

    /// Write every file into `dir`, fetching lazy files as needed.
    ///
    /// A file that cannot be fetched is reported in the summary and
    /// skipped; only host I/O errors abort staging.
    pub async fn stage_into<F: Fetcher>(
        &self,
        dir: &Path,
        fetcher: &F,
    ) -> Result<StageSummary, VfsError> {
        tokio::fs::create_dir_all(dir).await?;

        let mut summary = StageSummary::default();
        for name in self.list() {
            let bytes = match self.read(&name, fetcher).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Unable to stage {}: {}", name, e);
                    summary.failed.push((name, e.to_string()));
                    continue;
                }
            };

            let path = dir.join(&name);
            tokio::fs::write(&path, bytes).await?;
            summary.written.push(path);
        }

        tracing::info!(
            "Staged {} files into {:?} ({} failed)",
            summary.written.len(),
            dir,
            summary.failed.len()
        );
        Ok(summary)
    }
}

impl ResourceWriter for EmulatedFs {
    async fn write(&self, name: &str, bytes: Vec<u8>) -> Result<(), VfsError> {
        self.write_file(name, bytes)
    }

    fn register_lazy(&self, name: &str, url: &str) -> Result<(), VfsError> {
        self.create_lazy_file(name, url)
    }
}

/// Names are single path segments
fn validate_name(name: &str) -> Result<(), VfsError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(VfsError::InvalidName(name.to_string()));
    }
    Ok(())
}
