//! Archive resolver
//!
//! Loads a `.zip` bundling `manifest.json` and its resources. Every
//! resource is looked up by basename at the archive root, decompressed in
//! memory and written eagerly; a missing or failed resource is recorded
//! and skipped.

use crate::manifest::{ManifestDescriptor, MANIFEST_NAME};
use crate::Resolved;
use futures::future::join_all;
use std::io::{Cursor, Read};
use tracing::{debug, info};
use xb_core::{Diagnostic, Diagnostics, ResolveError};
use xb_vfs::{Fetcher, ResourceWriter};
use zip::result::ZipError;
use zip::read::ZipFile;
use zip::ZipArchive;

/// Resolver for archive manifest locations
pub struct ArchiveResolver<'a, F> {
    fetcher: &'a F,
    location: &'a str,
}

impl<'a, F: Fetcher> ArchiveResolver<'a, F> {
    pub fn new(fetcher: &'a F, location: &'a str) -> Self {
        Self { fetcher, location }
    }

    /// Download the archive and resolve it
    pub async fn resolve<W: ResourceWriter>(
        &self,
        writer: &W,
        diagnostics: &mut Diagnostics,
    ) -> Result<Resolved, ResolveError> {
        info!("Downloading archive {}", self.location);
        let bytes = self
            .fetcher
            .fetch_bytes(self.location)
            .await
            .map_err(|e| ResolveError::ArchiveFetch {
                url: self.location.to_string(),
                reason: e.to_string(),
            })?;

        resolve_archive_bytes(self.location, bytes, writer, diagnostics).await
    }
}

/// Upper bound on the buffer reserved from an entry's declared size
const PREALLOC_LIMIT: u64 = 1 << 20;

/// Decompress one entry. The size in the header is only a hint.
fn read_entry(file: &mut ZipFile<'_>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(file.size().min(PREALLOC_LIMIT) as usize);
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Resolve an archive that is already in memory.
///
/// `location` is only used in messages.
pub async fn resolve_archive_bytes<W: ResourceWriter>(
    location: &str,
    bytes: Vec<u8>,
    writer: &W,
    diagnostics: &mut Diagnostics,
) -> Result<Resolved, ResolveError> {
    let archive_error = |e: ZipError| ResolveError::Archive {
        location: location.to_string(),
        reason: e.to_string(),
    };

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(archive_error)?;
    debug!("Opened archive {} with {} entries", location, archive.len());

    let descriptor_bytes = match archive.by_name(MANIFEST_NAME) {
        Ok(mut file) => read_entry(&mut file).map_err(|e| archive_error(ZipError::Io(e)))?,
        Err(ZipError::FileNotFound) => {
            return Err(ResolveError::MissingDescriptor {
                location: location.to_string(),
            })
        }
        Err(e) => return Err(archive_error(e)),
    };

    let descriptor = ManifestDescriptor::from_bytes(&descriptor_bytes, diagnostics)?;
    info!(
        "Parsed manifest from archive: {} resources, start {:?}",
        descriptor.resources().len(),
        descriptor.start_mode()
    );

    // Decompression needs the archive mutably, so it runs entry by entry;
    // the writes below are issued together.
    let mut pending = Vec::with_capacity(descriptor.resources().len());
    for entry in descriptor.resources() {
        let name = entry.basename();
        match archive.by_name(name) {
            Ok(mut file) => {
                match read_entry(&mut file) {
                    Ok(buf) => pending.push((name.to_string(), buf)),
                    Err(e) => diagnostics.record(Diagnostic::ResourceWriteFailed {
                        name: name.to_string(),
                        reason: e.to_string(),
                    }),
                }
            }
            Err(ZipError::FileNotFound) => {
                diagnostics.record(Diagnostic::ResourceNotInArchive {
                    name: name.to_string(),
                });
            }
            Err(e) => diagnostics.record(Diagnostic::ResourceWriteFailed {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    let results = join_all(pending.into_iter().map(|(name, bytes)| async move {
        let result = writer.write(&name, bytes).await;
        (name, result)
    }))
    .await;

    let mut written = Vec::with_capacity(results.len());
    for (name, result) in results {
        match result {
            Ok(()) => {
                debug!("Wrote {} to emulator filesystem", name);
                written.push(name);
            }
            Err(e) => diagnostics.record(Diagnostic::ResourceWriteFailed {
                name,
                reason: e.to_string(),
            }),
        }
    }

    info!("Emulator filesystem loading complete ({} files)", written.len());
    Ok(Resolved {
        start_mode: descriptor.start_mode().clone(),
        written,
    })
}
