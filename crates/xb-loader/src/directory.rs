//! Directory resolver
//!
//! Loads a loose directory: `manifest.json` is fetched from the base and
//! every resource is registered as a lazy file backed by
//! `<base><declared path>`. Nothing waits for the resource downloads.

use crate::manifest::{ManifestDescriptor, MANIFEST_NAME};
use crate::Resolved;
use tracing::{debug, info};
use xb_core::{Diagnostic, Diagnostics, ResolveError};
use xb_vfs::{Fetcher, ResourceWriter};

/// Resolver for directory manifest locations
pub struct DirectoryResolver<'a, F> {
    fetcher: &'a F,
    base: &'a str,
}

impl<'a, F: Fetcher> DirectoryResolver<'a, F> {
    /// `base` must end in `/`, as produced by [`crate::ManifestLocation`]
    pub fn new(fetcher: &'a F, base: &'a str) -> Self {
        debug_assert!(base.ends_with('/'), "directory base must end in '/'");
        Self { fetcher, base }
    }

    pub fn descriptor_url(&self) -> String {
        format!("{}{}", self.base, MANIFEST_NAME)
    }

    pub fn resource_url(&self, declared_path: &str) -> String {
        format!("{}{}", self.base, declared_path)
    }

    pub async fn resolve<W: ResourceWriter>(
        &self,
        writer: &W,
        diagnostics: &mut Diagnostics,
    ) -> Result<Resolved, ResolveError> {
        let url = self.descriptor_url();
        info!("Loading from manifest {}", url);

        let body = self
            .fetcher
            .fetch_bytes(&url)
            .await
            .map_err(|e| ResolveError::DescriptorFetch {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let descriptor = ManifestDescriptor::from_bytes(&body, diagnostics)?;

        let mut written = Vec::with_capacity(descriptor.resources().len());
        for entry in descriptor.resources() {
            let resource_url = self.resource_url(entry.declared_path());
            match writer.register_lazy(entry.basename(), &resource_url) {
                Ok(()) => {
                    debug!("Registered {} -> {}", entry.basename(), resource_url);
                    written.push(entry.basename().to_string());
                }
                Err(e) => diagnostics.record(Diagnostic::ResourceWriteFailed {
                    name: entry.basename().to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        info!("Registered {} lazy files from {}", written.len(), self.base);
        Ok(Resolved {
            start_mode: descriptor.start_mode().clone(),
            written,
        })
    }
}
