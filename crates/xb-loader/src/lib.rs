//! Manifest loading for the x16 manifest bootstrapper
//!
//! A manifest arrives either as a `.zip` bundling `manifest.json` with its
//! resources, or as a loose directory served next to `manifest.json`.

pub mod archive;
pub mod directory;
pub mod location;
pub mod manifest;

// Re-export main types
pub use archive::ArchiveResolver;
pub use directory::DirectoryResolver;
pub use location::ManifestLocation;
pub use manifest::{ManifestDescriptor, ResourceEntry, StartMode, MANIFEST_NAME};

/// Outcome of a resolver run that got as far as a parsed descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolved {
    /// Validated start mode
    pub start_mode: StartMode,
    /// Basenames handed to the resource writer, in the order they were issued
    pub written: Vec<String>,
}
