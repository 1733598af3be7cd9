//! Error types for the x16 manifest bootstrapper

use thiserror::Error;

/// Main error type for the bootstrapper
#[derive(Error, Debug)]
pub enum BootError {
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("VFS error: {0}")]
    Vfs(#[from] VfsError),

    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Failures that end resolution of a manifest source.
///
/// None of these stop the emulator from starting: the orchestrator records
/// them and continues with the keymap-only argument sequence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Malformed manifest: {0}")]
    Parse(String),

    #[error("Unable to find manifest.json within: {location}")]
    MissingDescriptor { location: String },

    #[error("Unable to read manifest from {url}: {reason}")]
    DescriptorFetch { url: String, reason: String },

    #[error("Unable to download archive {url}: {reason}")]
    ArchiveFetch { url: String, reason: String },

    #[error("Corrupt archive {location}: {reason}")]
    Archive { location: String, reason: String },
}

/// Transport-level errors raised by a fetcher
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("request to {url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid location: {0}")]
    InvalidLocation(String),
}

/// Emulated filesystem errors
#[derive(Error, Debug)]
pub enum VfsError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    #[error("Fetch failed for {name}: {source}")]
    Fetch {
        name: String,
        #[source]
        source: FetchError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Emulator launch errors
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Emulator was already started")]
    AlreadyStarted,

    #[error("Failed to spawn {binary}: {reason}")]
    Spawn { binary: String, reason: String },

    #[error("Failed to stage files: {0}")]
    Staging(#[from] VfsError),
}

/// Result type alias for bootstrapper operations
pub type Result<T> = std::result::Result<T, BootError>;
