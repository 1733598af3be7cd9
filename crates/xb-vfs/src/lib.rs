//! Emulated filesystem for the x16 manifest bootstrapper
//!
//! Resolvers place resources here through the [`ResourceWriter`] seam;
//! the launcher later stages the whole tree into a host directory.

pub mod fs;
pub mod remote;
pub mod writer;

pub use fs::{EmulatedFs, FileSource, StageSummary};
pub use remote::{DefaultFetcher, FetchResponse, Fetcher};
pub use writer::{basename, ResourceWriter};
