//! Core types for the x16 manifest bootstrapper
//!
//! This crate provides the foundational types, error handling,
//! diagnostics, configuration, keymap selection and logging
//! infrastructure shared by the resolver and orchestrator crates.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod keymap;
pub mod logging;

pub use config::Config;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{BootError, FetchError, LaunchError, ResolveError, Result, VfsError};
pub use keymap::Keymap;
