//! Startup integration layer for the x16 manifest bootstrapper
//!
//! This crate ties the resolvers, the emulated filesystem and the emulator
//! process together behind a single [`Bootstrap`] run.

pub mod bootstrap;
pub mod gate;
pub mod launcher;
pub mod progress;

pub use bootstrap::{assemble_args, BootContext, BootReport, BootState, Bootstrap, InitStep};
pub use gate::StartupGate;
pub use launcher::{DryRunLauncher, EmulatorLauncher, ProcessLauncher};
pub use progress::{ProgressReporter, Status};
