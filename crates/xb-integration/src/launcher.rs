//! Emulator launchers
//!
//! A launcher receives the final argument sequence exactly once.

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Arc;
use tokio::process::{Child, Command};
use tracing::info;
use xb_core::LaunchError;
use xb_vfs::{EmulatedFs, Fetcher};

/// Hands the argument sequence to the emulator
pub trait EmulatorLauncher {
    fn start(&mut self, args: Vec<String>) -> impl Future<Output = Result<(), LaunchError>>;
}

/// Stages the emulated filesystem into a directory and spawns the emulator there
pub struct ProcessLauncher<F> {
    binary: PathBuf,
    extra_args: Vec<String>,
    staging_dir: PathBuf,
    fs: Arc<EmulatedFs>,
    fetcher: F,
    child: Option<Child>,
}

impl<F: Fetcher> ProcessLauncher<F> {
    pub fn new(binary: PathBuf, staging_dir: PathBuf, fs: Arc<EmulatedFs>, fetcher: F) -> Self {
        Self {
            binary,
            extra_args: Vec::new(),
            staging_dir,
            fs,
            fetcher,
            child: None,
        }
    }

    /// Arguments appended after the generated sequence
    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    /// Wait for the emulator to exit
    pub async fn wait(&mut self) -> Result<ExitStatus, LaunchError> {
        let child = self.child.as_mut().ok_or_else(|| LaunchError::Spawn {
            binary: self.binary.display().to_string(),
            reason: "emulator was never started".to_string(),
        })?;
        child.wait().await.map_err(|e| LaunchError::Spawn {
            binary: self.binary.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl<F: Fetcher> EmulatorLauncher for ProcessLauncher<F> {
    async fn start(&mut self, args: Vec<String>) -> Result<(), LaunchError> {
        if self.child.is_some() {
            return Err(LaunchError::AlreadyStarted);
        }

        let summary = self.fs.stage_into(&self.staging_dir, &self.fetcher).await?;
        for (name, reason) in &summary.failed {
            tracing::warn!("{} is unavailable to the emulator: {}", name, reason);
        }

        info!("Starting emulator: {} {}", self.binary.display(), args.join(" "));
        let child = Command::new(&self.binary)
            .args(&args)
            .args(&self.extra_args)
            .current_dir(&self.staging_dir)
            .spawn()
            .map_err(|e| LaunchError::Spawn {
                binary: self.binary.display().to_string(),
                reason: e.to_string(),
            })?;

        self.child = Some(child);
        Ok(())
    }
}

/// Records the arguments instead of starting anything
#[derive(Debug, Default)]
pub struct DryRunLauncher {
    args: Option<Vec<String>>,
}

impl DryRunLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn args(&self) -> Option<&[String]> {
        self.args.as_deref()
    }
}

impl EmulatorLauncher for DryRunLauncher {
    async fn start(&mut self, args: Vec<String>) -> Result<(), LaunchError> {
        if self.args.is_some() {
            return Err(LaunchError::AlreadyStarted);
        }
        info!("Emulator arguments: {:?}", args);
        self.args = Some(args);
        Ok(())
    }
}
