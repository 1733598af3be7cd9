//! Bootstrap orchestrator
//!
//! Runs one startup of the emulator:
//!
//! 1. pre-run steps, in order
//! 2. if a manifest location was given: register one gate unit, run the
//!    archive or directory resolver, release the unit
//! 3. assemble `-keymap <layout>` plus any start arguments
//! 4. hand the arguments to the launcher once the gate signals it drained
//! 5. post-run steps, in order
//!
//! Resolution failures are recorded and absorbed; the emulator always
//! starts, with the keymap-only arguments if nothing else worked.

use crate::gate::StartupGate;
use crate::launcher::EmulatorLauncher;
use crate::progress::{ProgressReporter, Status};
use tracing::{debug, info, warn};
use xb_core::{BootError, Diagnostic, Diagnostics, Keymap, Result};
use xb_loader::{ArchiveResolver, DirectoryResolver, ManifestLocation, Resolved, StartMode};
use xb_vfs::{Fetcher, ResourceWriter};

/// Emulator flag selecting the keyboard layout
pub const KEYMAP_FLAG: &str = "-keymap";

/// Gate id used while an archive is resolved
pub const ARCHIVE_DEPENDENCY: &str = "load-zip";

/// Gate id used while a directory manifest is resolved
pub const DIRECTORY_DEPENDENCY: &str = "load-manifest";

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    /// No resolution has happened (and with no location, never will)
    Idle,
    /// A resolver is running
    Resolving,
    /// Resolution finished and the gate released
    Ready,
}

/// State visible to init steps
#[derive(Debug)]
pub struct BootContext {
    pub keymap: Keymap,
    pub location: Option<ManifestLocation>,
    pub state: BootState,
    pub start_mode: StartMode,
    /// Basenames handed to the resource writer
    pub written: Vec<String>,
    pub diagnostics: Diagnostics,
    /// Final argument sequence, filled in before the emulator starts
    pub args: Vec<String>,
}

impl BootContext {
    fn new(keymap: Keymap, location: Option<ManifestLocation>) -> Self {
        Self {
            keymap,
            location,
            state: BootState::Idle,
            start_mode: StartMode::None,
            written: Vec::new(),
            diagnostics: Diagnostics::new(),
            args: Vec::new(),
        }
    }
}

/// A named initialization step.
///
/// Pre-run steps see the context before resolution (`state == Idle`,
/// `args` empty) and may adjust the keymap or location. Post-run steps
/// see the final context after the emulator was handed its arguments.
/// A failing step is recorded as a diagnostic and does not stop startup.
#[derive(Clone, Copy)]
pub struct InitStep {
    pub name: &'static str,
    pub run: fn(&mut BootContext) -> Result<()>,
}

impl InitStep {
    pub const fn new(name: &'static str, run: fn(&mut BootContext) -> Result<()>) -> Self {
        Self { name, run }
    }
}

/// Summary of a bootstrap run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootReport {
    pub state: BootState,
    pub location: Option<ManifestLocation>,
    pub start_mode: StartMode,
    pub args: Vec<String>,
    pub written: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl BootReport {
    /// Number of resource writes issued
    pub fn writes(&self) -> usize {
        self.written.len()
    }
}

/// Top-level startup orchestrator
pub struct Bootstrap<F, W> {
    fetcher: F,
    writer: W,
    gate: StartupGate,
    ctx: BootContext,
    pre_run: Vec<InitStep>,
    post_run: Vec<InitStep>,
    resolved: bool,
    /// Set by the gate's one-time drained signal
    gate_fired: bool,
    started: bool,
}

impl<F: Fetcher, W: ResourceWriter> Bootstrap<F, W> {
    pub fn new(keymap: Keymap, location: Option<ManifestLocation>, fetcher: F, writer: W) -> Self {
        Self {
            fetcher,
            writer,
            gate: StartupGate::default(),
            ctx: BootContext::new(keymap, location),
            pre_run: Vec::new(),
            post_run: Vec::new(),
            resolved: false,
            gate_fired: false,
            started: false,
        }
    }

    /// Use a specific progress reporter for the gate
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.gate = StartupGate::new(progress);
        self
    }

    pub fn with_pre_run(mut self, step: InitStep) -> Self {
        self.pre_run.push(step);
        self
    }

    pub fn with_post_run(mut self, step: InitStep) -> Self {
        self.post_run.push(step);
        self
    }

    pub fn state(&self) -> BootState {
        self.ctx.state
    }

    pub fn gate(&self) -> &StartupGate {
        &self.gate
    }

    pub fn context(&self) -> &BootContext {
        &self.ctx
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// The emulator may start: the gate signalled it drained, or nothing
    /// was ever registered on it
    pub fn is_ready(&self) -> bool {
        if self.gate.high_water_mark() == 0 {
            self.gate.is_clear()
        } else {
            self.gate_fired
        }
    }

    /// Run pre-run steps and resolve the manifest, if any.
    ///
    /// Only the first call does any work; later calls return the same report.
    pub async fn resolve(&mut self) -> BootReport {
        if self.resolved {
            debug!("Manifest already resolved");
            return self.report();
        }
        self.resolved = true;

        run_steps("pre-run", &self.pre_run, &mut self.ctx);

        if let Some(location) = self.ctx.location.clone() {
            self.resolve_location(&location).await;
        } else {
            info!("No manifest location, starting with defaults");
        }

        self.ctx.args = assemble_args(&self.ctx.keymap, &self.ctx.start_mode);
        self.report()
    }

    async fn resolve_location(&mut self, location: &ManifestLocation) {
        self.ctx.state = BootState::Resolving;
        self.gate
            .progress_mut()
            .set_status(Status::text("Downloading file..."));

        let dependency = match location {
            ManifestLocation::Archive(_) => ARCHIVE_DEPENDENCY,
            ManifestLocation::Directory(_) => DIRECTORY_DEPENDENCY,
        };
        self.gate.begin(dependency);

        let result = match location {
            ManifestLocation::Archive(url) => {
                ArchiveResolver::new(&self.fetcher, url)
                    .resolve(&self.writer, &mut self.ctx.diagnostics)
                    .await
            }
            ManifestLocation::Directory(base) => {
                DirectoryResolver::new(&self.fetcher, base)
                    .resolve(&self.writer, &mut self.ctx.diagnostics)
                    .await
            }
        };

        match result {
            Ok(Resolved {
                start_mode,
                written,
            }) => {
                self.ctx.start_mode = start_mode;
                self.ctx.written = written;
            }
            Err(e) => {
                self.ctx.diagnostics.record(e);
                warn!("Unable to read manifest from {}, starting with defaults", location);
            }
        }

        if self.gate.end(dependency) {
            debug!("Run dependencies satisfied");
            self.gate_fired = true;
        }
        self.ctx.state = BootState::Ready;
    }

    /// Resolve, then hand the arguments to `launcher` and run post-run steps
    pub async fn run<L: EmulatorLauncher>(&mut self, launcher: &mut L) -> Result<BootReport> {
        self.resolve().await;

        if self.started {
            return Err(BootError::Launch(xb_core::LaunchError::AlreadyStarted));
        }
        if !self.is_ready() {
            return Err(BootError::Config(format!(
                "{} startup dependencies still outstanding",
                self.gate.outstanding()
            )));
        }

        info!("Starting emulator...");
        info!("Emulator arguments: {:?}", self.ctx.args);
        self.started = true;
        launcher.start(self.ctx.args.clone()).await?;

        run_steps("post-run", &self.post_run, &mut self.ctx);
        Ok(self.report())
    }

    fn report(&self) -> BootReport {
        BootReport {
            state: self.ctx.state,
            location: self.ctx.location.clone(),
            start_mode: self.ctx.start_mode.clone(),
            args: self.ctx.args.clone(),
            written: self.ctx.written.clone(),
            diagnostics: self.ctx.diagnostics.clone(),
        }
    }
}

/// `-keymap <layout>` followed by the start arguments, if any
pub fn assemble_args(keymap: &Keymap, start_mode: &StartMode) -> Vec<String> {
    let mut args = vec![KEYMAP_FLAG.to_string(), keymap.as_str().to_string()];
    args.extend(start_mode.args());
    args
}

fn run_steps(phase: &str, steps: &[InitStep], ctx: &mut BootContext) {
    for step in steps {
        debug!("Running {} step {}", phase, step.name);
        if let Err(e) = (step.run)(ctx) {
            ctx.diagnostics.record(Diagnostic::StepFailed {
                phase: phase.to_string(),
                step: step.name.to_string(),
                reason: e.to_string(),
            });
        }
    }
}
