//! Startup dependency gate
//!
//! Counts outstanding async work before the emulator may start. The
//! progress text uses the high-water mark as the total, so it is an
//! approximation when registrations are coarse.

use crate::progress::{ProgressReporter, Status};
use std::collections::BTreeSet;

/// Progress label while work is outstanding
pub const PREPARING_LABEL: &str = "Preparing...";

/// Status once the gate drains
pub const COMPLETE_TEXT: &str = "All downloads complete.";

#[derive(Debug)]
pub struct StartupGate {
    outstanding: BTreeSet<String>,
    high_water_mark: usize,
    registered: bool,
    fired: bool,
    progress: ProgressReporter,
}

impl StartupGate {
    pub fn new(progress: ProgressReporter) -> Self {
        Self {
            outstanding: BTreeSet::new(),
            high_water_mark: 0,
            registered: false,
            fired: false,
            progress,
        }
    }

    /// Register a unit of work under `id`
    pub fn begin(&mut self, id: &str) {
        if !self.outstanding.insert(id.to_string()) {
            tracing::warn!("Run dependency {} registered twice", id);
            return;
        }
        self.registered = true;
        self.high_water_mark = self.high_water_mark.max(self.outstanding.len());
        tracing::debug!("Run dependency added: {} ({} outstanding)", id, self.outstanding.len());
        self.report();
    }

    /// Release the unit registered under `id`.
    ///
    /// Returns `true` exactly once: on the release that first drains the gate.
    pub fn end(&mut self, id: &str) -> bool {
        if !self.outstanding.remove(id) {
            tracing::warn!("Run dependency {} released without being registered", id);
            return false;
        }
        tracing::debug!("Run dependency removed: {} ({} outstanding)", id, self.outstanding.len());
        self.report();

        if self.outstanding.is_empty() && !self.fired {
            self.fired = true;
            return true;
        }
        false
    }

    fn report(&mut self) {
        let left = self.outstanding.len();
        let status = if left > 0 {
            Status::Progress {
                label: PREPARING_LABEL.to_string(),
                done: self.high_water_mark - left,
                total: self.high_water_mark,
            }
        } else {
            Status::text(COMPLETE_TEXT)
        };
        self.progress.set_status(status);
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }

    /// Drained after at least one registration
    pub fn is_satisfied(&self) -> bool {
        self.registered && self.outstanding.is_empty()
    }

    /// Nothing is holding the emulator back
    pub fn is_clear(&self) -> bool {
        self.outstanding.is_empty()
    }

    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressReporter {
        &mut self.progress
    }
}

impl Default for StartupGate {
    fn default() -> Self {
        Self::new(ProgressReporter::default())
    }
}
