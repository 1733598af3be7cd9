//! Startup progress reporting
//!
//! Status lines go to the log and into a history the caller can show.
//! Repeated text is dropped and progress updates are throttled; the
//! memo of the last update belongs to one reporter, so every bootstrap
//! run starts fresh.

use std::fmt;
use std::time::{Duration, Instant};

/// Default minimum interval between progress updates
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(30);

/// A status update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Counted progress, rendered as `label (done/total)`
    Progress {
        label: String,
        done: usize,
        total: usize,
    },
    /// Free text; an empty string clears the status
    Text(String),
}

impl Status {
    pub fn text(text: impl Into<String>) -> Self {
        Status::Text(text.into())
    }

    pub fn is_progress(&self) -> bool {
        matches!(self, Status::Progress { .. })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Progress { label, done, total } => write!(f, "{} ({}/{})", label, done, total),
            Status::Text(text) => f.write_str(text),
        }
    }
}

/// Memoizing, throttled status sink
#[derive(Debug)]
pub struct ProgressReporter {
    throttle: Duration,
    last_text: String,
    last_update: Option<Instant>,
    history: Vec<String>,
}

impl ProgressReporter {
    pub fn new(throttle: Duration) -> Self {
        Self {
            throttle,
            last_text: String::new(),
            last_update: None,
            history: Vec::new(),
        }
    }

    /// Publish a status. Returns whether it was shown.
    pub fn set_status(&mut self, status: Status) -> bool {
        self.set_status_at(status, Instant::now())
    }

    fn set_status_at(&mut self, status: Status, now: Instant) -> bool {
        let text = status.to_string();
        if text == self.last_text {
            return false;
        }

        if status.is_progress() {
            if let Some(last) = self.last_update {
                if now.saturating_duration_since(last) < self.throttle {
                    return false;
                }
            }
        }

        self.last_update = Some(now);
        self.last_text = text.clone();
        if !text.is_empty() {
            tracing::info!("{}", text);
            self.history.push(text);
        }
        true
    }

    /// Last text shown
    pub fn current(&self) -> &str {
        &self.last_text
    }

    /// Every status shown so far, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE)
    }
}
