//! Diagnostics recorded while resolving a manifest
//!
//! Every problem found during resolution is logged and kept in a
//! [`Diagnostics`] list so the caller can show it next to the emulator
//! output. Nothing recorded here is escalated: resolution always
//! continues with whatever loaded.

use crate::error::ResolveError;
use std::fmt;
use thiserror::Error;

/// How bad a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Part of the manifest was ignored
    Warning,
    /// The manifest source could not be resolved at all
    Error,
}

/// A single recorded problem
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("start_bas ({bas}) and start_prg ({prg}) both set in manifest, defaulting to start_bas")]
    ConflictingStartDirectives { bas: String, prg: String },

    #[error("{directive} entry {entry} not found within resources entries")]
    StartEntryNotInResources { directive: String, entry: String },

    #[error("Unable to find resources entry {name} in archive, check resources section in manifest")]
    ResourceNotInArchive { name: String },

    #[error("Failed to write {name} to emulator filesystem: {reason}")]
    ResourceWriteFailed { name: String, reason: String },

    #[error("{phase} step {step} failed: {reason}")]
    StepFailed {
        phase: String,
        step: String,
        reason: String,
    },

    #[error("{0}")]
    Aborted(ResolveError),
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Aborted(_) | Self::ResourceWriteFailed { .. } | Self::StepFailed { .. } => {
                Severity::Error
            }
            _ => Severity::Warning,
        }
    }

    /// Stable kind name, matches the variant name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConflictingStartDirectives { .. } => "ConflictingStartDirectives",
            Self::StartEntryNotInResources { .. } => "StartEntryNotInResources",
            Self::ResourceNotInArchive { .. } => "ResourceNotInArchive",
            Self::ResourceWriteFailed { .. } => "ResourceWriteFailed",
            Self::StepFailed { .. } => "StepFailed",
            Self::Aborted(ResolveError::Parse(_)) => "ParseError",
            Self::Aborted(ResolveError::MissingDescriptor { .. }) => "MissingDescriptor",
            Self::Aborted(ResolveError::DescriptorFetch { .. }) => "DescriptorFetchError",
            Self::Aborted(ResolveError::ArchiveFetch { .. }) => "ArchiveFetchError",
            Self::Aborted(ResolveError::Archive { .. }) => "ArchiveError",
        }
    }
}

impl From<ResolveError> for Diagnostic {
    fn from(err: ResolveError) -> Self {
        Self::Aborted(err)
    }
}

/// Ordered list of diagnostics for one bootstrap run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a diagnostic and keep it
    pub fn record(&mut self, diagnostic: impl Into<Diagnostic>) {
        let diagnostic = diagnostic.into();
        match diagnostic.severity() {
            Severity::Error => tracing::error!(kind = diagnostic.kind(), "{}", diagnostic),
            Severity::Warning => tracing::warn!(kind = diagnostic.kind(), "{}", diagnostic),
        }
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether a diagnostic of the given kind was recorded
    pub fn contains_kind(&self, kind: &str) -> bool {
        self.entries.iter().any(|d| d.kind() == kind)
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity() == Severity::Error)
    }
}

impl fmt::Display for Diagnostics {
    /// Renders the list the way the on-screen log shows it
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.entries {
            writeln!(f, "[error] {}", diagnostic)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
