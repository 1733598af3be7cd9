//! Manifest descriptor (`manifest.json`) parsing and validation
//!
//! Manifests are written by hand, so validation loads as much as it can:
//! only unparseable input is fatal. Conflicting or dangling start
//! directives are recorded as diagnostics and resolved by precedence.

use serde::Deserialize;
use tracing::{debug, info};
use xb_core::{Diagnostic, Diagnostics, ResolveError};
use xb_vfs::basename;

/// Name of the descriptor inside an archive or directory
pub const MANIFEST_NAME: &str = "manifest.json";

/// Emulator flag that loads and runs a BASIC listing
pub const BAS_FLAG: &str = "-bas";

/// Emulator flag that loads and runs a binary program
pub const PRG_FLAG: &str = "-prg";

/// Emulator flag that auto-runs the loaded program
pub const RUN_FLAG: &str = "-run";

/// Document as written by the author
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    resources: Option<Vec<String>>,
    #[serde(default)]
    start_bas: Option<String>,
    #[serde(default)]
    start_prg: Option<String>,
}

/// What to run once the emulator is up
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StartMode {
    /// Boot to the READY prompt
    #[default]
    None,
    /// Load and run a BASIC listing
    RunBasic(String),
    /// Load and run a binary program
    RunProgram(String),
}

impl StartMode {
    /// Emulator arguments for this mode, empty for [`StartMode::None`]
    pub fn args(&self) -> Vec<String> {
        match self {
            StartMode::None => Vec::new(),
            StartMode::RunBasic(entry) => {
                vec![BAS_FLAG.to_string(), entry.clone(), RUN_FLAG.to_string()]
            }
            StartMode::RunProgram(entry) => {
                vec![PRG_FLAG.to_string(), entry.clone(), RUN_FLAG.to_string()]
            }
        }
    }
}

/// A single declared resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    declared_path: String,
    basename: String,
}

impl ResourceEntry {
    pub fn new(declared_path: impl Into<String>) -> Self {
        let declared_path = declared_path.into();
        let basename = basename(&declared_path).to_string();
        Self {
            declared_path,
            basename,
        }
    }

    /// Path as written in the manifest
    pub fn declared_path(&self) -> &str {
        &self.declared_path
    }

    /// Key used for archive lookup and in the emulated filesystem
    pub fn basename(&self) -> &str {
        &self.basename
    }
}

/// Validated manifest
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestDescriptor {
    start_mode: StartMode,
    resources: Vec<ResourceEntry>,
}

impl ManifestDescriptor {
    /// Decode UTF-8 bytes and parse them
    pub fn from_bytes(bytes: &[u8], diagnostics: &mut Diagnostics) -> Result<Self, ResolveError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ResolveError::Parse(format!("manifest is not valid UTF-8: {}", e)))?;
        Self::parse(text, diagnostics)
    }

    /// Parse and validate a manifest document
    pub fn parse(text: &str, diagnostics: &mut Diagnostics) -> Result<Self, ResolveError> {
        // A UTF-8 BOM is common in hand-edited files
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let raw: RawManifest =
            serde_json::from_str(text).map_err(|e| ResolveError::Parse(e.to_string()))?;
        debug!("Parsed manifest: {:?}", raw);

        Ok(Self::validate(raw, diagnostics))
    }

    fn validate(raw: RawManifest, diagnostics: &mut Diagnostics) -> Self {
        let resources: Vec<ResourceEntry> = raw
            .resources
            .unwrap_or_default()
            .into_iter()
            .map(ResourceEntry::new)
            .collect();

        let start_bas = raw.start_bas.filter(|s| !s.is_empty());
        let start_prg = raw.start_prg.filter(|s| !s.is_empty());

        let requested = match (start_bas, start_prg) {
            (Some(bas), Some(prg)) => {
                diagnostics.record(Diagnostic::ConflictingStartDirectives {
                    bas: bas.clone(),
                    prg,
                });
                Some(("start_bas", bas))
            }
            (Some(bas), None) => Some(("start_bas", bas)),
            (None, Some(prg)) => Some(("start_prg", prg)),
            (None, None) => None,
        };

        let start_mode = match requested {
            None => StartMode::None,
            Some((directive, entry)) => {
                // Membership is checked by basename; the emulator gets the
                // entry exactly as declared.
                let name = basename(&entry);
                if resources.iter().any(|r| r.basename() == name) {
                    info!("Adding {}: {}", directive, entry);
                    if directive == "start_bas" {
                        StartMode::RunBasic(entry)
                    } else {
                        StartMode::RunProgram(entry)
                    }
                } else {
                    diagnostics.record(Diagnostic::StartEntryNotInResources {
                        directive: directive.to_string(),
                        entry,
                    });
                    StartMode::None
                }
            }
        };

        Self {
            start_mode,
            resources,
        }
    }

    pub fn start_mode(&self) -> &StartMode {
        &self.start_mode
    }

    pub fn resources(&self) -> &[ResourceEntry] {
        &self.resources
    }
}
