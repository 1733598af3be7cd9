//! Keyboard layout selection
//!
//! The emulator accepts a fixed set of layouts through `-keymap`. The list
//! below is what `x16emu -keymap` prints.

use std::fmt;

/// Layouts understood by the emulator
pub const LAYOUTS: &[&str] = &[
    "en-us", "en-gb", "de", "nordic", "it", "pl", "hu", "es", "fr", "de-ch", "fr-be", "pt-br",
];

/// Layout used when nothing else matches
pub const DEFAULT_LAYOUT: &str = "en-us";

/// A validated keyboard layout name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap(&'static str);

impl Keymap {
    /// Look up an exact layout name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        LAYOUTS.iter().copied().find(|l| *l == name).map(Keymap)
    }

    /// Pick a layout for a language tag such as `de-CH`, `pt_BR.UTF-8` or `fr`.
    ///
    /// The full tag is tried first, then its primary subtag. Anything else
    /// falls back to `en-us`.
    pub fn for_language(lang: Option<&str>) -> Self {
        let Some(raw) = lang else {
            tracing::info!("No language set, using keyboard map: {}", DEFAULT_LAYOUT);
            return Self::default();
        };

        let normalized = normalize_language(raw);
        if let Some(keymap) = Self::from_name(&normalized) {
            tracing::info!("Using keyboard map: {}", keymap);
            return keymap;
        }

        if let Some(primary) = normalized.split('-').next() {
            if let Some(keymap) = Self::from_name(primary) {
                tracing::info!("Using keyboard map: {} (from {})", keymap, raw);
                return keymap;
            }
        }

        tracing::info!(
            "Language ({}) not found in keymaps so using keyboard map: {}",
            normalized,
            DEFAULT_LAYOUT
        );
        Self::default()
    }

    /// Detect from an explicit override or the process locale
    pub fn detect(explicit: Option<&str>) -> Self {
        if let Some(name) = explicit {
            if let Some(keymap) = Self::from_name(name) {
                tracing::info!("Using configured keyboard map: {}", keymap);
                return keymap;
            }
            tracing::warn!("Configured keymap {:?} is not a known layout, ignoring", name);
        }

        let lang = ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty() && v != "C" && v != "POSIX");
        Self::for_language(lang.as_deref())
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Keymap(DEFAULT_LAYOUT)
    }
}

impl fmt::Display for Keymap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// `pt_BR.UTF-8@euro` -> `pt-br`
fn normalize_language(raw: &str) -> String {
    let tag = raw.split(['.', '@']).next().unwrap_or(raw);
    tag.trim().replace('_', "-").to_ascii_lowercase()
}
