//! Configuration system for the x16 manifest bootstrapper

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub general: GeneralConfig,
    pub emulator: EmulatorConfig,
    pub network: NetworkConfig,
    pub progress: ProgressConfig,
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Keyboard layout passed to `-keymap`; detected from the locale when unset
    pub keymap: Option<String>,
    pub log_level: LogLevel,
}

/// Emulator process settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    pub binary: PathBuf,
    /// Appended after the generated arguments
    pub extra_args: Vec<String>,
    /// Host directory the emulated filesystem is staged into before launch
    pub staging_dir: PathBuf,
}

/// Network settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Progress display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Minimum interval between two progress updates
    pub throttle_ms: u64,
}

/// Logging level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            keymap: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        let staging_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("x16-boot")
            .join("staging");

        Self {
            binary: PathBuf::from("x16emu"),
            extra_args: Vec::new(),
            staging_dir,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("x16-boot/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self { throttle_ms: 30 }
    }
}

impl Config {
    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::config_path();

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("x16-boot")
            .join("config.toml")
    }
}
