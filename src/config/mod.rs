//! Configuration file management
//!
//! Loads an optional TOML configuration file.
//! Default config path: ~/.config/kmsreset/config.toml

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_SETTLE_DELAY_MS;

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device used when -d is not given (auto-detect if unset)
    pub device: Option<PathBuf>,
    /// Wait after the commit before exiting, in milliseconds
    pub settle_delay_ms: u64,
    /// Allow the commit to do a full modeset
    pub allow_modeset: bool,
    /// Properties never written, whatever the object
    pub skip_properties: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: None,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            allow_modeset: true,
            skip_properties: Vec::new(),
        }
    }
}

impl Config {
    /// System-wide config path
    const SYSTEM_CONFIG_PATH: &'static str = "/etc/kmsreset/config.toml";

    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. KMSRESET_CONFIG environment variable
        if let Ok(path) = std::env::var("KMSRESET_CONFIG") {
            let p = Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
            warn!("KMSRESET_CONFIG points to missing file: {}", path);
        }

        // 2. User config: ~/.config/kmsreset/config.toml
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("kmsreset").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // 3. System config: /etc/kmsreset/config.toml
        let system_config = Path::new(Self::SYSTEM_CONFIG_PATH);
        if system_config.exists() {
            return Some(system_config.to_path_buf());
        }

        None
    }

    /// Load configuration with priority:
    /// 1. KMSRESET_CONFIG environment variable
    /// 2. ~/.config/kmsreset/config.toml (user config)
    /// 3. /etc/kmsreset/config.toml (system config)
    /// 4. Built-in defaults
    ///
    /// A broken file is never fatal.
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {:#}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
