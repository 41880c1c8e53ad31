//! Configuration management for Glimpse
//!
//! Project-level settings live in `.glimpse/config.toml`: which backend mode
//! to resolve against, how to launch the browser for live resolution, and
//! exclusion items applied to every resolution.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{GlimpseError, Result};

/// Project-level Glimpse configuration
///
/// Loaded from `.glimpse/config.toml` in the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlimpseConfig {
    /// Backend used for resolution
    #[serde(default)]
    pub mode: BackendMode,

    /// Browser launch settings for live resolution
    #[serde(default)]
    pub browser: BrowserSettings,

    /// Exclusion items (query strings or `{x0, y0, x1, y1}` tables) applied to every resolution
    #[serde(default)]
    pub default_exclude: Vec<serde_json::Value>,
}

/// Which automation backend geometry is resolved against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Script-executing web backend
    #[default]
    Live,
    /// Static UI-tree dump backend
    Snapshot,
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Snapshot => write!(f, "snapshot"),
        }
    }
}

impl std::str::FromStr for BackendMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "live" | "web" => Ok(Self::Live),
            "snapshot" | "app" => Ok(Self::Snapshot),
            _ => Err(format!("Invalid backend mode: {}", s)),
        }
    }
}

/// Browser launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// Run in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Browser window width
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    /// Browser window height
    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Navigation timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_headless() -> bool {
    true
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_timeout_seconds() -> u64 {
    30
}

impl GlimpseConfig {
    /// Load configuration from `.glimpse/config.toml` or use defaults
    pub fn load_or_default(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".glimpse/config.toml");

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)
                .map_err(|e| GlimpseError::Config(format!("Failed to parse config file: {}", e)))
        } else {
            Ok(Self::default())
        }
    }

    /// Write default configuration to `.glimpse/config.toml`
    pub fn write_default(project_root: &Path) -> Result<()> {
        let config_dir = project_root.join(".glimpse");
        std::fs::create_dir_all(&config_dir)?;

        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| GlimpseError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(config_dir.join("config.toml"), content)?;
        Ok(())
    }
}

impl Default for GlimpseConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::default(),
            browser: BrowserSettings::default(),
            default_exclude: Vec::new(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}
