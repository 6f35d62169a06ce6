// Panel configuration at `~/.wordassist/config.toml`.
//
// Every field has a default, so a missing or partial file is valid.
// `WORDASSIST_SERVICE_URL` and `WORDASSIST_LOG_FILTER` override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::history::{ClearConfirm, HistoryLimit, DEFAULT_CLEAR_CONFIRM_SECS};
use crate::private_fs::write_private;

pub const SERVICE_URL_ENV: &str = "WORDASSIST_SERVICE_URL";
pub const LOG_FILTER_ENV: &str = "WORDASSIST_LOG_FILTER";

/// Root directory for panel state: `~/.wordassist/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".wordassist"))
}

/// Path to the config file: `~/.wordassist/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("config.toml"))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PanelConfig {
    /// Base URL of the assist service (e.g. `https://assist.example.com`).
    pub service_url: String,
    /// Overall HTTP timeout. Unset keeps the transport default.
    pub request_timeout_secs: Option<u64>,
    /// Heading line placed above inserted explanations.
    pub explain_heading: Option<String>,
    /// Reload the history list after an assist run while the History tab is open.
    pub refresh_history_after_assist: bool,
    /// `tracing` filter directive, e.g. `info` or `wordassist_panel=debug`.
    pub log_filter: String,
    pub history: HistoryConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8080".into(),
            request_timeout_secs: None,
            explain_heading: None,
            refresh_history_after_assist: true,
            log_filter: "info".into(),
            history: HistoryConfig::default(),
        }
    }
}

impl PanelConfig {
    /// Load from `~/.wordassist/config.toml`. Returns defaults if the file
    /// doesn't exist or can't be parsed.
    pub fn load() -> Self {
        config_path().and_then(|p| Self::load_from(&p).ok()).unwrap_or_default()
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save to `~/.wordassist/config.toml`.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path().ok_or_else(|| {
            ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine home directory",
            ))
        })?;
        self.save_to(&path)
    }

    /// Save to a specific path (creates parent directories, owner-only).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        write_private(path, contents.as_bytes())
            .map_err(|error| ConfigError::Io(std::io::Error::other(format!("{error:#}"))))
    }

    /// Apply environment overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_env_fn(|key| std::env::var(key))
    }

    /// Testable variant that accepts an environment lookup function.
    fn with_env_fn<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        if let Some(url) = env(SERVICE_URL_ENV).ok().filter(|v| !v.trim().is_empty()) {
            self.service_url = url;
        }
        if let Some(filter) = env(LOG_FILTER_ENV).ok().filter(|v| !v.trim().is_empty()) {
            self.log_filter = filter;
        }
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs)
    }
}

/// `[history]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Initial page size: 10, 30 or 50.
    pub default_limit: u32,
    /// Seconds a first "clear history" press stays armed (1–30).
    pub clear_confirm_secs: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: HistoryLimit::default().as_u32(),
            clear_confirm_secs: DEFAULT_CLEAR_CONFIRM_SECS,
        }
    }
}

impl HistoryConfig {
    /// Configured page size; unsupported values fall back to 10.
    pub fn limit(&self) -> HistoryLimit {
        HistoryLimit::try_from(self.default_limit).unwrap_or_else(|error| {
            warn!(%error, "ignoring configured history limit");
            HistoryLimit::default()
        })
    }

    pub fn clear_confirm(&self) -> ClearConfirm {
        ClearConfirm::with_secs(self.clear_confirm_secs)
    }
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Serialize(e) => write!(f, "config serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
