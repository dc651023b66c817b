//! Shared configuration for the Router Guardian CLI and TUI.
//!
//! One TOML file (`<config_dir>/router-guardian/config.toml`) layered with
//! `GUARDIAN_*` environment variables, translated into
//! `guardian_core::DashboardConfig`. The `[preferences]` table doubles as
//! the persisted dark-mode preference, with explicit load/save hooks.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use guardian_core::{BlockDurationPolicy, DashboardConfig};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "GUARDIAN_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown config key '{key}'")]
    UnknownKey { key: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub dashboard: DashboardSection,

    #[serde(default)]
    pub preferences: Preferences,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerSection {
    /// Service origin.
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept self-signed certificates.
    #[serde(default)]
    pub insecure: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout: default_timeout(),
            insecure: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DashboardSection {
    /// Poll period in seconds; 0 disables polling.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    /// Initial state of the auto-refresh toggle.
    #[serde(default = "default_true")]
    pub auto_refresh: bool,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// `"prompt"`, `"indefinite"`, or a fixed duration like `"1h"`.
    #[serde(default = "default_block_duration")]
    pub block_duration: String,
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            auto_refresh: true,
            page_size: default_page_size(),
            block_duration: default_block_duration(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:5000".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_refresh_interval() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_page_size() -> usize {
    5
}
fn default_block_duration() -> String {
    "prompt".into()
}

// ── Preferences ─────────────────────────────────────────────────────

/// User preferences persisted across sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Preferences {
    #[serde(default)]
    pub dark_mode: bool,
}

impl Preferences {
    /// Load hook: read preferences from the config file. Missing or
    /// unreadable files yield defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match load_file_only(path) {
            Ok(cfg) => cfg.preferences,
            Err(e) => {
                debug!(error = %e, "preferences unavailable, using defaults");
                Self::default()
            }
        }
    }

    /// Save hook: write preferences back, leaving other settings alone.
    pub fn save(self) -> Result<(), ConfigError> {
        self.save_to(&config_path())
    }

    pub fn save_to(self, path: &Path) -> Result<(), ConfigError> {
        // File-only load so env overrides are never persisted.
        let mut cfg = load_file_only(path)?;
        cfg.preferences = self;
        save_config_to(&cfg, path)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$GUARDIAN_CONFIG`, then platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "router-guardian", "router-guardian").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("router-guardian");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then the TOML file at `path`, then `GUARDIAN_*` variables
/// (`__` separates sections: `GUARDIAN_SERVER__URL`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GUARDIAN_").split("__"))
        .extract()?;
    Ok(config)
}

/// Defaults and the TOML file only; what `config set` edits and saves.
pub fn load_file_only(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Editing & translation ───────────────────────────────────────────

/// Keys accepted by [`Config::set`].
pub const SETTABLE_KEYS: &[&str] = &[
    "server.url",
    "server.timeout",
    "server.insecure",
    "dashboard.refresh_interval",
    "dashboard.auto_refresh",
    "dashboard.page_size",
    "dashboard.block_duration",
    "preferences.dark_mode",
];

fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(invalid(field, format!("expected true/false, got '{other}'"))),
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(field, format!("expected a whole number, got '{value}'")))
}

impl Config {
    /// Set one dotted key from its string form, validating the value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "server.url" => {
                parse_url(value)?;
                self.server.url = value.trim().to_owned();
            }
            "server.timeout" => self.server.timeout = parse_number(key, value)?,
            "server.insecure" => self.server.insecure = parse_bool(key, value)?,
            "dashboard.refresh_interval" => {
                self.dashboard.refresh_interval = parse_number(key, value)?;
            }
            "dashboard.auto_refresh" => self.dashboard.auto_refresh = parse_bool(key, value)?,
            "dashboard.page_size" => {
                let size: usize = parse_number(key, value)?;
                if size == 0 {
                    return Err(invalid(key, "must be at least 1"));
                }
                self.dashboard.page_size = size;
            }
            "dashboard.block_duration" => {
                parse_block_policy(value)?;
                self.dashboard.block_duration = value.trim().to_owned();
            }
            "preferences.dark_mode" => self.preferences.dark_mode = parse_bool(key, value)?,
            _ => return Err(ConfigError::UnknownKey { key: key.into() }),
        }
        Ok(())
    }

    /// Build a validated `DashboardConfig`.
    pub fn to_dashboard_config(&self) -> Result<DashboardConfig, ConfigError> {
        let mut dashboard = DashboardConfig::new(parse_url(&self.server.url)?);
        dashboard.timeout = Duration::from_secs(self.server.timeout.max(1));
        dashboard.accept_invalid_certs = self.server.insecure;
        dashboard.refresh_interval = Duration::from_secs(self.dashboard.refresh_interval);
        dashboard.auto_refresh = self.dashboard.auto_refresh;
        dashboard.page_size = self.dashboard.page_size;
        dashboard.block_duration = parse_block_policy(&self.dashboard.block_duration)?;
        dashboard
            .validate()
            .map_err(|e| invalid("dashboard", e.to_string()))?;
        Ok(dashboard)
    }
}

fn parse_url(raw: &str) -> Result<url::Url, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|e| invalid("server.url", format!("invalid URL '{raw}': {e}")))
}

fn parse_block_policy(raw: &str) -> Result<BlockDurationPolicy, ConfigError> {
    raw.parse()
        .map_err(|e: guardian_core::CoreError| invalid("dashboard.block_duration", e.to_string()))
}
