//! On-disk configuration for the ghwatch dashboard.
//!
//! TOML profiles merged with `GHWATCH_` environment overrides, and
//! translation into `ghwatch_core::DashboardConfig`. The binary layers
//! its command-line flags on top of the result.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ghwatch_core::{CycleOrdering, DashboardConfig, Language, RefreshInterval, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown profile '{name}'")]
    UnknownProfile { name: String },

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

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    /// Values applied to every profile that does not override them.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Refresh period in milliseconds; `0` disables automatic refresh.
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,

    /// Locale code: "en" or "ru".
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub insecure: bool,

    /// "latest-dispatched" or "last-completed".
    #[serde(default = "default_cycle_ordering")]
    pub cycle_ordering: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            refresh_ms: default_refresh_ms(),
            language: default_language(),
            insecure: false,
            cycle_ordering: default_cycle_ordering(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}
fn default_refresh_ms() -> u64 {
    RefreshInterval::default().as_millis()
}
fn default_language() -> String {
    Language::default().code().into()
}
fn default_cycle_ordering() -> String {
    CycleOrdering::default().to_string()
}

/// A named backend profile. Unset fields fall back to [`Defaults`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "http://127.0.0.1:8080").
    pub url: String,

    pub timeout: Option<u64>,

    pub refresh_ms: Option<u64>,

    pub language: Option<String>,

    /// Accept invalid TLS certificates.
    pub insecure: Option<bool>,

    pub cycle_ordering: Option<String>,
}

impl Config {
    /// Look up a profile by name, or the default profile when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "ghwatch", "ghwatch").map_or_else(
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
    p.push("ghwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults and environment still apply.
/// Nested keys use a double underscore, e.g. `GHWATCH_DEFAULTS__REFRESH_MS`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GHWATCH_").split("__"));

    let config: Config = figment.extract()?;
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

// ── Translation to runtime config ───────────────────────────────────

/// Parse a refresh period, rejecting values outside the selector's list.
pub fn parse_refresh(millis: u64) -> Result<RefreshInterval, ConfigError> {
    RefreshInterval::from_millis(millis).map_err(|e| ConfigError::Validation {
        field: "refresh_ms".into(),
        reason: e.to_string(),
    })
}

pub fn parse_language(code: &str) -> Result<Language, ConfigError> {
    Language::from_code(&code.to_lowercase()).ok_or_else(|| ConfigError::Validation {
        field: "language".into(),
        reason: format!("expected 'en' or 'ru', got '{code}'"),
    })
}

pub fn parse_cycle_ordering(value: &str) -> Result<CycleOrdering, ConfigError> {
    value.parse().map_err(|_| ConfigError::Validation {
        field: "cycle_ordering".into(),
        reason: format!("expected 'latest-dispatched' or 'last-completed', got '{value}'"),
    })
}

pub fn parse_url(value: &str) -> Result<url::Url, ConfigError> {
    value.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {value}"),
    })
}

/// Build a `DashboardConfig` from a profile and the global defaults.
pub fn profile_to_dashboard_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<DashboardConfig, ConfigError> {
    let base_url = parse_url(&profile.url)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(DashboardConfig {
        base_url,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        refresh_interval: parse_refresh(profile.refresh_ms.unwrap_or(defaults.refresh_ms))?,
        language: parse_language(profile.language.as_deref().unwrap_or(&defaults.language))?,
        cycle_ordering: parse_cycle_ordering(
            profile
                .cycle_ordering
                .as_deref()
                .unwrap_or(&defaults.cycle_ordering),
        )?,
    })
}
