//! Shared configuration for the scadapoll CLI.
//!
//! TOML profiles with environment overrides, and translation to
//! `scadapoll_core::ClientConfig`. The CLI layers its own flags on top
//! via [`Profile::merged`].

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

use scadapoll_core::{ClientConfig, DEFAULT_BASE_URL, TlsVerification, resolve_selector};

/// Prefix for environment overrides; nested keys use `__`, e.g.
/// `SCADAPOLL_DEFAULTS__TIMEOUT=10`.
pub const ENV_PREFIX: &str = "SCADAPOLL_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
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
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named endpoint profiles.
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

impl Config {
    /// Look up a profile.
    ///
    /// An explicitly named profile must exist. Without a name the
    /// `default_profile` is used if present, otherwise an empty profile
    /// (everything then comes from defaults and flags).
    pub fn profile(&self, name: Option<&str>) -> Result<Profile, ConfigError> {
        if let Some(name) = name {
            return self
                .profiles
                .get(name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() });
        }
        Ok(self
            .default_profile
            .as_deref()
            .and_then(|n| self.profiles.get(n))
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            interval_ms: default_interval_ms(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_interval_ms() -> u64 {
    5000
}
fn default_timeout() -> u64 {
    30
}

/// A named endpoint profile. Unset fields fall back to [`Defaults`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Endpoint base URL (e.g., "http://localhost:8081/compactscada").
    pub url: Option<String>,

    /// Server-side item name pattern. Exclusive with `items`.
    pub pattern: Option<String>,

    /// Explicit item names. Exclusive with `pattern`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,

    /// Poll interval in milliseconds; 0 polls once.
    pub interval_ms: Option<u64>,

    /// Log traffic at info level.
    pub debug: Option<bool>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Accept invalid TLS certificates.
    pub insecure: Option<bool>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,
}

impl Profile {
    /// Layer `overrides` on top of `self`: every field set there wins.
    /// A selector in `overrides` replaces both selector fields.
    pub fn merged(self, overrides: Profile) -> Profile {
        let selector_overridden = overrides.pattern.is_some() || !overrides.items.is_empty();
        let (pattern, items) = if selector_overridden {
            (overrides.pattern, overrides.items)
        } else {
            (self.pattern, self.items)
        };
        Profile {
            url: overrides.url.or(self.url),
            pattern,
            items,
            interval_ms: overrides.interval_ms.or(self.interval_ms),
            debug: overrides.debug.or(self.debug),
            timeout: overrides.timeout.or(self.timeout),
            insecure: overrides.insecure.or(self.insecure),
            ca_cert: overrides.ca_cert.or(self.ca_cert),
        }
    }

    /// Build a `ClientConfig`, filling gaps from `defaults`.
    pub fn to_client_config(&self, defaults: &Defaults) -> Result<ClientConfig, ConfigError> {
        let selector =
            resolve_selector(self.pattern.clone(), self.items.clone()).map_err(|e| {
                ConfigError::Validation {
                    field: "selector".into(),
                    reason: e.to_string(),
                }
            })?;

        let url = self.url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let config = ClientConfig::new(selector)
            .with_base_url(url)
            .map_err(|e| ConfigError::Validation {
                field: "url".into(),
                reason: e.to_string(),
            })?;

        let tls = if self.insecure.unwrap_or(defaults.insecure) {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        Ok(config
            .with_interval(Duration::from_millis(
                self.interval_ms.unwrap_or(defaults.interval_ms),
            ))
            .with_timeout(Duration::from_secs(self.timeout.unwrap_or(defaults.timeout)))
            .with_debug(self.debug.unwrap_or(false))
            .with_tls(tls))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "scadapoll", "scadapoll").map_or_else(
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
    p.push("scadapoll");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is not an
/// error; built-in defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
