//! Shared configuration for the `wpe` tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `wpe_api::ClientConfig`. The CLI layers its flag
//! overrides on top through the injectable lookups.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use wpe_api::{ClientConfig, Credentials, DEFAULT_BASE_URL, TlsMode, TransportConfig};

/// Environment variable holding the API user id.
pub const USER_ENV: &str = "WPENGINE_USER_ID";
/// Environment variable holding the API password.
pub const PASSWORD_ENV: &str = "WPENGINE_PASSWORD";

const KEYRING_SERVICE: &str = "wpe";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error(transparent)]
    Client(#[from] wpe_api::Error),

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
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named API profiles (one per WP Engine API user).
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

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Address notified when a backup completes.
    pub notification_email: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            notification_email: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named API profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API root override (defaults to the production API).
    pub api_url: Option<String>,

    /// API user id.
    pub username: Option<String>,

    /// API password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to an extra CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override backup notification address.
    pub notification_email: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "whitefoxstudios", "wpe").map_or_else(
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
    p.push("wpe");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config from `path`, layered as defaults → TOML file → `WPE_` env.
///
/// Nested keys use a double underscore: `WPE_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WPE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load the file at `path` for editing: defaults → TOML, without the env
/// layer so overrides are never written back.
///
/// A missing file yields the defaults. A file that exists but cannot be
/// parsed is an error, so a rewrite never drops its profiles.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file yet, starting from defaults");
        return Ok(Config::default());
    }
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Keyring ─────────────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Look up a profile's password in the system keyring.
pub fn keyring_password(profile_name: &str) -> Option<String> {
    keyring_entry(profile_name)
        .and_then(|entry| entry.get_password())
        .ok()
}

/// Store a profile's password in the system keyring.
pub fn store_keyring_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Credential chain with injectable lookups.
///
/// Username: profile → `WPENGINE_USER_ID`.
/// Password: profile's `password_env` → `WPENGINE_PASSWORD` → keyring →
/// plaintext in config. Empty values count as missing.
pub fn resolve_credentials_with(
    profile: Option<&Profile>,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<Credentials, ConfigError> {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let missing = || ConfigError::NoCredentials {
        profile: profile_name.into(),
    };

    let username = non_empty(profile.and_then(|p| p.username.clone()))
        .or_else(|| non_empty(env(USER_ENV)))
        .ok_or_else(missing)?;

    let password = profile
        .and_then(|p| p.password_env.as_deref())
        .and_then(|var| non_empty(env(var)))
        .or_else(|| non_empty(env(PASSWORD_ENV)))
        .or_else(|| non_empty(keyring(profile_name)))
        .or_else(|| non_empty(profile.and_then(|p| p.password.clone())))
        .ok_or_else(missing)?;

    Ok(Credentials::new(username, SecretString::from(password))?)
}

// ── ClientConfig translation ────────────────────────────────────────

/// Assemble a `ClientConfig` around already-resolved credentials.
pub fn client_config(
    profile: Option<&Profile>,
    defaults: &Defaults,
    credentials: Credentials,
) -> Result<ClientConfig, ConfigError> {
    let raw_url = profile
        .and_then(|p| p.api_url.as_deref())
        .unwrap_or(DEFAULT_BASE_URL);
    let base_url: url::Url = raw_url.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw_url}"),
    })?;

    let tls = match profile.and_then(|p| p.ca_cert.clone()) {
        Some(path) => TlsMode::CustomCa(path),
        None => TlsMode::System,
    };
    let timeout = profile
        .and_then(|p| p.timeout)
        .unwrap_or(defaults.timeout);

    Ok(ClientConfig {
        base_url,
        credentials,
        transport: TransportConfig {
            tls,
            timeout: Duration::from_secs(timeout),
        },
    })
}

/// Backup notification address: profile override, then global default.
pub fn notification_email(profile: Option<&Profile>, defaults: &Defaults) -> Option<String> {
    profile
        .and_then(|p| p.notification_email.clone())
        .or_else(|| defaults.notification_email.clone())
}
