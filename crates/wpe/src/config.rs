//! CLI configuration: a thin wrapper around `wpe_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--user, --password, --api-url, ...).

use std::time::Duration;

use clap::ValueEnum;

use wpe_api::ClientConfig;
use wpe_config::{PASSWORD_ENV, USER_ENV};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use wpe_config::{Config, Profile, config_path, load_config_or_default, save_config};

/// Everything a command needs once flags, env and config are merged.
#[derive(Debug)]
pub struct Resolved {
    pub client: ClientConfig,
    pub output: OutputFormat,
    pub notification_email: Option<String>,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Output format: flag > config default > table.
pub fn resolve_output(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&config.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

/// Merge config file, active profile and global flags into a [`Resolved`].
///
/// A missing profile is only an error when one was explicitly requested
/// with `--profile`; otherwise credentials come from flags / env alone.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, config);
    let profile = config.profiles.get(&profile_name);

    if profile.is_none() && global.profile.is_some() {
        let mut names: Vec<_> = config.profiles.keys().cloned().collect();
        names.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if names.is_empty() {
                "(none)".into()
            } else {
                names.join(", ")
            },
        });
    }

    // Flags (and their env vars, already read by clap) override the profile.
    let mut effective = profile.cloned().unwrap_or_default();
    if let Some(ref user) = global.user {
        effective.username = Some(user.clone());
    }
    if global.password.is_some() {
        effective.password_env = None;
    }
    if let Some(ref url) = global.api_url {
        effective.api_url = Some(url.clone());
    }

    let credentials = wpe_config::resolve_credentials_with(
        Some(&effective),
        &profile_name,
        |key| match key {
            USER_ENV => global.user.clone(),
            PASSWORD_ENV => global.password.clone(),
            other => std::env::var(other).ok(),
        },
        wpe_config::keyring_password,
    )?;

    let mut client = wpe_config::client_config(Some(&effective), &config.defaults, credentials)?;
    if let Some(secs) = global.timeout {
        client.transport.timeout = Duration::from_secs(secs);
    }

    Ok(Resolved {
        client,
        output: resolve_output(global, config),
        notification_email: wpe_config::notification_email(Some(&effective), &config.defaults),
    })
}
