//! CLI configuration: thin wrapper around `nimbus_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--url,
//! --session, --organization, ...).

use std::time::Duration;

use secrecy::SecretString;

use nimbus_core::{ConsoleConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use nimbus_config::{
    Config, Profile, config_path, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for error help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Build a `ConsoleConfig` from the config file, the active profile and the
/// global flags. Flags take priority over profile values.
pub fn build_console_config(global: &GlobalOpts) -> Result<ConsoleConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut config = match cfg.profiles.get(&profile_name) {
        Some(profile) => {
            let mut profile = profile.clone();
            if let Some(ref url) = global.url {
                profile.url.clone_from(url);
            }
            nimbus_config::profile_to_console_config(&profile, &profile_name, &cfg.defaults)?
        }
        None => {
            if global.profile.is_some() {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available_profiles(&cfg),
                });
            }
            let url = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            let mut config = ConsoleConfig::new(nimbus_config::parse_url(url)?);
            config.timeout = Duration::from_secs(cfg.defaults.timeout);
            config.page_count = cfg.defaults.page_count;
            config
        }
    };

    if let Some(ref session) = global.session {
        config.session_cookie = Some(SecretString::from(session.clone()));
    }
    if config.session_cookie.is_none() {
        return Err(CliError::NoSession {
            profile: profile_name,
        });
    }

    if global.organization.is_some() {
        config.organization.clone_from(&global.organization);
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(timeout) = global.timeout {
        config.timeout = Duration::from_secs(timeout);
    }

    Ok(config)
}
