//! CLI configuration -- thin wrapper around `scadapoll_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--url, --pattern, --item, ...).

use scadapoll_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use scadapoll_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Profile fields set on the command line.
fn flag_overrides(global: &GlobalOpts) -> Profile {
    Profile {
        url: global.url.clone(),
        pattern: global.pattern.clone(),
        items: global.item.clone(),
        interval_ms: global.interval,
        debug: global.debug.then_some(true),
        timeout: global.timeout,
        insecure: global.insecure.then_some(true),
        ca_cert: None,
    }
}

/// Build the `ClientConfig` from config file, profile and CLI overrides.
///
/// Flags win over the profile, the profile wins over `[defaults]`.
/// `fallback_items` selects items when neither flags nor profile do.
pub fn build_client_config(
    global: &GlobalOpts,
    fallback_items: Vec<String>,
) -> Result<ClientConfig, CliError> {
    let cfg = load_config()?;
    let profile = cfg.profile(global.profile.as_deref())?;
    let mut merged = profile.merged(flag_overrides(global));
    if merged.pattern.is_none() && merged.items.is_empty() {
        merged.items = fallback_items;
    }
    Ok(merged.to_client_config(&cfg.defaults)?)
}
