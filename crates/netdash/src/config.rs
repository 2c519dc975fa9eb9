//! CLI-aware configuration: resolves the active profile, applies
//! `GlobalOpts` overrides, and builds the `InventoryConfig` the core needs.

use netdash_config::{Config, Profile};
use netdash_core::InventoryConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use netdash_config::{config_path, load_config_or_default, save_config};

/// Build an `InventoryConfig` from the config file, profile, and CLI flags.
///
/// `--backend` alone is enough; otherwise the active profile must exist.
pub fn build_inventory_config(global: &GlobalOpts, cfg: &Config) -> Result<InventoryConfig, CliError> {
    let profile_name = cfg.active_profile_name(global.profile.as_deref());

    let mut profile: Profile = if let Some(profile) = cfg.profiles.get(&profile_name) {
        profile.clone()
    } else if let Some(ref url) = global.backend {
        Profile::new(url.clone(), "snake")
    } else if global.profile.is_some() {
        cfg.profile(&profile_name)?.clone()
    } else {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    };

    if let Some(ref url) = global.backend {
        profile.backend_url.clone_from(url);
    }
    if let Some(ref convention) = global.convention {
        profile.convention.clone_from(convention);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }

    tracing::debug!(profile = %profile_name, url = %profile.backend_url, "resolved backend profile");
    Ok(netdash_config::profile_to_inventory_config(
        &profile,
        cfg.defaults.timeout,
    )?)
}
