//! Shared configuration for the netdash tools.
//!
//! TOML profiles, one per inventory backend, and their translation into
//! `netdash_core::InventoryConfig`. The core never reads config files; the
//! CLI loads a profile here and hands the result in.

use std::collections::BTreeMap;
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

use netdash_api::{BackendConvention, TlsMode};
use netdash_core::InventoryConfig;

const ENV_PREFIX: &str = "NETDASH_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: Vec<String> },

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
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, listing the known names on failure.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profiles.keys().cloned().collect(),
            })
    }

    /// `explicit` if given, else `default_profile`, else `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout (seconds) for profiles that don't set one.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
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
fn default_timeout() -> u64 {
    30
}

/// A named inventory backend.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Service root, e.g. "http://127.0.0.1:8000/api".
    pub backend_url: String,

    /// "snake" (trailing-slash routes) or "camel" (bare routes).
    #[serde(default = "default_convention")]
    pub convention: String,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Background refresh interval in seconds; 0 disables it.
    #[serde(default)]
    pub refresh_interval_secs: u64,

    /// Foreground refresh deadline in seconds.
    pub fetch_deadline_secs: Option<u64>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept self-signed certificates.
    pub insecure: Option<bool>,
}

fn default_convention() -> String {
    "snake".into()
}

impl Profile {
    pub fn new(backend_url: impl Into<String>, convention: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            convention: convention.into(),
            timeout: None,
            refresh_interval_secs: 0,
            fetch_deadline_secs: None,
            ca_cert: None,
            insecure: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "netdash", "netdash").map_or_else(
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
    p.push("netdash");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then the TOML file at `path` (if present), then `NETDASH_*`
/// variables (`NETDASH_DEFAULTS_TIMEOUT=5`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical config path.
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

// ── Translation ─────────────────────────────────────────────────────

/// Build an `InventoryConfig` from a profile.
///
/// `default_timeout` applies when the profile sets none.
pub fn profile_to_inventory_config(
    profile: &Profile,
    default_timeout: u64,
) -> Result<InventoryConfig, ConfigError> {
    let base_url: url::Url = profile
        .backend_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "backend_url".into(),
            reason: format!("invalid URL: {}", profile.backend_url),
        })?;

    let convention: BackendConvention =
        profile
            .convention
            .parse()
            .map_err(|reason| ConfigError::Validation {
                field: "convention".into(),
                reason,
            })?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let mut config = InventoryConfig::new(base_url, convention);
    config.tls = tls;
    config.request_timeout = Some(Duration::from_secs(profile.timeout.unwrap_or(default_timeout)));
    config.refresh_interval_secs = profile.refresh_interval_secs;
    config.fetch_deadline = profile.fetch_deadline_secs.map(Duration::from_secs);
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        let mut lab = Profile::new("http://10.0.0.5:8000/api", "camel");
        lab.refresh_interval_secs = 30;
        cfg.profiles.insert("lab".into(), lab);
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_profile = "lab"

                [defaults]
                timeout = 10

                [profiles.lab]
                backend_url = "http://lab:8000"
                "#,
            )?;
            jail.set_env("NETDASH_DEFAULTS_TIMEOUT", "5");

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.defaults.timeout, 5);
            assert_eq!(cfg.profile("lab").unwrap().convention, "snake");
            Ok(())
        });
    }

    #[test]
    fn active_profile_resolution() {
        let cfg = Config {
            default_profile: Some("prod".into()),
            ..Config::default()
        };
        assert_eq!(cfg.active_profile_name(Some("lab")), "lab");
        assert_eq!(cfg.active_profile_name(None), "prod");
    }

    #[test]
    fn unknown_profile_lists_alternatives() {
        let mut cfg = Config::default();
        cfg.profiles
            .insert("lab".into(), Profile::new("http://lab", "snake"));
        match cfg.profile("prod") {
            Err(ConfigError::ProfileNotFound { available, .. }) => {
                assert_eq!(available, vec!["lab".to_owned()]);
            }
            other => panic!("expected ProfileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn profile_translates_to_inventory_config() {
        let mut profile = Profile::new("http://127.0.0.1:8000/api", "camel");
        profile.fetch_deadline_secs = Some(15);
        profile.insecure = Some(true);

        let config = profile_to_inventory_config(&profile, 30).unwrap();

        assert_eq!(config.convention, BackendConvention::CAMEL_BARE);
        assert_eq!(config.tls, TlsMode::DangerAcceptInvalid);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.fetch_deadline, Some(Duration::from_secs(15)));
        assert_eq!(config.base_url.path(), "/api");
    }

    #[test]
    fn bad_profile_values_are_rejected() {
        let bad_url = Profile::new("not a url", "snake");
        let bad_convention = Profile::new("http://lab", "kebab");

        assert!(matches!(
            profile_to_inventory_config(&bad_url, 30),
            Err(ConfigError::Validation { ref field, .. }) if field == "backend_url"
        ));
        assert!(matches!(
            profile_to_inventory_config(&bad_convention, 30),
            Err(ConfigError::Validation { ref field, .. }) if field == "convention"
        ));
    }
}
