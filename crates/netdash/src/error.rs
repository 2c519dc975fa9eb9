//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use netdash_config::ConfigError;
use netdash_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const DATA: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend for {resource}")]
    #[diagnostic(
        code(netdash::connection_failed),
        help(
            "Check that the backend is running and the profile URL is right.\n\
             Try: netdash health -v"
        )
    )]
    ConnectionFailed { resource: String, message: String },

    #[error("Backend rejected the request for {resource} (HTTP {status})")]
    #[diagnostic(code(netdash::backend_error), help("Backend said: {message}"))]
    Backend {
        resource: String,
        status: u16,
        message: String,
    },

    #[error("Refresh of {resource} took longer than {waited_ms}ms")]
    #[diagnostic(
        code(netdash::timeout),
        help("Raise fetch_deadline_secs in the profile or check backend responsiveness.")
    )]
    Timeout { resource: String, waited_ms: u64 },

    // ── Data ─────────────────────────────────────────────────────────
    #[error("Backend sent unreadable {resource}: {message}")]
    #[diagnostic(
        code(netdash::decode),
        help("Is the profile's convention (snake / camel) the one this backend uses?")
    )]
    Decode { resource: String, message: String },

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(netdash::not_found),
        help("Run: netdash {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netdash::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(netdash::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: netdash config add-profile <name> --url <url>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(netdash::no_config),
        help(
            "Pass --backend <url>, set NETDASH_BACKEND, or create a profile with:\n\
             netdash config add-profile default --url <url>\n\
             Config file: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(netdash::config))]
    Config { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(netdash::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(netdash::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(netdash::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Backend { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Decode { .. } => exit_code::DATA,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Decode { resource, message } => Self::Decode { resource, message },
            CoreError::Validation { field, reason } => Self::Validation { field, reason },
            CoreError::NotFound { entity, identifier } => Self::NotFound {
                list_command: list_command_for(&entity),
                resource_type: entity,
                identifier,
            },
            CoreError::Transport {
                resource,
                status: Some(status),
                message,
            } => Self::Backend {
                resource,
                status,
                message,
            },
            CoreError::Transport {
                resource,
                status: None,
                message,
            } => Self::ConnectionFailed { resource, message },
            CoreError::Timeout { resource, waited_ms } => Self::Timeout { resource, waited_ms },
            CoreError::Config { message } => Self::Config { message },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::ProfileNotFound { name, available } => Self::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}

fn list_command_for(entity: &str) -> String {
    match entity {
        "device" | "interfaces" => "devices".into(),
        "site" => "sites".into(),
        "alert" => "alerts".into(),
        other if other.ends_with('s') => other.into(),
        other => format!("{other}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_split_on_status() {
        let refused = CliError::from(CoreError::Transport {
            resource: "devices".into(),
            status: None,
            message: "connection refused".into(),
        });
        let rejected = CliError::from(CoreError::Transport {
            resource: "devices".into(),
            status: Some(500),
            message: "boom".into(),
        });
        assert!(matches!(refused, CliError::ConnectionFailed { .. }));
        assert!(matches!(rejected, CliError::Backend { status: 500, .. }));
    }

    #[test]
    fn exit_codes() {
        let not_found = CliError::from(CoreError::NotFound {
            entity: "device".into(),
            identifier: "9".into(),
        });
        let timeout = CliError::from(CoreError::Timeout {
            resource: "devices".into(),
            waited_ms: 100,
        });
        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn not_found_points_at_list_command() {
        let err = CliError::from(CoreError::NotFound {
            entity: "site".into(),
            identifier: "4".into(),
        });
        match err {
            CliError::NotFound { list_command, .. } => assert_eq!(list_command, "sites"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
