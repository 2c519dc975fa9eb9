// ── Core error types ──
//
// Consumers of netdash-core never match on reqwest or serde errors. The
// `From<netdash_api::Error>` impl and `CoreError::from_api` translate
// transport failures into this taxonomy. Normalization and classification
// are total and never produce an error.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Data errors ──────────────────────────────────────────────────
    #[error("Could not decode {resource}: {message}")]
    Decode { resource: String, message: String },

    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    // ── Backend errors ───────────────────────────────────────────────
    #[error("Backend request for {resource} failed{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Transport {
        resource: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Refresh of {resource} exceeded its {waited_ms}ms deadline")]
    Timeout { resource: String, waited_ms: u64 },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Translate an adapter error, naming the resource that was requested.
    pub fn from_api(resource: impl Into<String>, err: netdash_api::Error) -> Self {
        let resource = resource.into();
        match err {
            netdash_api::Error::Status { status: 404, path, .. } => CoreError::NotFound {
                entity: resource,
                identifier: path,
            },
            netdash_api::Error::Decode { message, .. } => CoreError::Decode { resource, message },
            netdash_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            netdash_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            netdash_api::Error::Status { status, body, .. } => CoreError::Transport {
                resource,
                status: Some(status),
                message: body,
            },
            netdash_api::Error::Transport(e) => CoreError::Transport {
                resource,
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
        }
    }

    /// `true` for failures a later refresh may recover from.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<netdash_api::Error> for CoreError {
    fn from(err: netdash_api::Error) -> Self {
        Self::from_api("backend", err)
    }
}
