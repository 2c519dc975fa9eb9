// ── Runtime inventory configuration ──
//
// Describes *which* backend to talk to and how often to revalidate.
// The CLI constructs an `InventoryConfig` (usually from a config profile)
// and hands it in; the core never reads config files.

use std::time::Duration;

use netdash_api::{BackendConvention, TlsMode, TransportConfig};
use url::Url;

/// Configuration for one inventory backend.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Service root (e.g. `http://127.0.0.1:8000/api`).
    pub base_url: Url,
    /// Route suffix and field casing of the service.
    pub convention: BackendConvention,
    /// TLS verification strategy.
    pub tls: TlsMode,
    /// Per-request timeout. `None` leaves individual requests unbounded.
    pub request_timeout: Option<Duration>,
    /// Background revalidation interval (seconds). 0 = never.
    pub refresh_interval_secs: u64,
    /// Maximum wait for a foreground refresh before it is abandoned with
    /// [`CoreError::Timeout`](crate::CoreError::Timeout). `None` = wait forever.
    pub fetch_deadline: Option<Duration>,
}

impl InventoryConfig {
    pub fn new(base_url: Url, convention: BackendConvention) -> Self {
        Self {
            base_url,
            convention,
            tls: TlsMode::System,
            request_timeout: None,
            refresh_interval_secs: 0,
            fetch_deadline: None,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.request_timeout,
        }
    }
}
