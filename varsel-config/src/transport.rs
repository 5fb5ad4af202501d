//! Live transport configuration.
//!
//! Controls the optional HTTP listener that re-publishes generated
//! records to external observers. Disabling the transport must not
//! affect queue or callback behavior.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// HTTP/SSE serving parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct TransportConfig {
    /// Bind address for the API listener.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for the API listener.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether to run the listener at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Idle interval after which a stream emits a keep-alive comment
    /// instead of blocking its client indefinitely (seconds).
    #[serde(default = "default_keepalive")]
    #[validate(range(min = 1, max = 300))]
    pub keepalive_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8765
}

fn default_true() -> bool {
    true
}

fn default_keepalive() -> u64 {
    15
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enabled: default_true(),
            keepalive_secs: default_keepalive(),
        }
    }
}
