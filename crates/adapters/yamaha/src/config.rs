//! Per-receiver configuration.

use serde::Deserialize;

/// Connection settings for one receiver.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiverConfig {
    /// Hostname or IP address, optionally with `:port`. Required.
    pub host: String,
}
