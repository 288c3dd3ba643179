//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `avsync.toml` in the working directory (or the path in
//! `AVSYNC_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.
//!
//! A single receiver can be given as a top-level `host`; it is registered
//! under the `default` device identifier. Several receivers are listed as
//! `[devices.<id>]` tables.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use avsync_adapter_yamaha::ReceiverConfig;
use avsync_domain::binding::ItemBinding;
use avsync_domain::error::ConfigurationError;
use avsync_domain::id::{DeviceId, ItemId};

const DEFAULT_PATH: &str = "avsync.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host of the receiver registered as the `default` device.
    pub host: Option<String>,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Poll and request timing.
    pub sync: SyncConfig,
    /// Receivers keyed by device identifier.
    pub devices: BTreeMap<String, ReceiverConfig>,
    /// Item bindings in `key=value, ...` form, keyed by item name.
    pub items: BTreeMap<String, String>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Poll cycle timing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Delay between poll cycles, in milliseconds.
    pub refresh_ms: u64,
    /// Upper bound for one receiver exchange, in milliseconds.
    pub request_timeout_ms: u64,
}

impl SyncConfig {
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Config {
    /// Load configuration from `avsync.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration does not validate.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("AVSYNC_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("AVSYNC_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("AVSYNC_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(refresh) = var("AVSYNC_REFRESH_MS").and_then(|val| val.parse().ok()) {
            self.sync.refresh_ms = refresh;
        }
        if let Some(val) = var("AVSYNC_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.sync.refresh_ms == 0 {
            return Err(ConfigError::Validation(
                "refresh_ms must be non-zero".to_string(),
            ));
        }
        if self.sync.request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_ms must be non-zero".to_string(),
            ));
        }
        if self.host.is_some() && self.devices.contains_key(DeviceId::DEFAULT) {
            return Err(ConfigError::Validation(format!(
                "device '{}' is configured by both `host` and `[devices.{}]`",
                DeviceId::DEFAULT,
                DeviceId::DEFAULT
            )));
        }
        if let Some((id, _)) = self
            .receivers()
            .into_iter()
            .find(|(_, receiver)| receiver.host.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "device '{id}' has an empty host"
            )));
        }
        self.bindings()?;
        Ok(())
    }

    /// Every configured receiver with its device identifier, in identifier order.
    #[must_use]
    pub fn receivers(&self) -> Vec<(DeviceId, ReceiverConfig)> {
        let single = self.host.iter().map(|host| {
            (
                DeviceId::default(),
                ReceiverConfig { host: host.clone() },
            )
        });
        let named = self
            .devices
            .iter()
            .map(|(id, receiver)| (DeviceId::new(id.as_str()), receiver.clone()));
        let mut receivers: Vec<_> = single.chain(named).collect();
        receivers.sort_by(|a, b| a.0.cmp(&b.0));
        receivers
    }

    /// Parse every `[items]` entry into an [`ItemBinding`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Binding`] for the first declaration that does
    /// not parse.
    pub fn bindings(&self) -> Result<Vec<ItemBinding>, ConfigError> {
        self.items
            .iter()
            .map(|(item, declaration)| {
                ItemBinding::parse(ItemId::new(item.as_str()), declaration).map_err(|source| {
                    ConfigError::Binding {
                        item: item.clone(),
                        source,
                    }
                })
            })
            .collect()
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8085,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "avsyncd=info,avsync_app=info,avsync_adapter_yamaha=info,tower_http=debug"
                .to_string(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh_ms: 60_000,
            request_timeout_ms: 5_000,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// An item binding declaration is invalid.
    #[error("invalid binding for item '{item}'")]
    Binding {
        item: String,
        #[source]
        source: ConfigurationError,
    },
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
