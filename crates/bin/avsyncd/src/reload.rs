//! Applying a configuration to a running engine.
//!
//! Used once at startup and again on every reload. Receiver proxies are
//! re-registered and the item bindings replaced as a whole; cycles already
//! running finish against what they started with. Timing and logging
//! settings are read at startup only.

use std::sync::Arc;

use avsync_adapter_yamaha::{YamahaError, YamahaProxy};
use avsync_app::binding_store::InMemoryBindingStore;
use avsync_app::engine::SyncEngine;
use avsync_app::ports::EventSink;
use avsync_domain::id::DeviceId;

use crate::config::{Config, ConfigError};

/// The engine as wired by the daemon.
pub type Engine<S> = SyncEngine<YamahaProxy, Arc<InMemoryBindingStore>, S>;

/// A configuration could not be applied.
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot build receiver client for device '{device}'")]
    Receiver {
        device: DeviceId,
        #[source]
        source: YamahaError,
    },
}

/// Register every receiver and replace the item bindings from `config`.
///
/// Nothing is changed when a receiver client cannot be built or a binding
/// does not parse. Devices missing from `config` keep their current proxy.
///
/// # Errors
///
/// Returns [`ReloadError`] describing the first problem found.
pub fn apply<S: EventSink>(engine: &Engine<S>, config: &Config) -> Result<(), ReloadError> {
    let timeout = config.sync.request_timeout();
    let proxies = config
        .receivers()
        .into_iter()
        .map(|(device, receiver)| match YamahaProxy::from_config(&receiver, timeout) {
            Ok(proxy) => Ok((device, proxy)),
            Err(source) => Err(ReloadError::Receiver { device, source }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let bindings = config.bindings()?;

    for binding in &bindings {
        if !proxies.iter().any(|(device, _)| device == &binding.device_id) {
            tracing::warn!(
                item = %binding.item_id,
                device = %binding.device_id,
                "item bound to a device that is not configured"
            );
        }
    }
    for handle in engine.registry().snapshot() {
        if !proxies.iter().any(|(device, _)| device == handle.id()) {
            tracing::warn!(device = %handle.id(), "device no longer configured, keeping its proxy");
        }
    }

    for (device, proxy) in proxies {
        tracing::info!(%device, host = proxy.host(), "receiver configured");
        engine.registry().register(device, proxy);
    }
    engine.bindings().replace_all(bindings);
    Ok(())
}
