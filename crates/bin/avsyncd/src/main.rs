//! # avsyncd: receiver sync daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and install logging
//! - Construct one receiver proxy per configured device
//! - Parse item bindings and build the sync engine around the event bus
//! - Start the poller and the HTTP command API
//! - Reload devices and bindings on `SIGHUP`
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;
mod reload;

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::EnvFilter;

use avsync_adapter_http_axum::router;
use avsync_adapter_http_axum::state::AppState;
use avsync_adapter_yamaha::YamahaProxy;
use avsync_app::binding_store::InMemoryBindingStore;
use avsync_app::engine::SyncEngine;
use avsync_app::event_bus::InProcessEventBus;
use avsync_app::poller::Poller;
use avsync_app::registry::DeviceRegistry;
use avsync_domain::update::StateUpdate;

use crate::config::Config;
#[cfg(unix)]
use crate::reload::Engine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    tracing::info!(
        devices = config.receivers().len(),
        items = config.items.len(),
        "avsyncd starting"
    );

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(256));
    tokio::spawn(log_updates(event_bus.subscribe()));

    // Engine, receivers and bindings
    let registry = Arc::new(DeviceRegistry::new());
    let engine = Arc::new(
        SyncEngine::new(
            Arc::clone(&registry),
            Arc::new(InMemoryBindingStore::default()),
            Arc::clone(&event_bus),
        )
        .with_request_timeout(config.sync.request_timeout()),
    );
    reload::apply(&engine, &config)?;
    tokio::spawn(log_inputs(Arc::clone(&registry)));
    #[cfg(unix)]
    tokio::spawn(reload_on_hangup(Arc::clone(&engine), registry));
    let poller = Poller::spawn(Arc::clone(&engine), config.sync.refresh_interval());

    // HTTP
    let app = router::build(AppState::new(engine));
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "avsyncd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    poller.abort();
    tracing::info!("avsyncd stopped");
    Ok(())
}

/// Record every published update.
async fn log_updates(mut updates: broadcast::Receiver<StateUpdate>) {
    loop {
        match updates.recv().await {
            Ok(update) => tracing::info!(
                item = %update.item_id,
                kind = %update.kind,
                value = %update.value,
                "state update"
            ),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "update log fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Log the selectable inputs of every receiver. Failures are only logged.
async fn log_inputs(registry: Arc<DeviceRegistry<YamahaProxy>>) {
    for handle in registry.snapshot() {
        let proxy = handle.lock().await;
        match proxy.list_inputs().await {
            Ok(inputs) => {
                tracing::info!(device = %handle.id(), inputs = ?inputs, "receiver inputs");
            }
            Err(err) => {
                tracing::warn!(device = %handle.id(), host = proxy.host(), %err, "cannot list receiver inputs");
            }
        }
    }
}

/// Re-read the configuration on every `SIGHUP`. A bad file leaves the
/// current devices and bindings in place.
#[cfg(unix)]
async fn reload_on_hangup(
    engine: Arc<Engine<Arc<InProcessEventBus>>>,
    registry: Arc<DeviceRegistry<YamahaProxy>>,
) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(err) => {
            tracing::error!(%err, "cannot listen for reload signal");
            return;
        }
    };
    while hangup.recv().await.is_some() {
        tracing::info!("reload signal received");
        let result = Config::load()
            .map_err(reload::ReloadError::from)
            .and_then(|config| reload::apply(&engine, &config));
        match result {
            Ok(()) => {
                tracing::info!("configuration reloaded");
                tokio::spawn(log_inputs(Arc::clone(&registry)));
            }
            Err(err) => {
                tracing::error!(%err, "reload failed, keeping current configuration");
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
