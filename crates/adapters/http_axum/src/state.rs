//! Shared application state for axum handlers.

use std::sync::Arc;

use avsync_app::engine::SyncEngine;
use avsync_app::ports::{BindingStore, DeviceProxy, EventSink};

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the engine's type parameters do not
/// need to be `Clone`: only the `Arc` is cloned.
pub struct AppState<P, B, S> {
    /// Engine running command and poll cycles.
    pub engine: Arc<SyncEngine<P, B, S>>,
}

impl<P, B, S> Clone for AppState<P, B, S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<P, B, S> AppState<P, B, S>
where
    P: DeviceProxy + 'static,
    B: BindingStore + 'static,
    S: EventSink + 'static,
{
    /// Create the state around an engine that is also shared with the poller.
    pub fn new(engine: Arc<SyncEngine<P, B, S>>) -> Self {
        Self { engine }
    }
}
