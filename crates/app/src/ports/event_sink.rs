//! Event sink port: where item state updates are published.

use std::future::Future;

use avsync_domain::update::StateUpdate;

/// Receives `publish(item, kind, value)` calls.
///
/// Publishing cannot fail from the engine's point of view; a sink that
/// drops updates does so silently.
pub trait EventSink: Send + Sync {
    /// Publish one state update.
    fn publish(&self, update: StateUpdate) -> impl Future<Output = ()> + Send;
}

impl<T: EventSink> EventSink for std::sync::Arc<T> {
    fn publish(&self, update: StateUpdate) -> impl Future<Output = ()> + Send {
        (**self).publish(update)
    }
}
