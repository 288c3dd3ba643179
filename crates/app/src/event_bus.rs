//! In-process event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use avsync_domain::update::StateUpdate;

use crate::ports::EventSink;

/// In-process [`EventSink`] using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the update is simply dropped).
pub struct InProcessEventBus {
    sender: broadcast::Sender<StateUpdate>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to updates on this bus.
    ///
    /// Returns a receiver that will get all updates published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateUpdate> {
        self.sender.subscribe()
    }
}

impl EventSink for InProcessEventBus {
    fn publish(&self, update: StateUpdate) -> impl Future<Output = ()> + Send {
        // broadcast::send fails only when there are zero receivers.
        let _ = self.sender.send(update);
        async {}
    }
}
