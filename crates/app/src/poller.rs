//! Periodic driver for the poll cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::engine::SyncEngine;
use crate::ports::{BindingStore, DeviceProxy, EventSink};

/// Runs [`SyncEngine::poll_cycle`] on a fixed period.
///
/// The first cycle runs immediately. A cycle that overruns the period delays
/// the next one; cycles never overlap.
pub struct Poller;

impl Poller {
    /// Spawn the polling task. Abort the returned handle to stop it.
    pub fn spawn<P, B, S>(engine: Arc<SyncEngine<P, B, S>>, period: Duration) -> JoinHandle<()>
    where
        P: DeviceProxy + 'static,
        B: BindingStore + 'static,
        S: EventSink + 'static,
    {
        tracing::info!(period_ms = period.as_millis(), "starting poller");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let report = engine.poll_cycle().await;
                if report.failed.is_empty() {
                    tracing::debug!(devices = report.succeeded.len(), "poll cycle complete");
                } else {
                    tracing::info!(
                        succeeded = report.succeeded.len(),
                        failed = report.failed.len(),
                        "poll cycle complete with failures"
                    );
                }
            }
        })
    }
}
