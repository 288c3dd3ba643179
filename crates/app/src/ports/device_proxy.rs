//! Device proxy port: one request/response exchange per call against a receiver.
//!
//! A proxy keeps no state between calls: every method is a fresh exchange.
//! Writes are fire-and-forget; a caller wanting confirmation issues a
//! follow-up [`get_state`](DeviceProxy::get_state).
//!
//! Proxies are not safe for concurrent use. The
//! [`DeviceRegistry`](crate::registry::DeviceRegistry) serialises access per
//! device.

use std::future::Future;

use avsync_domain::error::CommunicationError;
use avsync_domain::state::DeviceState;

/// Stateless adapter for a single receiver.
pub trait DeviceProxy: Send + Sync {
    /// Network address of the receiver, for diagnostics.
    fn address(&self) -> &str;

    /// Fetch a fresh state snapshot.
    fn get_state(&self) -> impl Future<Output = Result<DeviceState, CommunicationError>> + Send;

    /// Switch the receiver on or to standby.
    fn set_power(&self, on: bool) -> impl Future<Output = Result<(), CommunicationError>> + Send;

    /// Mute or unmute.
    fn set_mute(&self, mute: bool) -> impl Future<Output = Result<(), CommunicationError>> + Send;

    /// Set the absolute volume in decibels.
    fn set_volume_db(&self, db: f64) -> impl Future<Output = Result<(), CommunicationError>> + Send;

    /// Select an input by name. Unknown names are left for the receiver to reject.
    fn set_input(&self, name: &str) -> impl Future<Output = Result<(), CommunicationError>> + Send;

    /// Select a surround program by name.
    fn set_surround_program(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<(), CommunicationError>> + Send;
}
