//! Error taxonomy shared across the workspace.
//!
//! Exactly two kinds of failure exist:
//!
//! - [`CommunicationError`]: a device could not be reached or answered badly.
//!   Recovered per device, per cycle.
//! - [`ConfigurationError`]: an item, device, binding, or payload could not be
//!   resolved. Reported to whoever issued the request.
//!
//! [`SyncError`] is the union returned by engine entry points. Adapters keep
//! their own error enums and convert into these via `From`.

use std::time::Duration;

use crate::id::{DeviceId, ItemId};

/// Boxed transport-level cause carried by [`CommunicationError::Transport`].
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for sync and command cycles.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("device communication failed")]
    Communication(#[from] CommunicationError),

    #[error("configuration error")]
    Configuration(#[from] ConfigurationError),
}

/// A single exchange with a device failed.
#[derive(Debug, thiserror::Error)]
pub enum CommunicationError {
    /// The exchange did not complete within the request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The transport failed (connection refused, reset, HTTP error status…).
    #[error("transport failure")]
    Transport(#[source] BoxedSource),

    /// The device answered with something that could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The device understood the request but refused it.
    #[error("device rejected the request with code {code}")]
    Rejected { code: String },
}

/// An identifier, binding declaration, or command could not be resolved.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unknown item '{0}'")]
    UnknownItem(ItemId),

    #[error("unknown device '{0}'")]
    UnknownDevice(DeviceId),

    #[error("invalid binding type '{0}'")]
    InvalidAttributeKind(String),

    #[error("missing binding property '{0}'")]
    MissingProperty(&'static str),

    #[error("malformed binding declaration '{0}'")]
    MalformedBinding(String),

    #[error("payload '{payload}' is not valid for item '{item}'")]
    InvalidPayload { item: ItemId, payload: String },
}
