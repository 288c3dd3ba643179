//! # avsync-app
//!
//! Application layer: the sync engine and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceProxy`: one request/response exchange per call against a receiver
//!   - `EventSink`: receives published item state updates
//!   - `BindingStore`: forward (item → binding) and reverse (device → bindings) lookup
//! - Own the **device registry**: one live proxy per device identifier
//! - Run the **poll cycle** and the **command cycle** (`SyncEngine`)
//! - Drive the poll cycle periodically (`Poller`)
//! - Provide **in-process infrastructure** (event bus, binding store) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `avsync-domain` only (plus `tokio` for locks, timers and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod binding_store;
pub mod engine;
pub mod event_bus;
pub mod poller;
pub mod ports;
pub mod registry;
