//! # avsync-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Accept item commands (`POST /api/items/{item}` with a plain-text command,
//!   `POST /api/items/{item}/command` with a JSON payload) and run them
//!   through the [`SyncEngine`](avsync_app::engine::SyncEngine)
//! - Trigger a poll on demand (`POST /api/poll`, `POST /api/devices/{device}/poll`)
//! - Map engine errors into HTTP status codes
//!
//! ## Dependency rule
//! Depends on `avsync-app` (for the engine and port traits) and `avsync-domain`
//! (for payload and error types). Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
