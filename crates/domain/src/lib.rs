//! # avsync-domain
//!
//! Pure domain model for the avsync receiver synchronisation engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers and the error taxonomy
//! - Define **attribute kinds** (power, volume, mute, input, surround program)
//! - Define **item bindings** (item → device attribute) and parse their
//!   declaration syntax
//! - Define **device state** snapshots produced by a poll
//! - Define **command payloads** (inbound) and **state updates** (outbound)
//! - Own the decibel ↔ percent volume conversion
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod attribute;
pub mod binding;
pub mod command;
pub mod state;
pub mod update;
pub mod volume;
