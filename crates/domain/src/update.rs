//! Outbound state updates published to the event sink.

use std::fmt;

use serde::Serialize;

use crate::attribute::AttributeKind;
use crate::id::ItemId;

/// A typed value published for a bound item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UpdateValue {
    /// Power and mute.
    OnOff(bool),
    /// Input and surround program, wrapped in double quotes.
    Text(String),
    /// Volume in decibels.
    Decimal(f64),
    /// Volume in percent, `0..=100`.
    Percent(u8),
}

impl UpdateValue {
    /// Wrap free text in the quote delimiters expected downstream.
    #[must_use]
    pub fn quoted(text: &str) -> Self {
        Self::Text(format!("\"{text}\""))
    }
}

impl fmt::Display for UpdateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnOff(true) => f.write_str("ON"),
            Self::OnOff(false) => f.write_str("OFF"),
            Self::Text(text) => f.write_str(text),
            Self::Decimal(db) => write!(f, "{db}"),
            Self::Percent(percent) => write!(f, "{percent}"),
        }
    }
}

/// One `publish(item, kind, value)` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateUpdate {
    pub item_id: ItemId,
    pub kind: AttributeKind,
    pub value: UpdateValue,
}

impl StateUpdate {
    #[must_use]
    pub fn new(item_id: ItemId, kind: AttributeKind, value: UpdateValue) -> Self {
        Self {
            item_id,
            kind,
            value,
        }
    }
}
