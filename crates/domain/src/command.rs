//! Inbound command payloads.
//!
//! A payload's shape is decided once, at the command boundary. The engine
//! then matches on it per [`AttributeKind`](crate::attribute::AttributeKind).

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::volume::VOLUME_STEP_DB;

/// Direction of a relative volume adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDirection {
    Increase,
    Decrease,
}

impl StepDirection {
    /// Signed decibel adjustment for one step.
    #[must_use]
    pub fn delta_db(self) -> f64 {
        match self {
            Self::Increase => VOLUME_STEP_DB,
            Self::Decrease => -VOLUME_STEP_DB,
        }
    }
}

/// The shape of an inbound command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CommandPayload {
    /// On/off.
    Boolean(bool),
    /// Increase or decrease by one step.
    RelativeStep(StepDirection),
    /// Absolute percent, `0..=100`.
    Percent(u8),
    /// Anything else, as text.
    Literal(String),
}

impl FromStr for CommandPayload {
    type Err = Infallible;

    /// Classify a textual command.
    ///
    /// `ON`/`OFF` are booleans, `INCREASE`/`UP` and `DECREASE`/`DOWN` are
    /// steps, `<n>%` with `n <= 100` is a percent. Everything else is kept
    /// verbatim as a literal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let payload = match trimmed.to_ascii_uppercase().as_str() {
            "ON" => Self::Boolean(true),
            "OFF" => Self::Boolean(false),
            "INCREASE" | "UP" => Self::RelativeStep(StepDirection::Increase),
            "DECREASE" | "DOWN" => Self::RelativeStep(StepDirection::Decrease),
            _ => trimmed
                .strip_suffix('%')
                .and_then(|n| n.trim().parse::<u8>().ok())
                .filter(|n| *n <= 100)
                .map_or_else(|| Self::Literal(s.to_string()), Self::Percent),
        };
        Ok(payload)
    }
}

impl fmt::Display for CommandPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(true) => f.write_str("ON"),
            Self::Boolean(false) => f.write_str("OFF"),
            Self::RelativeStep(StepDirection::Increase) => f.write_str("INCREASE"),
            Self::RelativeStep(StepDirection::Decrease) => f.write_str("DECREASE"),
            Self::Percent(percent) => write!(f, "{percent}%"),
            Self::Literal(text) => f.write_str(text),
        }
    }
}

/// Strip one pair of surrounding double quotes, after trimming whitespace.
///
/// Configuration tooling may quote free text such as input names.
#[must_use]
pub fn unquote(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> CommandPayload {
        text.parse().unwrap()
    }

    #[test]
    fn should_parse_on_off_case_insensitively() {
        assert_eq!(parse("ON"), CommandPayload::Boolean(true));
        assert_eq!(parse(" off "), CommandPayload::Boolean(false));
    }

    #[test]
    fn should_parse_step_aliases() {
        assert_eq!(
            parse("UP"),
            CommandPayload::RelativeStep(StepDirection::Increase)
        );
        assert_eq!(
            parse("decrease"),
            CommandPayload::RelativeStep(StepDirection::Decrease)
        );
    }

    #[test]
    fn should_parse_percent_suffix() {
        assert_eq!(parse("50%"), CommandPayload::Percent(50));
        assert_eq!(parse("100 %"), CommandPayload::Percent(100));
    }

    #[test]
    fn should_keep_out_of_range_percent_as_literal() {
        assert_eq!(parse("150%"), CommandPayload::Literal("150%".into()));
    }

    #[test]
    fn should_keep_other_text_as_literal() {
        assert_eq!(parse("-32.5"), CommandPayload::Literal("-32.5".into()));
        assert_eq!(parse("\"AV4\""), CommandPayload::Literal("\"AV4\"".into()));
    }

    #[test]
    fn should_step_by_half_a_decibel() {
        assert!((StepDirection::Increase.delta_db() - 0.5).abs() < f64::EPSILON);
        assert!((StepDirection::Decrease.delta_db() + 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_deserialize_tagged_json() {
        let payload: CommandPayload =
            serde_json::from_str(r#"{"type": "relative_step", "value": "increase"}"#).unwrap();
        assert_eq!(
            payload,
            CommandPayload::RelativeStep(StepDirection::Increase)
        );

        let payload: CommandPayload =
            serde_json::from_str(r#"{"type": "percent", "value": 50}"#).unwrap();
        assert_eq!(payload, CommandPayload::Percent(50));
    }

    #[test]
    fn should_strip_surrounding_quotes() {
        assert_eq!(unquote("\"HDMI1\""), "HDMI1");
        assert_eq!(unquote("  \"Sci-Fi\"  "), "Sci-Fi");
    }

    #[test]
    fn should_leave_unquoted_text_alone() {
        assert_eq!(unquote("HDMI1"), "HDMI1");
        assert_eq!(unquote("\"half"), "\"half");
        assert_eq!(unquote("\""), "\"");
    }
}
