//! Attribute kinds: the closed set of receiver properties an item can bind to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// A controllable/observable receiver property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeKind {
    Power,
    VolumePercent,
    VolumeDb,
    Mute,
    Input,
    SurroundProgram,
}

impl AttributeKind {
    /// Every kind, in publication order.
    pub const ALL: [Self; 6] = [
        Self::Power,
        Self::Mute,
        Self::Input,
        Self::SurroundProgram,
        Self::VolumePercent,
        Self::VolumeDb,
    ];

    /// Name used in binding declarations.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::VolumePercent => "volumePercent",
            Self::VolumeDb => "volumeDb",
            Self::Mute => "mute",
            Self::Input => "input",
            Self::SurroundProgram => "surroundProgram",
        }
    }

    /// Whether a write to this kind changes both volume representations.
    #[must_use]
    pub fn is_volume(self) -> bool {
        matches!(self, Self::VolumePercent | Self::VolumeDb)
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigurationError::InvalidAttributeKind(s.to_string()))
    }
}
