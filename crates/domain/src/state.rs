//! Device state: an immutable snapshot produced by one successful poll.

use serde::Serialize;

use crate::attribute::AttributeKind;
use crate::update::UpdateValue;
use crate::volume;

/// What a receiver reported at one point in time.
///
/// `input` and `surround_program` are `None` when the receiver did not report
/// them; absent fields produce no update rather than a fabricated value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceState {
    pub power: bool,
    pub input: Option<String>,
    pub surround_program: Option<String>,
    volume_db: f64,
    pub mute: bool,
}

impl DeviceState {
    /// Build a snapshot. `volume_db` is clamped into the receiver range.
    #[must_use]
    pub fn new(
        power: bool,
        input: Option<String>,
        surround_program: Option<String>,
        volume_db: f64,
        mute: bool,
    ) -> Self {
        Self {
            power,
            input,
            surround_program,
            volume_db: volume::clamp_db(volume_db),
            mute,
        }
    }

    /// Current volume in decibels, within `[-80.0, 16.0]`.
    #[must_use]
    pub fn volume_db(&self) -> f64 {
        self.volume_db
    }

    /// Current volume as a rounded percent.
    #[must_use]
    pub fn volume_percent(&self) -> u8 {
        volume::percent_for_db(self.volume_db)
    }

    /// The value to publish for `kind`, or `None` when it was not reported.
    #[must_use]
    pub fn value_for(&self, kind: AttributeKind) -> Option<UpdateValue> {
        match kind {
            AttributeKind::Power => Some(UpdateValue::OnOff(self.power)),
            AttributeKind::Mute => Some(UpdateValue::OnOff(self.mute)),
            AttributeKind::Input => self.input.as_deref().map(UpdateValue::quoted),
            AttributeKind::SurroundProgram => {
                self.surround_program.as_deref().map(UpdateValue::quoted)
            }
            AttributeKind::VolumeDb => Some(UpdateValue::Decimal(self.volume_db)),
            AttributeKind::VolumePercent => Some(UpdateValue::Percent(self.volume_percent())),
        }
    }
}
