//! Volume conversion between receiver decibels and normalised percent.
//!
//! The receiver accepts `[-80.0, 16.0]` dB. Percent maps linearly onto that
//! range. Both directions clamp out-of-range input instead of failing.

/// Quietest level the receiver accepts.
pub const VOLUME_DB_MIN: f64 = -80.0;
/// Loudest level the receiver accepts.
pub const VOLUME_DB_MAX: f64 = 16.0;
/// Adjustment applied by a relative increase/decrease command.
pub const VOLUME_STEP_DB: f64 = 0.5;

const VOLUME_DB_RANGE: f64 = VOLUME_DB_MAX - VOLUME_DB_MIN;

/// Clamp `db` into the receiver range. `NaN` maps to the minimum.
#[must_use]
pub fn clamp_db(db: f64) -> f64 {
    if db.is_nan() {
        return VOLUME_DB_MIN;
    }
    db.clamp(VOLUME_DB_MIN, VOLUME_DB_MAX)
}

/// Map decibels onto `[0.0, 100.0]`.
#[must_use]
pub fn db_to_percent(db: f64) -> f64 {
    100.0 * ((clamp_db(db) - VOLUME_DB_MIN) / VOLUME_DB_RANGE)
}

/// Percent value published for `db`, rounded to the nearest integer.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percent_for_db(db: f64) -> u8 {
    // db_to_percent is bounded to [0, 100], so the cast cannot wrap.
    db_to_percent(db).round() as u8
}

/// Map a percent onto whole decibels.
///
/// Truncates toward zero rather than rounding: 1% is −79 dB, 99% is 15 dB,
/// 26% is −55 dB (not −56).
#[must_use]
pub fn percent_to_db(percent: i32) -> i32 {
    let percent = percent.clamp(0, 100);
    // Integer form of trunc(percent / 100 * 96 - 80); `/` truncates toward zero.
    (percent * 96 - 8000) / 100
}
