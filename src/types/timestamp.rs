//! Wire timestamps for the playback protocol.
//!
//! The backend speaks UTC instants in a fixed-width decisecond form,
//! `YYYY-MM-DDTHH:MM:SS.dZ`, 22 characters long. One fractional digit
//! matches the 100ms playback tick unit, and the fixed width means
//! lexicographic ordering of wire timestamps is chronological ordering.
//! The end-bound check during playback relies on exactly that property.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::error::{PlaybackError, Result};

/// Milliseconds of telemetry time covered by one playback tick.
pub const TICK_UNIT_MILLIS: i64 = 100;

/// Operator input form: whole-second UTC instants like `2024-03-01T12:00:00Z`.
///
/// Field ranges are checked by the pattern itself (month 01-12, day 01-31,
/// hour 00-23). Calendar-impossible dates such as February 31 pass, matching
/// the permissiveness telemetry operators are used to.
static SECONDS_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[012])-(0[1-9]|[12]\d|3[01])T([01]\d|2[0-3]):[0-5]\d:[0-5]\dZ$")
        .expect("seconds-form pattern is a valid regex")
});

/// A UTC instant in the canonical wire form `YYYY-MM-DDTHH:MM:SS.dZ`.
///
/// Construct one from validated operator input with [`from_seconds_form`]
/// or from a tick count with [`from_ticks`]. The derived `Ord` is
/// lexicographic over the wire string, which for this form is also
/// chronological.
///
/// [`from_seconds_form`]: WireTimestamp::from_seconds_form
/// [`from_ticks`]: WireTimestamp::from_ticks
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct WireTimestamp(String);

impl WireTimestamp {
    /// Whether `input` is a well-formed whole-second UTC instant.
    pub fn matches_seconds_form(input: &str) -> bool {
        SECONDS_FORM.is_match(input)
    }

    /// Normalize a whole-second instant into the wire form.
    ///
    /// `2024-03-01T12:00:00Z` becomes `2024-03-01T12:00:00.0Z`: the date and
    /// time portion is kept verbatim and a zero decisecond digit is appended.
    pub fn from_seconds_form(input: &str) -> Result<Self> {
        if !Self::matches_seconds_form(input) {
            return Err(PlaybackError::timestamp(input, "expected YYYY-MM-DDTHH:MM:SSZ"));
        }
        let mut stamp = input[..19].to_string();
        stamp.push_str(".0Z");
        Ok(Self(stamp))
    }

    /// Render a tick count on the epoch timeline as a wire timestamp.
    ///
    /// Tick `n` is the instant `n * 100ms` after the Unix epoch. Tick counts
    /// past the representable range saturate rather than fail; they cannot
    /// arise from real timelines.
    pub fn from_ticks(ticks: u64) -> Self {
        let millis = i64::try_from(ticks).unwrap_or(i64::MAX).saturating_mul(TICK_UNIT_MILLIS);
        let instant =
            DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut stamp = instant.format("%Y-%m-%dT%H:%M:%S%.3f").to_string();
        stamp.truncate(21);
        stamp.push('Z');
        Self(stamp)
    }

    /// Tick index of this instant on the epoch timeline.
    ///
    /// Pre-epoch instants saturate at tick zero.
    pub fn ticks(&self) -> Result<u64> {
        let instant = DateTime::parse_from_rfc3339(&self.0)
            .map_err(|err| PlaybackError::timestamp(&self.0, err.to_string()))?;
        Ok(u64::try_from(instant.timestamp_millis() / TICK_UNIT_MILLIS).unwrap_or(0))
    }

    /// The wire string, e.g. `1970-01-01T00:00:00.1Z`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WireTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
