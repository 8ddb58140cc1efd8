//! Query validation and normalization.
//!
//! Validation runs field by field and reports every failure at once, so an
//! operator can fix the whole form in one pass. Bounds ordering is
//! deliberately not checked; a window with `start > end` dispatches fine and
//! simply never sends anything once playback begins.

use std::fmt;

use serde::Serialize;

use crate::error::{PlaybackError, Result};
use crate::types::{PlaybackQuery, QueryInput, WireTimestamp};

/// A query field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryField {
    Packet,
    StartTime,
    EndTime,
}

impl QueryField {
    /// Field name as it appears on the wire and in form submissions.
    pub fn wire_name(self) -> &'static str {
        match self {
            QueryField::Packet => "packet",
            QueryField::StartTime => "startTime",
            QueryField::EndTime => "endTime",
        }
    }
}

/// Per-field outcome of validating a [`QueryInput`].
///
/// The default report has no failures. [`passed`] answers whether the input
/// as a whole may be dispatched.
///
/// [`passed`]: ValidationReport::passed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// No packet was selected.
    pub packet_missing: bool,
    /// The start bound is not a whole-second UTC instant.
    pub start_time_invalid: bool,
    /// The end bound is not a whole-second UTC instant.
    pub end_time_invalid: bool,
}

impl ValidationReport {
    /// Whether every field validated.
    pub fn passed(&self) -> bool {
        !(self.packet_missing || self.start_time_invalid || self.end_time_invalid)
    }

    /// The fields that failed, in form order.
    pub fn failed_fields(&self) -> Vec<QueryField> {
        let mut failed = Vec::new();
        if self.packet_missing {
            failed.push(QueryField::Packet);
        }
        if self.start_time_invalid {
            failed.push(QueryField::StartTime);
        }
        if self.end_time_invalid {
            failed.push(QueryField::EndTime);
        }
        failed
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            return f.write_str("all fields valid");
        }
        let names: Vec<&str> =
            self.failed_fields().into_iter().map(QueryField::wire_name).collect();
        write!(f, "invalid fields: {}", names.join(", "))
    }
}

/// Validate raw operator input field by field.
///
/// Every field is checked even after the first failure, so the report covers
/// the whole form.
pub fn validate(input: &QueryInput) -> ValidationReport {
    let mut report = ValidationReport::default();

    match input.packet.as_deref() {
        Some(name) if !name.is_empty() => {}
        _ => report.packet_missing = true,
    }
    if !WireTimestamp::matches_seconds_form(&input.start_time) {
        report.start_time_invalid = true;
    }
    if !WireTimestamp::matches_seconds_form(&input.end_time) {
        report.end_time_invalid = true;
    }

    report
}

/// Validate and normalize input into a dispatchable query.
///
/// On success the time bounds are in wire form, with a zero decisecond digit
/// appended to each.
pub fn checked_query(input: &QueryInput) -> Result<PlaybackQuery> {
    let report = validate(input);
    if !report.passed() {
        return Err(PlaybackError::Validation { report });
    }

    Ok(PlaybackQuery {
        packet: input.packet.clone().unwrap_or_default(),
        start: WireTimestamp::from_seconds_form(&input.start_time)?,
        end: WireTimestamp::from_seconds_form(&input.end_time)?,
    })
}
