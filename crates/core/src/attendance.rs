//! Attendance ledger rules: worked-hours derivation and summaries.

use crate::error::CoreError;
use crate::types::Timestamp;

/// Hours between clock-in and clock-out, rounded to two decimals.
///
/// Clock-out must not precede clock-in.
pub fn worked_hours(time_in: Timestamp, time_out: Timestamp) -> Result<f64, CoreError> {
    let seconds = (time_out - time_in).num_seconds();
    if seconds < 0 {
        return Err(CoreError::Validation(
            "Clock-out time is before clock-in time".to_string(),
        ));
    }
    Ok(round2(seconds as f64 / 3600.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rollup of a set of attendance records.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct AttendanceSummary {
    /// Records in the range, open or closed.
    pub days_recorded: i64,
    /// Records with both clock-in and clock-out.
    pub days_completed: i64,
    pub total_hours: f64,
    /// `total_hours / days_completed`, 0 when nothing is completed.
    pub average_hours: f64,
}

impl AttendanceSummary {
    /// Summarize a record set given each record's `total_hours`.
    pub fn from_hours<I>(hours: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut days_recorded = 0;
        let mut days_completed = 0;
        let mut total = 0.0;
        for h in hours {
            days_recorded += 1;
            if let Some(h) = h {
                days_completed += 1;
                total += h;
            }
        }
        let average = if days_completed > 0 {
            total / days_completed as f64
        } else {
            0.0
        };
        Self {
            days_recorded,
            days_completed,
            total_hours: round2(total),
            average_hours: round2(average),
        }
    }
}
