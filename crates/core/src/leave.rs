//! Leave applications: types, review outcomes and the pending-only rule.

use crate::error::CoreError;
use crate::types::Date;

/// Minimum length of the reason text, after trimming.
pub const MIN_REASON_LENGTH: usize = 10;

crate::define_text_enum! {
    LeaveType("leave type") {
        Annual = "annual",
        Sick = "sick",
        Maternity = "maternity",
        Paternity = "paternity",
        Emergency = "emergency",
        Study = "study",
        Compassionate = "compassionate",
    }
}

crate::define_text_enum! {
    /// `pending` until a privileged user decides or the applicant cancels.
    LeaveStatus("leave status") {
        Pending = "pending",
        Approved = "approved",
        Rejected = "rejected",
        Cancelled = "cancelled",
    }
}

crate::define_text_enum! {
    /// Decision a privileged reviewer may record.
    LeaveDecision("leave decision") {
        Approve = "approve" | "approved",
        Reject = "reject" | "rejected",
    }
}

impl LeaveDecision {
    pub fn resulting_status(self) -> LeaveStatus {
        match self {
            LeaveDecision::Approve => LeaveStatus::Approved,
            LeaveDecision::Reject => LeaveStatus::Rejected,
        }
    }
}

/// Only pending applications may be decided or cancelled.
pub fn ensure_pending(status: LeaveStatus) -> Result<(), CoreError> {
    if status == LeaveStatus::Pending {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Leave application is already {status}"
        )))
    }
}

/// The reason must carry at least [`MIN_REASON_LENGTH`] characters.
pub fn validate_reason(reason: &str) -> Result<(), CoreError> {
    if reason.trim().chars().count() < MIN_REASON_LENGTH {
        return Err(CoreError::Validation(format!(
            "Reason must be at least {MIN_REASON_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Inclusive number of calendar days covered by a leave range.
pub fn leave_days(start: Date, end: Date) -> i64 {
    (end - start).num_days() + 1
}
