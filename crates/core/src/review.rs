//! Review decisions recorded against submitted tasks.
//!
//! Each decision appends one row to the task's review history and drives the
//! task status through [`ReviewDecision::resulting_status`].

use crate::error::CoreError;
use crate::task_workflow::TaskStatus;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Maximum length for review comments.
pub const MAX_COMMENTS_LENGTH: usize = 10_000;

crate::define_text_enum! {
    /// Outcome chosen by the reviewer.
    ReviewDecision("review decision") {
        Approved = "approved",
        NeedsRework = "needs_rework" | "rework_required",
        Rejected = "rejected",
    }
}

impl ReviewDecision {
    /// Task status the decision leads to.
    ///
    /// A rejection sends the task back to active work rather than to the
    /// rework queue; the review row keeps the distinction.
    pub fn resulting_status(self) -> TaskStatus {
        match self {
            ReviewDecision::Approved => TaskStatus::Completed,
            ReviewDecision::NeedsRework => TaskStatus::NeedsRework,
            ReviewDecision::Rejected => TaskStatus::InProgress,
        }
    }
}

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Comments are mandatory and bounded. Returns the trimmed text.
pub fn validate_comments(comments: &str) -> Result<&str, CoreError> {
    let trimmed = comments.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Review comments must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_COMMENTS_LENGTH {
        return Err(CoreError::Validation(format!(
            "Review comments exceed maximum length of {MAX_COMMENTS_LENGTH} characters"
        )));
    }
    Ok(trimmed)
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn decisions_map_to_statuses() {
        assert_eq!(
            ReviewDecision::Approved.resulting_status(),
            TaskStatus::Completed
        );
        assert_eq!(
            ReviewDecision::NeedsRework.resulting_status(),
            TaskStatus::NeedsRework
        );
        assert_eq!(
            ReviewDecision::Rejected.resulting_status(),
            TaskStatus::InProgress
        );
    }

    #[test]
    fn legacy_rework_decision_alias() {
        assert_eq!(
            ReviewDecision::parse("rework_required").unwrap(),
            ReviewDecision::NeedsRework
        );
    }

    #[test]
    fn blank_comments_rejected() {
        assert_matches!(validate_comments("   \n"), Err(CoreError::Validation(_)));
        assert_matches!(validate_comments(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn comments_are_trimmed() {
        assert_eq!(validate_comments("  Looks good ").unwrap(), "Looks good");
    }

    #[test]
    fn overlong_comments_rejected() {
        let long = "a".repeat(MAX_COMMENTS_LENGTH + 1);
        assert!(validate_comments(&long).is_err());
    }
}
