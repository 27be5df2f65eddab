//! In-app notifications raised by the task workflow.
//!
//! The workflow handlers decide *when* to notify; this module decides who
//! receives it and what it says.

use crate::review::ReviewDecision;
use crate::types::DbId;

crate::define_text_enum! {
    NotificationKind("notification kind") {
        /// A task was assigned to the recipient.
        TaskAssigned = "task_assigned",
        /// The recipient's review queue gained a submission.
        TaskSubmitted = "task_submitted",
        /// A reviewer decided on the recipient's submission.
        TaskReviewed = "task_reviewed",
    }
}

/// Title and body of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationText {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl NotificationText {
    pub fn task_assigned(task_title: &str) -> Self {
        Self {
            kind: NotificationKind::TaskAssigned,
            title: "New task assigned".to_string(),
            message: format!("You have been assigned \"{task_title}\"."),
        }
    }

    pub fn task_submitted(task_title: &str) -> Self {
        Self {
            kind: NotificationKind::TaskSubmitted,
            title: "Task submitted for review".to_string(),
            message: format!("\"{task_title}\" has a new submission awaiting your review."),
        }
    }

    pub fn task_reviewed(task_title: &str, decision: ReviewDecision) -> Self {
        let outcome = match decision {
            ReviewDecision::Approved => "was approved",
            ReviewDecision::NeedsRework => "needs rework",
            ReviewDecision::Rejected => "was rejected",
        };
        Self {
            kind: NotificationKind::TaskReviewed,
            title: "Task reviewed".to_string(),
            message: format!("Your submission for \"{task_title}\" {outcome}."),
        }
    }
}

/// Nobody is notified about their own action.
pub fn recipient(target: Option<DbId>, actor: DbId) -> Option<DbId> {
    target.filter(|&id| id != actor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_actions_are_not_notified() {
        assert_eq!(recipient(Some(4), 2), Some(4));
        assert_eq!(recipient(Some(2), 2), None);
        assert_eq!(recipient(None, 2), None);
    }

    #[test]
    fn review_text_names_the_outcome() {
        let text = NotificationText::task_reviewed("Site survey", ReviewDecision::NeedsRework);
        assert_eq!(text.kind, NotificationKind::TaskReviewed);
        assert!(text.message.contains("Site survey"));
        assert!(text.message.contains("needs rework"));
    }

    #[test]
    fn kinds_use_snake_case() {
        assert_eq!(NotificationKind::TaskAssigned.as_str(), "task_assigned");
        assert!(NotificationKind::parse("task_deleted").is_err());
    }
}
