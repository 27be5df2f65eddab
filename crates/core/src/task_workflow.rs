//! Task lifecycle state machine.
//!
//! A task moves through a fixed set of stored statuses. Every status change
//! is tagged with the [`Transition`] that caused it (a manual progression, a
//! file submission or a review decision) and validated against the transition
//! table in [`TaskStatus::next`]. Who may trigger each transition is decided
//! by the `authorize_*` functions against a [`TaskActor`].
//!
//! `overdue` is not a stored status. It is an overlay computed from the
//! target completion date, see [`is_overdue`].

use crate::error::CoreError;
use crate::review::ReviewDecision;
use crate::roles::Role;
use crate::types::{Date, DbId};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

crate::define_text_enum! {
    /// Stored task status. `rework_required` is accepted as a legacy alias.
    TaskStatus("task status") {
        NotStarted = "not_started",
        InProgress = "in_progress",
        Submitted = "submitted",
        UnderReview = "under_review",
        NeedsRework = "needs_rework" | "rework_required",
        Completed = "completed",
    }
}

crate::define_text_enum! {
    /// Task priority.
    TaskPriority("task priority") {
        Low = "low",
        Medium = "medium",
        High = "high",
        Urgent = "urgent",
    }
}

/// The derived overlay name used in listings and filters.
pub const OVERDUE: &str = "overdue";

/// Maximum task title length (matches `tasks.title VARCHAR(255)`).
pub const MAX_TITLE_LENGTH: usize = 255;

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// What caused a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A direct status update (start work, open a submission for review).
    Manual(TaskStatus),
    /// The assignee uploaded a deliverable file.
    Submission,
    /// A reviewer recorded a decision.
    Review(ReviewDecision),
}

impl TaskStatus {
    /// Statuses reachable from `self` through a manual update.
    ///
    /// - `not_started`  -> `in_progress`
    /// - `needs_rework` -> `in_progress`
    /// - `submitted`    -> `under_review`
    ///
    /// `submitted`, `needs_rework` and `completed` are only reachable through
    /// a submission or a review decision.
    pub fn manual_targets(self) -> &'static [TaskStatus] {
        match self {
            TaskStatus::NotStarted | TaskStatus::NeedsRework => &[TaskStatus::InProgress],
            TaskStatus::Submitted => &[TaskStatus::UnderReview],
            TaskStatus::InProgress | TaskStatus::UnderReview | TaskStatus::Completed => &[],
        }
    }

    /// A file may be submitted (or re-submitted) in any status but `completed`.
    pub fn accepts_submission(self) -> bool {
        self != TaskStatus::Completed
    }

    /// A review decision may be recorded once work has been submitted.
    pub fn awaits_review(self) -> bool {
        matches!(self, TaskStatus::Submitted | TaskStatus::UnderReview)
    }

    /// Compute the status that `transition` leads to from `self`.
    ///
    /// Returns `CoreError::Conflict` for a transition the table does not allow.
    pub fn next(self, transition: Transition) -> Result<TaskStatus, CoreError> {
        match transition {
            Transition::Manual(target) => {
                let allowed = self.manual_targets();
                if allowed.contains(&target) {
                    Ok(target)
                } else {
                    Err(CoreError::Conflict(format!(
                        "Cannot move task from '{self}' to '{target}'. Allowed: {}",
                        describe(allowed)
                    )))
                }
            }
            Transition::Submission => {
                if self.accepts_submission() {
                    Ok(TaskStatus::Submitted)
                } else {
                    Err(CoreError::Conflict(
                        "Task is already completed and no longer accepts submissions".into(),
                    ))
                }
            }
            Transition::Review(decision) => {
                if self.awaits_review() {
                    Ok(decision.resulting_status())
                } else {
                    Err(CoreError::Conflict(format!(
                        "Task in status '{self}' is not awaiting review"
                    )))
                }
            }
        }
    }
}

fn describe(statuses: &[TaskStatus]) -> String {
    if statuses.is_empty() {
        "none".to_string()
    } else {
        statuses
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ---------------------------------------------------------------------------
// Actors and authorization
// ---------------------------------------------------------------------------

/// The acting user's relationship to a specific task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskActor {
    pub is_assignee: bool,
    pub is_reviewer: bool,
    pub is_privileged: bool,
}

impl TaskActor {
    /// Derive the relationship from ids and the caller's role.
    pub fn resolve(
        user_id: DbId,
        role: Role,
        assignee_id: Option<DbId>,
        reviewer_id: Option<DbId>,
    ) -> Self {
        Self {
            is_assignee: assignee_id == Some(user_id),
            is_reviewer: reviewer_id == Some(user_id),
            is_privileged: role.is_privileged(),
        }
    }

    /// Assignees, reviewers and privileged users may see a task and its files.
    pub fn can_view(self) -> bool {
        self.is_assignee || self.is_reviewer || self.is_privileged
    }
}

/// Only the assignee may submit a file, regardless of role.
pub fn authorize_submission(actor: TaskActor) -> Result<(), CoreError> {
    if actor.is_assignee {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the task's assignee may submit files".into(),
        ))
    }
}

/// The task's reviewer or a privileged user may record a review decision.
pub fn authorize_review(actor: TaskActor) -> Result<(), CoreError> {
    if actor.is_reviewer || actor.is_privileged {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the task's reviewer or an admin/director may review it".into(),
        ))
    }
}

/// The task's assignee, reviewer or a privileged user may download its file.
pub fn authorize_download(actor: TaskActor) -> Result<(), CoreError> {
    if actor.can_view() {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Not permitted to access this task's file".into(),
        ))
    }
}

/// Check who may perform a manual move into `target`.
///
/// Starting or resuming work (`-> in_progress`) belongs to the assignee;
/// opening a submission (`-> under_review`) belongs to the reviewer.
/// Privileged users may do either.
pub fn authorize_manual(actor: TaskActor, target: TaskStatus) -> Result<(), CoreError> {
    if actor.is_privileged {
        return Ok(());
    }
    let permitted = match target {
        TaskStatus::InProgress => actor.is_assignee,
        TaskStatus::UnderReview => actor.is_reviewer,
        _ => false,
    };
    if permitted {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Not permitted to move this task to '{target}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Overdue overlay and status filters
// ---------------------------------------------------------------------------

/// A task is overdue when its target date has passed and it is not completed.
pub fn is_overdue(status: TaskStatus, target_completion_date: Option<Date>, today: Date) -> bool {
    status != TaskStatus::Completed && target_completion_date.is_some_and(|due| today > due)
}

/// A status filter on task listings: a stored status or the overdue overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Stored(TaskStatus),
    Overdue,
}

impl StatusFilter {
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        if value == OVERDUE {
            Ok(StatusFilter::Overdue)
        } else {
            TaskStatus::parse(value).map(StatusFilter::Stored)
        }
    }
}

/// Parse the target of a manual status update. `overdue` is never settable.
pub fn parse_manual_target(value: &str) -> Result<TaskStatus, CoreError> {
    if value == OVERDUE {
        return Err(CoreError::Validation(
            "'overdue' is derived from the target date and cannot be set".into(),
        ));
    }
    TaskStatus::parse(value)
}

/// Validate a task title: required, non-blank, bounded.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Task title is required".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Task title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
