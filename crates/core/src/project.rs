//! Project registry rules: types, consortium buckets and progress rollups.

use crate::error::CoreError;
use crate::types::Date;

crate::define_text_enum! {
    /// Consortium-funded (`AHP`) or privately contracted work.
    ProjectType("project type") {
        Ahp = "AHP" | "ahp",
        Private = "Private" | "private",
    }
}

crate::define_text_enum! {
    /// Project status. Any value may be set at any time.
    ProjectStatus("project status") {
        Planning = "planning",
        Active = "active",
        OnHold = "on_hold",
        Completed = "completed",
    }
}

crate::define_text_enum! {
    /// Funding bucket for AHP projects.
    Consortium("consortium") {
        One = "consortium_1",
        Two = "consortium_2",
        Three = "consortium_3",
        Four = "consortium_4",
        Five = "consortium_5",
    }
}

/// Grouping key for AHP projects created without a consortium.
pub const UNASSIGNED_BUCKET: &str = "unassigned";

impl Consortium {
    /// Look up a bucket by its 1-based number, as used in `/consortiums/{n}`.
    pub fn from_number(n: i64) -> Result<Self, CoreError> {
        usize::try_from(n)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid consortium number {n}. Must be between 1 and {}",
                    Self::ALL.len()
                ))
            })
    }

    /// The 1-based bucket number.
    pub fn number(self) -> usize {
        Self::ALL
            .iter()
            .position(|c| *c == self)
            .map_or(0, |idx| idx + 1)
    }
}

/// A consortium only applies to AHP projects.
pub fn validate_consortium(
    project_type: ProjectType,
    consortium: Option<Consortium>,
) -> Result<(), CoreError> {
    if project_type == ProjectType::Private && consortium.is_some() {
        return Err(CoreError::Validation(
            "Private projects cannot belong to a consortium".to_string(),
        ));
    }
    Ok(())
}

/// When both dates are set the end must not precede the start.
pub fn validate_date_range(
    start: Option<Date>,
    end: Option<Date>,
    what: &str,
) -> Result<(), CoreError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(CoreError::Validation(format!(
                "{what} end date {end} is before start date {start}"
            )));
        }
    }
    Ok(())
}

/// Validate a project code: non-blank, no whitespace, at most 50 characters.
pub fn validate_project_code(code: &str) -> Result<(), CoreError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(CoreError::Validation("Project code is required".to_string()));
    }
    if code.len() > 50 {
        return Err(CoreError::Validation(
            "Project code must be at most 50 characters".to_string(),
        ));
    }
    if code.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(format!(
            "Project code '{code}' must not contain whitespace"
        )));
    }
    Ok(())
}

/// Percentage of completed tasks, rounded to the nearest whole number.
/// A project with no tasks is 0% complete.
pub fn completion_percentage(completed: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    let completed = completed.clamp(0, total);
    (completed * 100 + total / 2) / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn project_type_keeps_display_casing() {
        assert_eq!(ProjectType::parse("ahp").unwrap(), ProjectType::Ahp);
        assert_eq!(ProjectType::Ahp.as_str(), "AHP");
        assert_eq!(ProjectType::Private.as_str(), "Private");
    }

    #[test]
    fn consortium_numbers() {
        assert_eq!(Consortium::from_number(1).unwrap(), Consortium::One);
        assert_eq!(Consortium::from_number(5).unwrap(), Consortium::Five);
        assert_eq!(Consortium::Three.number(), 3);
        assert_matches!(Consortium::from_number(0), Err(CoreError::Validation(_)));
        assert_matches!(Consortium::from_number(6), Err(CoreError::Validation(_)));
        assert_matches!(Consortium::from_number(-1), Err(CoreError::Validation(_)));
    }

    #[test]
    fn private_project_rejects_consortium() {
        assert!(validate_consortium(ProjectType::Ahp, Some(Consortium::Two)).is_ok());
        assert!(validate_consortium(ProjectType::Ahp, None).is_ok());
        assert!(validate_consortium(ProjectType::Private, None).is_ok());
        assert_matches!(
            validate_consortium(ProjectType::Private, Some(Consortium::One)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn date_range_order() {
        let jan = date(2025, 1, 1);
        let dec = date(2025, 12, 31);
        assert!(validate_date_range(Some(jan), Some(dec), "Project").is_ok());
        assert!(validate_date_range(Some(jan), Some(jan), "Project").is_ok());
        assert!(validate_date_range(None, Some(jan), "Project").is_ok());
        assert!(validate_date_range(Some(dec), Some(jan), "Project").is_err());
    }

    #[test]
    fn project_codes() {
        assert!(validate_project_code("AHP-SAMPLE-2025").is_ok());
        assert!(validate_project_code(" ").is_err());
        assert!(validate_project_code("AHP 2025").is_err());
        assert!(validate_project_code(&"X".repeat(51)).is_err());
    }

    #[test]
    fn completion_percentage_rounds() {
        assert_eq!(completion_percentage(0, 0), 0);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(4, 4), 100);
    }
}
