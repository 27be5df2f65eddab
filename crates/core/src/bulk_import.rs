//! CSV bulk import of staff, projects and tasks.
//!
//! Parsing and per-row validation live here; resolving references (staff ids,
//! project codes) and inserting is done by the API layer, row by row, so one
//! bad row never blocks the rest.

use serde::Serialize;

use crate::error::CoreError;
use crate::project::{validate_consortium, validate_date_range, validate_project_code};
use crate::project::{Consortium, ProjectStatus, ProjectType};
use crate::roles::Role;
use crate::task_workflow::{validate_title, TaskPriority};
use crate::types::Date;
use crate::user::{looks_like_email, normalize_email, validate_password, validate_staff_id};

crate::define_text_enum! {
    ImportType("import type") {
        Staff = "staff",
        Projects = "projects",
        Tasks = "tasks",
    }
}

impl ImportType {
    /// Header row of the downloadable template for this import.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            ImportType::Staff => &[
                "firstName", "lastName", "email", "staffId", "role",
                "department", "position", "phoneNumber", "password",
            ],
            ImportType::Projects => &[
                "name", "code", "type", "consortium", "description",
                "status", "startDate", "endDate", "clientName",
            ],
            ImportType::Tasks => &[
                "title", "description", "assignedTo", "projectCode", "status",
                "priority", "targetDate", "estimatedHours", "deliverables",
            ],
        }
    }

    /// Columns that must be present in the header row.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            ImportType::Staff => &["firstName", "lastName", "email", "staffId", "password"],
            ImportType::Projects => &["name", "code", "type"],
            ImportType::Tasks => &["title", "projectCode"],
        }
    }
}

/// A failed data row, numbered from 1 (the header is not counted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Parsed CSV: a header row plus numbered data rows.
#[derive(Debug, Clone)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<(usize, Vec<String>)>,
}

/// One data row with access by column name.
#[derive(Debug, Clone, Copy)]
pub struct CsvRow<'a> {
    headers: &'a [String],
    values: &'a [String],
}

impl CsvTable {
    /// Parse CSV text. Blank lines are skipped but still counted for row numbers.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text.lines();
        let header_line = lines
            .next()
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| CoreError::Validation("CSV data is empty".to_string()))?;
        let headers: Vec<String> = parse_csv_line(header_line)
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        let rows = lines
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| (idx + 1, parse_csv_line(line)))
            .collect();

        Ok(Self { headers, rows })
    }

    /// Fail when any of the import type's required columns is absent.
    pub fn require_columns(&self, import_type: ImportType) -> Result<(), CoreError> {
        let missing: Vec<&str> = import_type
            .required_columns()
            .iter()
            .copied()
            .filter(|col| !self.headers.iter().any(|h| h == col))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "CSV is missing required columns: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate `(row_number, row)` pairs.
    pub fn rows(&self) -> impl Iterator<Item = (usize, CsvRow<'_>)> {
        self.rows.iter().map(|(n, values)| {
            (
                *n,
                CsvRow {
                    headers: &self.headers,
                    values,
                },
            )
        })
    }

    /// Parse every row with `parse`, splitting successes from row errors.
    pub fn parse_rows<T>(
        &self,
        parse: impl Fn(CsvRow<'_>) -> Result<T, CoreError>,
    ) -> (Vec<(usize, T)>, Vec<RowError>) {
        let mut parsed = Vec::new();
        let mut errors = Vec::new();
        for (row, values) in self.rows() {
            match parse(values) {
                Ok(item) => parsed.push((row, item)),
                Err(err) => errors.push(RowError {
                    row,
                    message: row_message(&err),
                }),
            }
        }
        (parsed, errors)
    }
}

/// Strip the `Validation failed:` style prefix for row reports.
pub fn row_message(err: &CoreError) -> String {
    match err {
        CoreError::Validation(msg)
        | CoreError::Conflict(msg)
        | CoreError::Forbidden(msg)
        | CoreError::Unauthorized(msg)
        | CoreError::TooLarge(msg)
        | CoreError::Internal(msg) => msg.clone(),
        CoreError::NotFound { .. } => err.to_string(),
    }
}

impl<'a> CsvRow<'a> {
    /// Trimmed value of `column`, or `None` when absent or blank.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        let value = self.values.get(idx)?.trim();
        (!value.is_empty()).then_some(value)
    }

    pub fn required(&self, column: &str) -> Result<&'a str, CoreError> {
        self.get(column)
            .ok_or_else(|| CoreError::Validation(format!("Column '{column}' is required")))
    }

    pub fn date(&self, column: &str) -> Result<Option<Date>, CoreError> {
        self.get(column)
            .map(|raw| {
                Date::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    CoreError::Validation(format!(
                        "Column '{column}' must be a date in YYYY-MM-DD format (got '{raw}')"
                    ))
                })
            })
            .transpose()
    }
}

/// Split one CSV line, honouring double-quoted fields and `""` escapes.
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == ',' {
            result.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    result.push(current);
    result
}

// ---------------------------------------------------------------------------
// Typed rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StaffRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub staff_id: String,
    pub role: Role,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone_number: Option<String>,
    pub password: String,
}

impl StaffRow {
    pub fn from_row(row: CsvRow<'_>) -> Result<Self, CoreError> {
        let email = normalize_email(row.required("email")?);
        if !looks_like_email(&email) {
            return Err(CoreError::Validation(format!("Invalid email '{email}'")));
        }
        let staff_id = row.required("staffId")?;
        validate_staff_id(staff_id)?;
        let password = row.required("password")?;
        validate_password(password)?;
        let role = row.get("role").map(Role::parse).transpose()?.unwrap_or(Role::Staff);

        Ok(Self {
            first_name: row.required("firstName")?.to_string(),
            last_name: row.required("lastName")?.to_string(),
            email,
            staff_id: staff_id.to_string(),
            role,
            department: row.get("department").map(str::to_string),
            position: row.get("position").map(str::to_string),
            phone_number: row.get("phoneNumber").map(str::to_string),
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRow {
    pub name: String,
    pub code: String,
    pub project_type: ProjectType,
    pub consortium: Option<Consortium>,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub client_name: Option<String>,
}

impl ProjectRow {
    pub fn from_row(row: CsvRow<'_>) -> Result<Self, CoreError> {
        let code = row.required("code")?;
        validate_project_code(code)?;
        let project_type = ProjectType::parse(row.required("type")?)?;
        let consortium = row.get("consortium").map(Consortium::parse).transpose()?;
        validate_consortium(project_type, consortium)?;
        let start_date = row.date("startDate")?;
        let end_date = row.date("endDate")?;
        validate_date_range(start_date, end_date, "Project")?;
        let status = row
            .get("status")
            .map(ProjectStatus::parse)
            .transpose()?
            .unwrap_or(ProjectStatus::Planning);

        Ok(Self {
            name: row.required("name")?.to_string(),
            code: code.to_string(),
            project_type,
            consortium,
            description: row.get("description").map(str::to_string),
            status,
            start_date,
            end_date,
            client_name: row.get("clientName").map(str::to_string),
        })
    }
}

/// A task row. Imported tasks always start at `not_started`; the `status`
/// column is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub title: String,
    pub description: Option<String>,
    /// Staff id of the assignee, resolved by the caller.
    pub assigned_to: Option<String>,
    pub project_code: String,
    pub priority: TaskPriority,
    pub target_date: Option<Date>,
}

impl TaskRow {
    pub fn from_row(row: CsvRow<'_>) -> Result<Self, CoreError> {
        let title = row.required("title")?;
        validate_title(title)?;
        let priority = row
            .get("priority")
            .map(TaskPriority::parse)
            .transpose()?
            .unwrap_or(TaskPriority::Medium);

        let mut description = row.get("description").map(str::to_string);
        if let Some(hours) = row.get("estimatedHours") {
            if hours.parse::<f64>().map_or(true, |h| h < 0.0) {
                return Err(CoreError::Validation(format!(
                    "Column 'estimatedHours' must be a non-negative number (got '{hours}')"
                )));
            }
            append_line(&mut description, &format!("Estimated hours: {hours}"));
        }
        if let Some(deliverables) = row.get("deliverables") {
            append_line(&mut description, &format!("Deliverables: {deliverables}"));
        }

        Ok(Self {
            title: title.to_string(),
            description,
            assigned_to: row.get("assignedTo").map(str::to_string),
            project_code: row.required("projectCode")?.to_string(),
            priority,
            target_date: row.date("targetDate")?,
        })
    }
}

fn append_line(target: &mut Option<String>, line: &str) {
    match target {
        Some(text) => {
            text.push_str("\n\n");
            text.push_str(line);
        }
        None => *target = Some(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const STAFF_CSV: &str = "firstName,lastName,email,staffId,role,department,position,phoneNumber,password\n\
John,Doe,john.doe@becs.co.ke,BECS020,staff,Operations,Coordinator,+254700123020,password123\n\
Jane,Smith,not-an-email,BECS021,staff,Finance,Analyst,+254700123021,password123";

    #[test]
    fn parses_quoted_fields() {
        let values = parse_csv_line(r#"a,"b, with comma","say ""hi""",,"#);
        assert_eq!(values, vec!["a", "b, with comma", "say \"hi\"", "", ""]);
    }

    #[test]
    fn empty_csv_rejected() {
        assert_matches!(CsvTable::parse(""), Err(CoreError::Validation(_)));
        assert_matches!(CsvTable::parse("\n\n"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn missing_columns_reported() {
        let table = CsvTable::parse("firstName,lastName\nA,B").unwrap();
        assert_matches!(
            table.require_columns(ImportType::Staff),
            Err(CoreError::Validation(msg)) if msg.contains("email") && msg.contains("password")
        );
    }

    #[test]
    fn staff_rows_split_into_valid_and_errors() {
        let table = CsvTable::parse(STAFF_CSV).unwrap();
        table.require_columns(ImportType::Staff).unwrap();
        let (ok, errors) = table.parse_rows(StaffRow::from_row);
        assert_eq!(ok.len(), 1);
        assert_eq!(ok[0].0, 1);
        assert_eq!(ok[0].1.staff_id, "BECS020");
        assert_eq!(ok[0].1.role, Role::Staff);
        assert_eq!(
            errors,
            vec![RowError {
                row: 2,
                message: "Invalid email 'not-an-email'".into()
            }]
        );
    }

    #[test]
    fn blank_lines_keep_row_numbers() {
        let csv = "name,code,type\nFirst,P-1,AHP\n\nThird,P 3,AHP";
        let table = CsvTable::parse(csv).unwrap();
        let (ok, errors) = table.parse_rows(ProjectRow::from_row);
        assert_eq!(ok.len(), 1);
        assert_eq!(errors[0].row, 3);
    }

    #[test]
    fn project_row_rules() {
        let csv = "name,code,type,consortium,description,status,startDate,endDate,clientName\n\
Sample AHP Project,AHP-SAMPLE-2025,AHP,consortium_1,Sample,active,2025-01-01,2025-12-31,\n\
Private,PVT-1,Private,consortium_2,,,,,\n\
Dates,PVT-2,Private,,,,2025-12-31,2025-01-01,ABC";
        let table = CsvTable::parse(csv).unwrap();
        let (ok, errors) = table.parse_rows(ProjectRow::from_row);
        assert_eq!(ok.len(), 1);
        let project = &ok[0].1;
        assert_eq!(project.consortium, Some(Consortium::One));
        assert_eq!(project.status, ProjectStatus::Active);
        assert_eq!(project.client_name, None);
        assert_eq!(errors.iter().map(|e| e.row).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn task_row_folds_extra_columns_into_description() {
        let csv = "title,description,assignedTo,projectCode,status,priority,targetDate,estimatedHours,deliverables\n\
Sample Task,Task description,BECS005,AHP-C1-2025,completed,high,2025-02-15,20,Task deliverables";
        let table = CsvTable::parse(csv).unwrap();
        let (ok, errors) = table.parse_rows(TaskRow::from_row);
        assert!(errors.is_empty());
        let task = &ok[0].1;
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.assigned_to.as_deref(), Some("BECS005"));
        assert_eq!(
            task.description.as_deref(),
            Some("Task description\n\nEstimated hours: 20\n\nDeliverables: Task deliverables")
        );
        assert_eq!(task.target_date, Date::from_ymd_opt(2025, 2, 15));
    }

    #[test]
    fn task_row_rejects_bad_date() {
        let table = CsvTable::parse("title,projectCode,targetDate\nT,P-1,15/02/2025").unwrap();
        let (_, errors) = table.parse_rows(TaskRow::from_row);
        assert!(errors[0].message.contains("YYYY-MM-DD"));
    }
}
