//! Dialog state types for the dashboard.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::types::{Priority, Task, TaskDraft, TaskPatch, validate_draft, validate_patch};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TaskFormField {
    Title,
    Description,
    Priority,
    Deadline,
    Estimate,
    Submit,
    Cancel,
}

impl TaskFormField {
    pub fn next(self) -> Self {
        match self {
            TaskFormField::Title => TaskFormField::Description,
            TaskFormField::Description => TaskFormField::Priority,
            TaskFormField::Priority => TaskFormField::Deadline,
            TaskFormField::Deadline => TaskFormField::Estimate,
            TaskFormField::Estimate => TaskFormField::Submit,
            TaskFormField::Submit => TaskFormField::Cancel,
            TaskFormField::Cancel => TaskFormField::Title,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            TaskFormField::Title => TaskFormField::Cancel,
            TaskFormField::Description => TaskFormField::Title,
            TaskFormField::Priority => TaskFormField::Description,
            TaskFormField::Deadline => TaskFormField::Priority,
            TaskFormField::Estimate => TaskFormField::Deadline,
            TaskFormField::Submit => TaskFormField::Estimate,
            TaskFormField::Cancel => TaskFormField::Submit,
        }
    }

    pub fn is_text_input(self) -> bool {
        matches!(
            self,
            TaskFormField::Title
                | TaskFormField::Description
                | TaskFormField::Deadline
                | TaskFormField::Estimate
        )
    }
}

/// Shared form state for the create and edit dialogs. `submitting` is
/// the per-intent state machine: while set, submit is ignored so the
/// same intent cannot be sent twice.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TaskFormState {
    /// `None` for create, the target id for edit.
    pub task_id: Option<Uuid>,
    pub title_input: String,
    pub description_input: String,
    pub priority: Priority,
    pub deadline_input: String,
    pub estimate_input: String,
    pub focused_field: TaskFormField,
    pub error_message: Option<String>,
    pub submitting: bool,
}

impl TaskFormState {
    pub fn new_task() -> Self {
        Self {
            task_id: None,
            title_input: String::new(),
            description_input: String::new(),
            priority: Priority::Medium,
            deadline_input: String::new(),
            estimate_input: String::new(),
            focused_field: TaskFormField::Title,
            error_message: None,
            submitting: false,
        }
    }

    pub fn edit_task(task: &Task) -> Self {
        Self {
            task_id: Some(task.id),
            title_input: task.title.clone(),
            description_input: task.description.clone().unwrap_or_default(),
            priority: task.priority,
            deadline_input: task
                .deadline
                .map(|deadline| deadline.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            estimate_input: task
                .time_estimate
                .map(|minutes| minutes.to_string())
                .unwrap_or_default(),
            focused_field: TaskFormField::Title,
            error_message: None,
            submitting: false,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.task_id.is_some()
    }

    pub fn focused_input_mut(&mut self) -> Option<&mut String> {
        match self.focused_field {
            TaskFormField::Title => Some(&mut self.title_input),
            TaskFormField::Description => Some(&mut self.description_input),
            TaskFormField::Deadline => Some(&mut self.deadline_input),
            TaskFormField::Estimate => Some(&mut self.estimate_input),
            _ => None,
        }
    }

    /// Builds the creation input, running the same field parsing the
    /// edit path uses. Errors land in `error_message` at the call site.
    pub fn to_draft(&self) -> Result<TaskDraft, String> {
        let draft = TaskDraft {
            title: self.title_input.trim().to_string(),
            description: normalize_optional(&self.description_input),
            priority: Some(self.priority),
            deadline: parse_deadline_input(&self.deadline_input)?,
            time_estimate: parse_estimate_input(&self.estimate_input)?,
            tag_ids: Vec::new(),
        };
        validate_draft(&draft)?;
        Ok(draft)
    }

    pub fn to_patch(&self) -> Result<TaskPatch, String> {
        let patch = TaskPatch {
            title: Some(self.title_input.trim().to_string()),
            description: Some(self.description_input.trim().to_string()),
            priority: Some(self.priority),
            status: None,
            deadline: parse_deadline_input(&self.deadline_input)?,
            time_estimate: parse_estimate_input(&self.estimate_input)?,
        };
        validate_patch(&patch)?;
        Ok(patch)
    }
}

fn normalize_optional(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_deadline_input(input: &str) -> Result<Option<DateTime<Utc>>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| "Invalid deadline date".to_string())?;
        return Ok(Some(midnight.and_utc()));
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|deadline| Some(deadline.with_timezone(&Utc)))
        .map_err(|_| format!("Invalid deadline '{trimmed}' (expected YYYY-MM-DD)"))
}

fn parse_estimate_input(input: &str) -> Result<Option<u32>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| format!("Invalid time estimate '{trimmed}' (minutes)"))
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConfirmCancelField {
    Confirm,
    Cancel,
}

impl ConfirmCancelField {
    pub fn toggled(self) -> Self {
        match self {
            ConfirmCancelField::Confirm => ConfirmCancelField::Cancel,
            ConfirmCancelField::Cancel => ConfirmCancelField::Confirm,
        }
    }
}

/// Delete is irreversible, so it always goes through this confirmation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeleteTaskDialogState {
    pub task_id: Uuid,
    pub task_title: String,
    pub focused_field: ConfirmCancelField,
    pub submitting: bool,
}

impl DeleteTaskDialogState {
    pub fn for_task(task: &Task) -> Self {
        Self {
            task_id: task.id,
            task_title: task.title.clone(),
            focused_field: ConfirmCancelField::Cancel,
            submitting: false,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BulkDeleteDialogState {
    pub task_ids: Vec<Uuid>,
    pub focused_field: ConfirmCancelField,
    pub submitting: bool,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ErrorDialogState {
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ActiveDialog {
    None,
    TaskForm(TaskFormState),
    DeleteTask(DeleteTaskDialogState),
    BulkDelete(BulkDeleteDialogState),
    Error(ErrorDialogState),
}

impl ActiveDialog {
    pub fn is_none(&self) -> bool {
        matches!(self, ActiveDialog::None)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_form_field_cycle_visits_every_field() {
        let mut field = TaskFormField::Title;
        let mut seen = Vec::new();
        for _ in 0..7 {
            seen.push(field);
            field = field.next();
        }
        assert_eq!(field, TaskFormField::Title);
        assert_eq!(seen.len(), 7);
        for field in &seen {
            assert_eq!(field.previous().next(), *field);
        }
    }

    #[test]
    fn test_parse_deadline_date_only() {
        let parsed = parse_deadline_input("2024-03-01").expect("date should parse");
        assert_eq!(parsed, Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_parse_deadline_rfc3339() {
        let parsed = parse_deadline_input("2024-03-01T09:30:00Z").expect("timestamp should parse");
        assert_eq!(
            parsed,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_deadline_empty_and_invalid() {
        assert_eq!(parse_deadline_input("  "), Ok(None));
        assert!(parse_deadline_input("next tuesday").is_err());
    }

    #[test]
    fn test_to_draft_trims_and_normalizes() {
        let mut form = TaskFormState::new_task();
        form.title_input = "  Ship release  ".to_string();
        form.description_input = "   ".to_string();
        form.estimate_input = "45".to_string();

        let draft = form.to_draft().expect("draft should build");
        assert_eq!(draft.title, "Ship release");
        assert!(draft.description.is_none());
        assert_eq!(draft.time_estimate, Some(45));
        assert_eq!(draft.priority, Some(Priority::Medium));
    }

    #[test]
    fn test_to_draft_invalid_estimate_is_an_error() {
        let mut form = TaskFormState::new_task();
        form.title_input = "x".to_string();
        form.estimate_input = "soon".to_string();
        assert!(form.to_draft().is_err());
    }

    #[test]
    fn test_delete_dialog_defaults_to_cancel() {
        let task = Task {
            id: Uuid::new_v4(),
            title: "Pay rent".to_string(),
            description: None,
            priority: Priority::High,
            status: crate::types::TaskStatus::Active,
            deadline: None,
            time_estimate: None,
            tags: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let dialog = DeleteTaskDialogState::for_task(&task);
        assert_eq!(dialog.focused_field, ConfirmCancelField::Cancel);
        assert!(!dialog.submitting);
    }
}
