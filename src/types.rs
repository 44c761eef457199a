use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const TIME_ESTIMATE_MIN_MINUTES: u32 = 1;
pub const TIME_ESTIMATE_MAX_MINUTES: u32 = 480;

/// Task priority, ordered by urgency. The wire format carries the numeric
/// rank (Critical=0 .. Low=3), which doubles as the sort key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn rank(self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    /// Out-of-range ranks from the server fall back to Medium, matching
    /// the service's own default.
    pub fn from_rank(rank: u8) -> Self {
        match rank {
            0 => Priority::Critical,
            1 => Priority::High,
            3 => Priority::Low,
            _ => Priority::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Priority::Critical),
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub enum TaskStatus {
    Active,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Active => "active",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(TaskStatus::Active),
            "completed" | "done" => Some(TaskStatus::Completed),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Active => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Tag {
    pub id: Uuid,
    pub label: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub time_estimate: Option<u32>,
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Input for task creation. Ids are assigned by the remote service; a
/// draft never carries one.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: Option<DateTime<Utc>>,
    pub time_estimate: Option<u32>,
    pub tag_ids: Vec<Uuid>,
}

/// Partial update. `None` fields are left untouched by the server.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub deadline: Option<DateTime<Utc>>,
    pub time_estimate: Option<u32>,
}

impl TaskPatch {
    /// Toggle-status is a restricted update: only the status field moves.
    pub fn status_only(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Field-bound checks run before a mutation is submitted. The display
/// pipeline never validates; only the mutation boundary does.
pub fn validate_title(title: &str) -> Result<(), String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err("Title is required".to_string());
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(format!("Title must be at most {TITLE_MAX_CHARS} characters"));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), String> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(format!(
            "Description must be at most {DESCRIPTION_MAX_CHARS} characters"
        ));
    }
    Ok(())
}

pub fn validate_time_estimate(minutes: u32) -> Result<(), String> {
    if !(TIME_ESTIMATE_MIN_MINUTES..=TIME_ESTIMATE_MAX_MINUTES).contains(&minutes) {
        return Err(format!(
            "Time estimate must be between {TIME_ESTIMATE_MIN_MINUTES} and {TIME_ESTIMATE_MAX_MINUTES} minutes"
        ));
    }
    Ok(())
}

pub fn validate_draft(draft: &TaskDraft) -> Result<(), String> {
    validate_title(&draft.title)?;
    if let Some(description) = draft.description.as_deref() {
        validate_description(description)?;
    }
    if let Some(minutes) = draft.time_estimate {
        validate_time_estimate(minutes)?;
    }
    Ok(())
}

pub fn validate_patch(patch: &TaskPatch) -> Result<(), String> {
    if let Some(title) = patch.title.as_deref() {
        validate_title(title)?;
    }
    if let Some(description) = patch.description.as_deref() {
        validate_description(description)?;
    }
    if let Some(minutes) = patch.time_estimate {
        validate_time_estimate(minutes)?;
    }
    Ok(())
}
