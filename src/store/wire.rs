//! Wire model for the remote todo service. Field names and encodings
//! differ from the client model: priority travels as its numeric rank,
//! completion as a boolean flag, and all names are snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Priority, Tag, Task, TaskDraft, TaskPatch, TaskStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTask {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: u8,
    pub is_completed: bool,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_estimate: Option<u32>,
    #[serde(default)]
    pub tags: Vec<RemoteTag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTag {
    pub id: Uuid,
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Paginated list envelope returned by the collection route.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskPage {
    pub items: Vec<RemoteTask>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub pages: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskBody {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_estimate: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<Uuid>,
}

/// Patch body: absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTaskBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_estimate: Option<u32>,
}

impl From<RemoteTask> for Task {
    fn from(remote: RemoteTask) -> Self {
        Task {
            id: remote.id,
            title: remote.title,
            description: remote.description,
            priority: Priority::from_rank(remote.priority),
            status: if remote.is_completed {
                TaskStatus::Completed
            } else {
                TaskStatus::Active
            },
            deadline: remote.deadline,
            time_estimate: remote.time_estimate,
            tags: remote.tags.into_iter().map(Tag::from).collect(),
            created_at: remote.created_at,
            updated_at: remote.updated_at,
        }
    }
}

impl From<RemoteTag> for Tag {
    fn from(remote: RemoteTag) -> Self {
        Tag {
            id: remote.id,
            label: remote.label,
            color: remote.color,
        }
    }
}

impl From<&TaskDraft> for CreateTaskBody {
    fn from(draft: &TaskDraft) -> Self {
        CreateTaskBody {
            title: draft.title.trim().to_string(),
            description: draft.description.clone(),
            priority: draft.priority.unwrap_or(Priority::Medium).rank(),
            deadline: draft.deadline,
            time_estimate: draft.time_estimate,
            tag_ids: draft.tag_ids.clone(),
        }
    }
}

impl From<&TaskPatch> for UpdateTaskBody {
    fn from(patch: &TaskPatch) -> Self {
        UpdateTaskBody {
            title: patch.title.as_deref().map(|title| title.trim().to_string()),
            description: patch.description.clone(),
            priority: patch.priority.map(Priority::rank),
            is_completed: patch.status.map(|status| status == TaskStatus::Completed),
            deadline: patch.deadline,
            time_estimate: patch.time_estimate,
        }
    }
}
