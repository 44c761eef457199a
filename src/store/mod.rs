//! Remote task store client. Single source of truth for the task
//! collection: reads go through a whole-collection cache that every
//! successful mutation invalidates, so the next read refetches.

pub mod error;
pub mod wire;

use std::sync::Mutex;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};
use uuid::Uuid;

pub use error::StoreError;

use crate::types::{Task, TaskDraft, TaskPatch, TaskStatus, validate_draft, validate_patch};
use wire::{CreateTaskBody, RemoteTask, TaskPage, UpdateTaskBody};

// Server-side cap on list page size.
const LIST_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub request_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            bearer_token: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Result of a fan-out bulk operation. Individual failures never abort
/// the fan-out; they are counted and reported.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct BulkOutcome {
    pub done: usize,
    pub failed: usize,
}

impl BulkOutcome {
    pub fn summary(&self, verb: &str) -> String {
        if self.failed == 0 {
            format!("{} task(s) {verb}", self.done)
        } else {
            format!("{} task(s) {verb}, {} failed", self.done, self.failed)
        }
    }
}

#[derive(Debug, Default)]
struct CollectionCache {
    tasks: Option<Vec<Task>>,
    generation: u64,
}

#[derive(Debug)]
pub struct TaskStore {
    config: StoreConfig,
    client: reqwest::Client,
    cache: Mutex<CollectionCache>,
}

impl TaskStore {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            config,
            client,
            cache: Mutex::new(CollectionCache::default()),
        })
    }

    /// Cached snapshot, if any. `None` after an invalidation.
    pub fn cached(&self) -> Option<Vec<Task>> {
        self.lock_cache().tasks.clone()
    }

    /// Bumps whenever the cached collection identity changes. Consumers
    /// use it to detect that derived views must be recomputed.
    pub fn generation(&self) -> u64 {
        self.lock_cache().generation
    }

    pub fn invalidate(&self) {
        let mut cache = self.lock_cache();
        cache.tasks = None;
        cache.generation += 1;
    }

    /// Fetches the full collection, replacing the cache wholesale. The
    /// caller must not assume partial results on failure: the previous
    /// cache survives an error untouched.
    pub async fn fetch_all(&self) -> Result<Vec<Task>, StoreError> {
        let url = format!(
            "{}/tasks?offset=0&limit={LIST_PAGE_LIMIT}",
            self.config.base_url
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.token()?)
            .send()
            .await?;

        let page: TaskPage = self.parse_response(response, None).await?;
        if page.total > page.items.len() as u64 {
            // Single-page consumption; server-side paging stays future work.
            warn!(
                total = page.total,
                fetched = page.items.len(),
                "task collection exceeds one page, truncating"
            );
        }

        let tasks: Vec<Task> = page.items.into_iter().map(Task::from).collect();
        let mut cache = self.lock_cache();
        cache.tasks = Some(tasks.clone());
        cache.generation += 1;
        Ok(tasks)
    }

    pub async fn create(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        validate_draft(draft).map_err(|message| StoreError::Validation { message })?;

        let url = format!("{}/tasks", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.token()?)
            .json(&CreateTaskBody::from(draft))
            .send()
            .await?;

        let remote: RemoteTask = self.parse_response(response, None).await?;
        self.invalidate();
        Ok(Task::from(remote))
    }

    pub async fn update(&self, id: Uuid, patch: &TaskPatch) -> Result<Task, StoreError> {
        validate_patch(patch).map_err(|message| StoreError::Validation { message })?;

        let url = format!("{}/tasks/{id}", self.config.base_url);
        let response = self
            .client
            .patch(&url)
            .bearer_auth(self.token()?)
            .json(&UpdateTaskBody::from(patch))
            .send()
            .await?;

        let remote: RemoteTask = self.parse_response(response, Some(id)).await?;
        self.invalidate();
        Ok(Task::from(remote))
    }

    pub async fn toggle_status(&self, id: Uuid, status: TaskStatus) -> Result<Task, StoreError> {
        self.update(id, &TaskPatch::status_only(status)).await
    }

    /// Idempotent for the caller: deleting an already-deleted task is
    /// treated as success.
    pub async fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        let url = format!("{}/tasks/{id}", self.config.base_url);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(self.token()?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            match error::classify_status(status.as_u16(), &body, Some(id)) {
                StoreError::NotFound { id } => {
                    debug!(%id, "delete target already gone");
                }
                err => return Err(err),
            }
        }
        self.invalidate();
        Ok(())
    }

    pub async fn bulk_remove(&self, ids: &[Uuid]) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for &id in ids {
            match self.remove(id).await {
                Ok(()) => outcome.done += 1,
                Err(err) => {
                    warn!(%id, error = %err, "bulk delete entry failed");
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }

    pub async fn bulk_update_status(&self, ids: &[Uuid], status: TaskStatus) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for &id in ids {
            match self.toggle_status(id, status).await {
                Ok(_) => outcome.done += 1,
                Err(err) => {
                    warn!(%id, error = %err, "bulk status entry failed");
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }

    fn token(&self) -> Result<&str, StoreError> {
        self.config
            .bearer_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(StoreError::missing_token)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
        id: Option<Uuid>,
    ) -> Result<T, StoreError> {
        let status = response.status();
        if status.is_success() && status != StatusCode::NO_CONTENT {
            return response.json::<T>().await.map_err(StoreError::from);
        }
        let body = response.text().await.unwrap_or_default();
        Err(error::classify_status(status.as_u16(), &body, id))
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, CollectionCache> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
