//! Mutation controller: turns user intents into store calls running on
//! spawned tasks, with outcomes delivered back through a channel that
//! the UI drains on ticks. A dialog dismissed mid-flight simply never
//! sees its outcome; the refetch it triggered still lands.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};

use tracing::debug;
use uuid::Uuid;

use crate::store::{StoreError, TaskStore};
use crate::types::{Task, TaskDraft, TaskPatch, TaskStatus};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MutationAction {
    Create,
    Edit,
    Toggle,
    Delete,
    BulkDelete,
    BulkStatus,
}

#[derive(Debug)]
pub enum Outcome {
    /// A collection fetch finished; on success the raw cache snapshot is
    /// replaced wholesale.
    Fetched(Result<Vec<Task>, StoreError>),
    /// A mutation finished; `Ok` carries a footer notice. `target` is
    /// the task the intent addressed, when there was a single one.
    Mutated {
        action: MutationAction,
        target: Option<Uuid>,
        result: Result<String, StoreError>,
    },
}

pub struct MutationController {
    store: Arc<TaskStore>,
    outcome_tx: Sender<Outcome>,
    outcome_rx: Receiver<Outcome>,
    fetch_in_flight: bool,
    bulk_in_flight: bool,
}

impl MutationController {
    pub fn new(store: Arc<TaskStore>) -> Self {
        let (outcome_tx, outcome_rx) = channel();
        Self {
            store,
            outcome_tx,
            outcome_rx,
            fetch_in_flight: false,
            bulk_in_flight: false,
        }
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    pub fn bulk_in_flight(&self) -> bool {
        self.bulk_in_flight
    }

    /// Drains every outcome that arrived since the last tick. Resets the
    /// in-flight markers as their outcomes land.
    pub fn drain(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        loop {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => {
                    match &outcome {
                        Outcome::Fetched(_) => self.fetch_in_flight = false,
                        Outcome::Mutated {
                            action: MutationAction::BulkDelete | MutationAction::BulkStatus,
                            ..
                        } => self.bulk_in_flight = false,
                        Outcome::Mutated { .. } => {}
                    }
                    outcomes.push(outcome);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        outcomes
    }

    /// Starts a collection fetch unless one is already running.
    pub fn request_fetch(&mut self) {
        if self.fetch_in_flight {
            debug!("fetch already in flight, skipping");
            return;
        }
        self.fetch_in_flight = true;
        let store = Arc::clone(&self.store);
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = store.fetch_all().await;
            let _ = tx.send(Outcome::Fetched(result));
        });
    }

    pub fn submit_create(&self, draft: TaskDraft) {
        let store = Arc::clone(&self.store);
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = store
                .create(&draft)
                .await
                .map(|task| format!("Created \"{}\"", task.title));
            let _ = tx.send(Outcome::Mutated {
                action: MutationAction::Create,
                target: None,
                result,
            });
        });
    }

    pub fn submit_edit(&self, id: Uuid, patch: TaskPatch) {
        let store = Arc::clone(&self.store);
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = store
                .update(id, &patch)
                .await
                .map(|task| format!("Updated \"{}\"", task.title));
            let _ = tx.send(Outcome::Mutated {
                action: MutationAction::Edit,
                target: Some(id),
                result,
            });
        });
    }

    pub fn submit_toggle(&self, id: Uuid, status: TaskStatus) {
        let store = Arc::clone(&self.store);
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = store.toggle_status(id, status).await.map(|task| {
                if task.is_completed() {
                    format!("Completed \"{}\"", task.title)
                } else {
                    format!("Reopened \"{}\"", task.title)
                }
            });
            let _ = tx.send(Outcome::Mutated {
                action: MutationAction::Toggle,
                target: Some(id),
                result,
            });
        });
    }

    pub fn submit_delete(&self, id: Uuid, title: String) {
        let store = Arc::clone(&self.store);
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = store
                .remove(id)
                .await
                .map(|()| format!("Deleted \"{title}\""));
            let _ = tx.send(Outcome::Mutated {
                action: MutationAction::Delete,
                target: Some(id),
                result,
            });
        });
    }

    pub fn submit_bulk_delete(&mut self, ids: Vec<Uuid>) {
        if self.bulk_in_flight || ids.is_empty() {
            return;
        }
        self.bulk_in_flight = true;
        let store = Arc::clone(&self.store);
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = store.bulk_remove(&ids).await;
            let _ = tx.send(Outcome::Mutated {
                action: MutationAction::BulkDelete,
                target: None,
                result: Ok(outcome.summary("deleted")),
            });
        });
    }

    pub fn submit_bulk_status(&mut self, ids: Vec<Uuid>, status: TaskStatus) {
        if self.bulk_in_flight || ids.is_empty() {
            return;
        }
        self.bulk_in_flight = true;
        let store = Arc::clone(&self.store);
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let verb = match status {
                TaskStatus::Completed => "completed",
                TaskStatus::Active => "reopened",
            };
            let outcome = store.bulk_update_status(&ids, status).await;
            let _ = tx.send(Outcome::Mutated {
                action: MutationAction::BulkStatus,
                target: None,
                result: Ok(outcome.summary(verb)),
            });
        });
    }
}
