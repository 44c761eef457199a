pub mod dialogs;
pub mod messages;
pub mod mutations;
pub mod state;
pub mod update;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;
use uuid::Uuid;

pub use self::messages::Message;
pub use self::state::{
    ActiveDialog, BulkDeleteDialogState, ConfirmCancelField, DeleteTaskDialogState,
    ErrorDialogState, TaskFormField, TaskFormState,
};

use self::mutations::{MutationAction, MutationController, Outcome};
use crate::display::{EmptyKind, FilterSpec, StatusFilter, classify_empty, display_list};
use crate::settings::Settings;
use crate::store::{StoreConfig, StoreError, TaskStore};
use crate::types::{Task, TaskStatus};
use crate::ui_state::UiState;
use crate::window::ListWindow;

pub struct App {
    pub should_quit: bool,
    pub viewport: (u16, u16),
    pub settings: Settings,
    /// Snapshot of the raw collection, mirroring the store cache.
    pub tasks: Vec<Task>,
    /// False until the first fetch outcome lands.
    pub loaded: bool,
    pub fetch_error: Option<String>,
    pub ui: UiState,
    /// Derived display list; recomputed, never edited in place.
    pub display: Vec<Task>,
    pub window: ListWindow,
    pub selected_index: usize,
    pub active_dialog: ActiveDialog,
    pub footer_notice: Option<String>,
    pub search_mode: bool,
    /// Tasks with a toggle in flight, to swallow repeated toggles.
    toggling: HashSet<Uuid>,
    mutations: MutationController,
}

impl App {
    pub fn new(settings: Settings) -> Result<Self> {
        let store = TaskStore::new(StoreConfig {
            base_url: settings.api_base_url.clone(),
            bearer_token: settings.bearer_token(),
            request_timeout: settings.request_timeout(),
        })
        .context("failed to build task store client")?;

        let window = ListWindow::new(settings.row_height, settings.overscan);
        let mut app = Self {
            should_quit: false,
            viewport: (80, 24),
            settings,
            tasks: Vec::new(),
            loaded: false,
            fetch_error: None,
            ui: UiState::default(),
            display: Vec::new(),
            window,
            selected_index: 0,
            active_dialog: ActiveDialog::None,
            footer_notice: None,
            search_mode: false,
            toggling: HashSet::new(),
            mutations: MutationController::new(Arc::new(store)),
        };
        app.mutations.request_fetch();
        Ok(app)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        self.mutations.store()
    }

    pub fn fetching(&self) -> bool {
        self.mutations.fetch_in_flight()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.display.get(self.selected_index)
    }

    pub fn is_toggling(&self, id: Uuid) -> bool {
        self.toggling.contains(&id)
    }

    /// The filter handed to the engine. The collapsed-completed
    /// preference is applied here as policy so the engine itself stays a
    /// pure function of its inputs.
    pub fn effective_filter(&self) -> FilterSpec {
        let mut filter = self.ui.filters;
        if self.ui.completed_collapsed && filter.status == StatusFilter::All {
            filter.status = StatusFilter::Active;
        }
        filter
    }

    pub fn empty_kind(&self) -> EmptyKind {
        classify_empty(self.tasks.len())
    }

    /// Rederives the display list and resizes the window. The cursor
    /// resets when the list identity changed (new filter/sort/search)
    /// and only clamps when the same view was refreshed with new data.
    pub fn refresh_display(&mut self, reset_cursor: bool) {
        let filter = self.effective_filter();
        self.display = display_list(&self.tasks, &filter, &self.ui.search_query, self.ui.sort_by);
        self.window.set_count(self.display.len());

        if reset_cursor {
            self.selected_index = 0;
            self.window.set_scroll_offset(0);
        } else {
            self.selected_index = self
                .selected_index
                .min(self.display.len().saturating_sub(1));
            self.window.scroll_to_row(self.selected_index);
        }

        let existing: HashSet<Uuid> = self.tasks.iter().map(|task| task.id).collect();
        self.ui.retain_selection(&existing);
    }

    pub fn move_selection_by(&mut self, delta: isize) {
        if self.display.is_empty() {
            return;
        }
        let max_index = (self.display.len() - 1) as isize;
        self.selected_index = (self.selected_index as isize + delta).clamp(0, max_index) as usize;
        self.window.scroll_to_row(self.selected_index);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
        self.window.scroll_to_row(0);
    }

    pub fn select_last(&mut self) {
        if !self.display.is_empty() {
            self.selected_index = self.display.len() - 1;
            self.window.scroll_to_row(self.selected_index);
        }
    }

    /// Rows the viewport fits, for page-wise movement.
    pub fn rows_per_page(&self) -> usize {
        let list_height = self.viewport.1.saturating_sub(6) as usize;
        (list_height / self.window.row_height()).max(1)
    }

    pub fn request_refresh(&mut self) {
        self.store().invalidate();
        self.mutations.request_fetch();
    }

    pub fn toggle_selected_task_status(&mut self) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let (id, next) = (task.id, task.status.toggled());
        // The toggle control stays disabled until its outcome lands.
        if !self.toggling.insert(id) {
            return;
        }
        self.mutations.submit_toggle(id, next);
    }

    pub fn open_bulk_delete_dialog(&mut self) {
        if self.ui.selected_task_ids.is_empty() || self.mutations.bulk_in_flight() {
            return;
        }
        self.active_dialog = ActiveDialog::BulkDelete(BulkDeleteDialogState {
            task_ids: self.ui.selection_as_vec(),
            focused_field: ConfirmCancelField::Cancel,
            submitting: false,
        });
    }

    pub fn submit_bulk_status(&mut self, status: TaskStatus) {
        if self.ui.selected_task_ids.is_empty() || self.mutations.bulk_in_flight() {
            return;
        }
        let ids = self.ui.selection_as_vec();
        self.mutations.submit_bulk_status(ids, status);
        self.footer_notice = Some("Applying status to selection...".to_string());
    }

    fn drain_outcomes(&mut self) {
        for outcome in self.mutations.drain() {
            self.apply_outcome(outcome);
        }
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Fetched(Ok(tasks)) => {
                self.tasks = tasks;
                self.loaded = true;
                self.fetch_error = None;
                self.refresh_display(false);
            }
            Outcome::Fetched(Err(err)) => {
                warn!(error = %err, "task fetch failed");
                self.loaded = true;
                self.fetch_error = Some(err.to_string());
            }
            Outcome::Mutated {
                action,
                target,
                result,
            } => {
                if action == MutationAction::Toggle
                    && let Some(id) = target
                {
                    self.toggling.remove(&id);
                }
                match result {
                    Ok(notice) => self.apply_mutation_success(action, notice),
                    Err(err) => self.apply_mutation_failure(action, err),
                }
            }
        }
    }

    fn apply_mutation_success(&mut self, action: MutationAction, notice: String) {
        self.footer_notice = Some(notice);
        match (&self.active_dialog, action) {
            (ActiveDialog::TaskForm(form), MutationAction::Create | MutationAction::Edit)
                if form.submitting =>
            {
                self.active_dialog = ActiveDialog::None;
            }
            (ActiveDialog::DeleteTask(dialog), MutationAction::Delete) if dialog.submitting => {
                self.active_dialog = ActiveDialog::None;
            }
            (ActiveDialog::BulkDelete(dialog), MutationAction::BulkDelete) if dialog.submitting => {
                self.active_dialog = ActiveDialog::None;
            }
            _ => {}
        }
        if matches!(action, MutationAction::BulkDelete | MutationAction::BulkStatus) {
            self.ui.clear_selection();
        }
        // The store invalidated its cache on success; pull fresh data.
        self.mutations.request_fetch();
    }

    /// Errors hand control back to their triggering surface; nothing is
    /// left disabled after a failure.
    fn apply_mutation_failure(&mut self, action: MutationAction, err: StoreError) {
        warn!(error = %err, ?action, "mutation failed");
        let friendly = err.to_string();
        match (&mut self.active_dialog, action) {
            (ActiveDialog::TaskForm(form), MutationAction::Create | MutationAction::Edit) => {
                form.submitting = false;
                form.error_message = Some(friendly);
            }
            (ActiveDialog::DeleteTask(_), MutationAction::Delete) => {
                self.active_dialog = ActiveDialog::Error(ErrorDialogState {
                    title: err.headline().to_string(),
                    detail: friendly,
                });
            }
            (ActiveDialog::BulkDelete(dialog), MutationAction::BulkDelete) => {
                dialog.submitting = false;
                self.footer_notice = Some(friendly);
            }
            _ => {
                self.footer_notice = Some(friendly);
            }
        }
        if matches!(err, StoreError::NotFound { .. }) {
            // The target vanished underneath us; resync.
            self.request_refresh();
        }
    }
}
