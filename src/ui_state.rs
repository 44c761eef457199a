//! Shared, injectable UI state: filters, sort key, search query, and the
//! bulk-action selection set. Passed explicitly into the display
//! derivation rather than living as ambient global state.

use std::collections::HashSet;

use uuid::Uuid;

use crate::display::{FilterSpec, SortKey};

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct UiState {
    pub filters: FilterSpec,
    pub sort_by: SortKey,
    pub search_query: String,
    pub selected_task_ids: HashSet<Uuid>,
    pub completed_collapsed: bool,
}

impl UiState {
    pub fn reset_filters(&mut self) {
        self.filters = FilterSpec::default();
        self.search_query.clear();
    }

    pub fn has_active_filters(&self) -> bool {
        !self.filters.is_pass_through() || !self.search_query.trim().is_empty()
    }

    pub fn toggle_selection(&mut self, id: Uuid) {
        if !self.selected_task_ids.remove(&id) {
            self.selected_task_ids.insert(id);
        }
    }

    pub fn select_all(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        self.selected_task_ids = ids.into_iter().collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected_task_ids.clear();
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.selected_task_ids.contains(&id)
    }

    /// Drops selections pointing at tasks no longer in the collection,
    /// e.g. after a refetch removed them.
    pub fn retain_selection(&mut self, existing: &HashSet<Uuid>) {
        self.selected_task_ids.retain(|id| existing.contains(id));
    }

    pub fn selection_as_vec(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.selected_task_ids.iter().copied().collect();
        ids.sort();
        ids
    }
}
