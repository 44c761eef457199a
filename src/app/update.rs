//! Central update dispatch. Key handling is layered: an open dialog
//! captures everything, search mode captures text keys, and only then
//! do the list bindings apply.

use anyhow::Result;
use tuirealm::event::{Key, KeyEvent, KeyModifiers};

use super::state::{ActiveDialog, DeleteTaskDialogState, TaskFormState};
use super::{App, Message};
use crate::types::TaskStatus;

impl App {
    pub fn update(&mut self, message: Message) -> Result<()> {
        match message {
            Message::Tick => self.drain_outcomes(),
            Message::Resize(width, height) => {
                self.viewport = (width, height);
                self.window
                    .set_viewport_height(height.saturating_sub(6) as usize);
                self.window.scroll_to_row(self.selected_index);
            }
            Message::ScrollUp => self.move_selection_by(-1),
            Message::ScrollDown => self.move_selection_by(1),
            Message::Key(key) => self.handle_key(key)?,
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if !self.active_dialog.is_none() {
            return self.handle_dialog_key(key);
        }
        if self.search_mode {
            self.handle_search_key(key);
            return Ok(());
        }
        self.handle_list_key(key)
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            Key::Esc => {
                self.search_mode = false;
                if !self.ui.search_query.is_empty() {
                    self.ui.search_query.clear();
                    self.refresh_display(true);
                }
            }
            Key::Enter => {
                self.search_mode = false;
            }
            Key::Backspace => {
                if self.ui.search_query.pop().is_some() {
                    self.refresh_display(true);
                }
            }
            Key::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                self.ui.search_query.push(c);
                self.refresh_display(true);
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            Key::Char('q') => self.should_quit = true,
            Key::Esc => {
                if !self.ui.search_query.is_empty() {
                    self.ui.search_query.clear();
                    self.refresh_display(true);
                } else if !self.ui.selected_task_ids.is_empty() {
                    self.ui.clear_selection();
                } else {
                    self.footer_notice = None;
                }
            }

            Key::Char('j') | Key::Down => self.move_selection_by(1),
            Key::Char('k') | Key::Up => self.move_selection_by(-1),
            Key::PageDown => self.move_selection_by(self.rows_per_page() as isize),
            Key::PageUp => self.move_selection_by(-(self.rows_per_page() as isize)),
            Key::Char('g') | Key::Home => self.select_first(),
            Key::Char('G') | Key::End => self.select_last(),

            Key::Char('r') => {
                if self.fetch_error.is_some() || !self.fetching() {
                    self.fetch_error = None;
                    self.request_refresh();
                }
            }

            Key::Char('n') => {
                self.active_dialog = ActiveDialog::TaskForm(TaskFormState::new_task());
            }
            Key::Char('e') | Key::Enter => {
                if let Some(task) = self.selected_task() {
                    self.active_dialog = ActiveDialog::TaskForm(TaskFormState::edit_task(task));
                }
            }
            Key::Char('d') => {
                if let Some(task) = self.selected_task() {
                    self.active_dialog = ActiveDialog::DeleteTask(DeleteTaskDialogState::for_task(task));
                }
            }
            Key::Char(' ') => self.toggle_selected_task_status(),

            Key::Char('x') => {
                if let Some(task) = self.selected_task() {
                    let id = task.id;
                    self.ui.toggle_selection(id);
                }
            }
            Key::Char('a') => {
                let ids: Vec<_> = self.display.iter().map(|task| task.id).collect();
                self.ui.select_all(ids);
            }
            Key::Char('D') => self.open_bulk_delete_dialog(),
            Key::Char('C') => self.submit_bulk_status(TaskStatus::Completed),
            Key::Char('O') => self.submit_bulk_status(TaskStatus::Active),

            Key::Char('/') => {
                self.search_mode = true;
            }
            Key::Char('s') => {
                self.ui.sort_by = self.ui.sort_by.cycled();
                self.refresh_display(true);
            }
            Key::Char('f') => {
                self.ui.filters.status = self.ui.filters.status.cycled();
                self.refresh_display(true);
            }
            Key::Char('p') => {
                self.ui.filters.priority = self.ui.filters.priority.cycled();
                self.refresh_display(true);
            }
            Key::Char('F') => {
                self.ui.reset_filters();
                self.refresh_display(true);
            }
            Key::Char('c') => {
                self.ui.completed_collapsed = !self.ui.completed_collapsed;
                self.refresh_display(true);
            }
            _ => {}
        }
        Ok(())
    }
}
