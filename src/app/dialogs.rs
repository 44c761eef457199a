//! Key handling for the modal dialogs. While a submission is in flight
//! every control in the dialog is inert; the outcome drained on the next
//! tick decides whether it closes or reports an error.

use anyhow::Result;
use tuirealm::event::{Key, KeyEvent, KeyModifiers};

use super::state::{ActiveDialog, ConfirmCancelField, TaskFormField};
use super::App;
use crate::types::Priority;

impl App {
    pub(super) fn handle_dialog_key(&mut self, key: KeyEvent) -> Result<()> {
        match &mut self.active_dialog {
            ActiveDialog::None => {}
            ActiveDialog::TaskForm(_) => self.handle_task_form_key(key),
            ActiveDialog::DeleteTask(_) => self.handle_delete_dialog_key(key),
            ActiveDialog::BulkDelete(_) => self.handle_bulk_delete_key(key),
            ActiveDialog::Error(_) => {
                if matches!(key.code, Key::Enter | Key::Esc) {
                    self.active_dialog = ActiveDialog::None;
                }
            }
        }
        Ok(())
    }

    fn handle_task_form_key(&mut self, key: KeyEvent) {
        let ActiveDialog::TaskForm(form) = &mut self.active_dialog else {
            return;
        };
        if form.submitting {
            return;
        }
        match key.code {
            Key::Esc => {
                self.active_dialog = ActiveDialog::None;
            }
            Key::Tab | Key::Down => {
                form.focused_field = form.focused_field.next();
            }
            Key::BackTab | Key::Up => {
                form.focused_field = form.focused_field.previous();
            }
            Key::Left if form.focused_field == TaskFormField::Priority => {
                form.priority = Priority::from_rank((form.priority.rank() + 3) % 4);
            }
            Key::Right if form.focused_field == TaskFormField::Priority => {
                form.priority = Priority::from_rank((form.priority.rank() + 1) % 4);
            }
            Key::Enter => match form.focused_field {
                TaskFormField::Cancel => {
                    self.active_dialog = ActiveDialog::None;
                }
                _ => self.submit_task_form(),
            },
            Key::Backspace => {
                if let Some(input) = form.focused_input_mut() {
                    input.pop();
                    form.error_message = None;
                }
            }
            Key::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                if let Some(input) = form.focused_input_mut() {
                    input.push(c);
                    form.error_message = None;
                }
            }
            _ => {}
        }
    }

    fn submit_task_form(&mut self) {
        let ActiveDialog::TaskForm(form) = &mut self.active_dialog else {
            return;
        };
        if let Some(task_id) = form.task_id {
            match form.to_patch() {
                Ok(patch) => {
                    form.submitting = true;
                    form.error_message = None;
                    self.mutations.submit_edit(task_id, patch);
                }
                Err(message) => form.error_message = Some(message),
            }
        } else {
            match form.to_draft() {
                Ok(draft) => {
                    form.submitting = true;
                    form.error_message = None;
                    self.mutations.submit_create(draft);
                }
                Err(message) => form.error_message = Some(message),
            }
        }
    }

    fn handle_delete_dialog_key(&mut self, key: KeyEvent) {
        let ActiveDialog::DeleteTask(dialog) = &mut self.active_dialog else {
            return;
        };
        if dialog.submitting {
            return;
        }
        match key.code {
            Key::Esc | Key::Char('n') => {
                self.active_dialog = ActiveDialog::None;
            }
            Key::Left | Key::Right | Key::Tab => {
                dialog.focused_field = dialog.focused_field.toggled();
            }
            Key::Char('y') => {
                dialog.submitting = true;
                self.mutations
                    .submit_delete(dialog.task_id, dialog.task_title.clone());
            }
            Key::Enter => match dialog.focused_field {
                ConfirmCancelField::Cancel => {
                    self.active_dialog = ActiveDialog::None;
                }
                ConfirmCancelField::Confirm => {
                    dialog.submitting = true;
                    self.mutations
                        .submit_delete(dialog.task_id, dialog.task_title.clone());
                }
            },
            _ => {}
        }
    }

    fn handle_bulk_delete_key(&mut self, key: KeyEvent) {
        let ActiveDialog::BulkDelete(dialog) = &mut self.active_dialog else {
            return;
        };
        if dialog.submitting {
            return;
        }
        match key.code {
            Key::Esc | Key::Char('n') => {
                self.active_dialog = ActiveDialog::None;
            }
            Key::Left | Key::Right | Key::Tab => {
                dialog.focused_field = dialog.focused_field.toggled();
            }
            Key::Char('y') => {
                dialog.submitting = true;
                self.mutations.submit_bulk_delete(dialog.task_ids.clone());
            }
            Key::Enter => match dialog.focused_field {
                ConfirmCancelField::Cancel => {
                    self.active_dialog = ActiveDialog::None;
                }
                ConfirmCancelField::Confirm => {
                    dialog.submitting = true;
                    self.mutations.submit_bulk_delete(dialog.task_ids.clone());
                }
            },
            _ => {}
        }
    }
}
