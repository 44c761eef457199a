use chrono::Utc;
use tuirealm::Frame;
use tuirealm::ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Wrap,
    },
};

use crate::app::{ActiveDialog, App, ConfirmCancelField, TaskFormField};
use crate::display::EmptyKind;
use crate::types::{Priority, Task, TaskStatus};

pub fn render(frame: &mut Frame<'_>, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    render_filter_bar(frame, chunks[1], app);
    render_list(frame, chunks[2], app);
    render_footer(frame, chunks[3], app);

    if !app.active_dialog.is_none() {
        render_dialog(frame, app);
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let header = Block::default()
        .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
        .title(" taskdeck ")
        .title_alignment(Alignment::Left);

    let sync = if app.fetching() { " syncing..." } else { "" };
    let counts = format!(" {} of {} tasks{} ", app.display.len(), app.tasks.len(), sync);
    let header_right = Block::default()
        .title(counts)
        .title_alignment(Alignment::Right);

    frame.render_widget(header, area);
    frame.render_widget(header_right, area);
}

fn render_filter_bar(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let mut spans = vec![
        Span::raw(" status:"),
        Span::styled(app.ui.filters.status.label(), Style::default().fg(Color::Cyan)),
        Span::raw("  priority:"),
        Span::styled(app.ui.filters.priority.label(), Style::default().fg(Color::Cyan)),
        Span::raw("  sort:"),
        Span::styled(app.ui.sort_by.label(), Style::default().fg(Color::Cyan)),
    ];
    if app.ui.completed_collapsed {
        spans.push(Span::styled(
            "  [completed hidden]",
            Style::default().fg(Color::DarkGray),
        ));
    }
    if !app.ui.selected_task_ids.is_empty() {
        spans.push(Span::styled(
            format!("  {} marked", app.ui.selected_task_ids.len()),
            Style::default().fg(Color::Yellow),
        ));
    }
    if app.search_mode || !app.ui.search_query.is_empty() {
        let cursor = if app.search_mode { "_" } else { "" };
        spans.push(Span::raw("  /"));
        spans.push(Span::styled(
            format!("{}{}", app.ui.search_query, cursor),
            Style::default().fg(Color::Yellow),
        ));
    }

    let bar = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::LEFT | Borders::RIGHT));
    frame.render_widget(bar, area);
}

fn render_list(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let block = Block::default().borders(Borders::LEFT | Borders::RIGHT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    app.window.set_viewport_height(inner.height as usize);
    app.window.scroll_to_row(app.selected_index);

    if let Some(error) = app.fetch_error.clone() {
        render_fetch_error(frame, inner, &error);
        return;
    }
    if !app.loaded {
        frame.render_widget(
            Paragraph::new("Loading tasks...").alignment(Alignment::Center),
            inner,
        );
        return;
    }
    if app.display.is_empty() {
        render_empty_state(frame, inner, app.empty_kind());
        return;
    }

    let row_height = app.window.row_height();
    for row in app.window.rows() {
        let screen_top = app.window.row_screen_top(row.index);
        if screen_top + row_height as isize <= 0 || screen_top >= inner.height as isize {
            // Overscan rows outside the viewport are materialized, not drawn.
            continue;
        }

        let Some(task) = app.display.get(row.index) else {
            continue;
        };
        let mut lines = task_row_lines(app, task, row.index == app.selected_index, row_height);

        // Clip rows straddling the viewport edges.
        let skip = (-screen_top).max(0) as usize;
        let y = inner.y + screen_top.max(0) as u16;
        let available = (inner.y + inner.height).saturating_sub(y) as usize;
        if skip > 0 {
            lines.drain(..skip.min(lines.len()));
        }
        lines.truncate(available);
        if lines.is_empty() {
            continue;
        }

        let row_area = Rect {
            x: inner.x,
            y,
            width: inner.width,
            height: lines.len() as u16,
        };
        let style = if row.index == app.selected_index {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        frame.render_widget(Paragraph::new(lines).style(style), row_area);
    }

    if app.window.total_height() > inner.height as usize {
        let mut scrollbar_state = ScrollbarState::new(
            app.window
                .total_height()
                .saturating_sub(inner.height as usize),
        )
        .position(app.window.scroll_offset());
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_style(Style::default().fg(Color::Gray).bg(Color::DarkGray))
            .track_symbol(Some("│"))
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        frame.render_stateful_widget(
            scrollbar,
            Rect {
                x: area.x + area.width.saturating_sub(1),
                y: inner.y,
                width: 1,
                height: inner.height,
            },
            &mut scrollbar_state,
        );
    }
}

fn task_row_lines<'a>(
    app: &App,
    task: &'a Task,
    is_cursor: bool,
    row_height: usize,
) -> Vec<Line<'a>> {
    let prefix = if is_cursor { "▸" } else { " " };
    let mark = if app.ui.is_selected(task.id) {
        "[x]"
    } else {
        "[ ]"
    };
    let status_icon = if app.is_toggling(task.id) {
        "◐"
    } else {
        match task.status {
            TaskStatus::Active => "○",
            TaskStatus::Completed => "●",
        }
    };
    let title_style = if task.status == TaskStatus::Completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::Yellow)),
        Span::raw(mark),
        Span::raw(" "),
        Span::raw(status_icon),
        Span::raw(" "),
        Span::styled(task.priority.as_str(), priority_style(task.priority)),
        Span::raw(" "),
        Span::styled(task.title.as_str(), title_style),
    ])];

    if row_height >= 2 {
        let mut details: Vec<Span<'a>> = vec![Span::raw("      ")];
        if let Some(deadline) = task.deadline {
            let overdue = task.status == TaskStatus::Active && deadline < Utc::now();
            details.push(Span::styled(
                format!("due {}", deadline.format("%Y-%m-%d")),
                Style::default().fg(if overdue { Color::Red } else { Color::Gray }),
            ));
            details.push(Span::raw("  "));
        }
        if let Some(minutes) = task.time_estimate {
            details.push(Span::styled(
                format!("{minutes}m"),
                Style::default().fg(Color::Gray),
            ));
            details.push(Span::raw("  "));
        }
        if !task.tags.is_empty() {
            let labels: Vec<&str> = task.tags.iter().map(|tag| tag.label.as_str()).collect();
            details.push(Span::styled(
                labels.join(" "),
                Style::default().fg(Color::Blue),
            ));
        }
        if details.len() == 1
            && let Some(description) = task.description.as_deref()
        {
            details.push(Span::styled(description, Style::default().fg(Color::Gray)));
        }
        lines.push(Line::from(details));
    }
    while lines.len() < row_height {
        lines.push(Line::default());
    }
    lines
}

fn priority_style(priority: Priority) -> Style {
    let color = match priority {
        Priority::Critical => Color::Red,
        Priority::High => Color::Yellow,
        Priority::Medium => Color::Cyan,
        Priority::Low => Color::DarkGray,
    };
    Style::default().fg(color)
}

fn render_fetch_error(frame: &mut Frame<'_>, area: Rect, error: &str) {
    let msg = Paragraph::new(format!("{error}\n\nPress r to retry."))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::Red))
                .title(" Connection Problem "),
        );
    frame.render_widget(msg, area);
}

fn render_empty_state(frame: &mut Frame<'_>, area: Rect, kind: EmptyKind) {
    let (title, text) = match kind {
        EmptyKind::NoTasksYet => (
            " Welcome ",
            "No tasks yet. Press n to create your first task.",
        ),
        EmptyKind::NoMatches => (
            " No Matches ",
            "No tasks match the current filters.\nPress F to clear filters, Esc to clear search.",
        ),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let hints = if app.search_mode {
        " type to search  Enter: keep  Esc: clear "
    } else {
        " n: new  e: edit  d: delete  space: toggle done  x: mark  D/C/O: bulk  /: search  s: sort  f/p: filter  q: quit "
    };
    let notice = app.footer_notice.as_deref().unwrap_or(hints);
    let footer = Block::default()
        .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
        .title(format!(" {notice} "))
        .title_alignment(Alignment::Center);
    frame.render_widget(footer, area);
}

fn render_dialog(frame: &mut Frame<'_>, app: &mut App) {
    let (percent_x, percent_y) = match &app.active_dialog {
        ActiveDialog::TaskForm(_) => (70, 80),
        ActiveDialog::DeleteTask(_) => (50, 30),
        ActiveDialog::BulkDelete(_) => (50, 30),
        ActiveDialog::Error(_) => (60, 40),
        ActiveDialog::None => return,
    };

    let area = centered_rect(percent_x, percent_y, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .title(match &app.active_dialog {
            ActiveDialog::TaskForm(form) if form.is_edit() => " Edit Task ",
            ActiveDialog::TaskForm(_) => " New Task ",
            ActiveDialog::DeleteTask(_) => " Delete Task ",
            ActiveDialog::BulkDelete(_) => " Delete Selected ",
            ActiveDialog::Error(_) => " Error ",
            ActiveDialog::None => "",
        })
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    match &app.active_dialog {
        ActiveDialog::TaskForm(form) => {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Min(0),
                ])
                .split(inner_area);

            render_input_field(
                frame,
                layout[0],
                "Title",
                &form.title_input,
                form.focused_field == TaskFormField::Title,
            );
            render_input_field(
                frame,
                layout[1],
                "Description",
                &form.description_input,
                form.focused_field == TaskFormField::Description,
            );
            render_input_field(
                frame,
                layout[2],
                "Priority (left/right to change)",
                &format!("< {} >", form.priority.as_str()),
                form.focused_field == TaskFormField::Priority,
            );
            render_input_field(
                frame,
                layout[3],
                "Deadline (YYYY-MM-DD, empty for none)",
                &form.deadline_input,
                form.focused_field == TaskFormField::Deadline,
            );
            render_input_field(
                frame,
                layout[4],
                "Estimate (minutes, empty for none)",
                &form.estimate_input,
                form.focused_field == TaskFormField::Estimate,
            );

            let button_layout = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(layout[5]);

            let submit_label = if form.submitting {
                "[ Saving... ]"
            } else if form.is_edit() {
                "[ Save ]"
            } else {
                "[ Create ]"
            };
            render_button(
                frame,
                button_layout[0],
                submit_label,
                form.focused_field == TaskFormField::Submit,
            );
            render_button(
                frame,
                button_layout[1],
                "[ Cancel ]",
                form.focused_field == TaskFormField::Cancel,
            );

            if let Some(message) = form.error_message.as_deref() {
                frame.render_widget(
                    Paragraph::new(message)
                        .style(Style::default().fg(Color::Red))
                        .alignment(Alignment::Center)
                        .wrap(Wrap { trim: true }),
                    layout[6],
                );
            }
        }
        ActiveDialog::DeleteTask(dialog) => {
            let text = if dialog.submitting {
                format!("Deleting \"{}\"...", dialog.task_title)
            } else {
                format!("Delete \"{}\"?\nThis cannot be undone.", dialog.task_title)
            };
            render_confirm_body(
                frame,
                inner_area,
                &text,
                dialog.focused_field == ConfirmCancelField::Confirm,
            );
        }
        ActiveDialog::BulkDelete(dialog) => {
            let text = if dialog.submitting {
                format!("Deleting {} tasks...", dialog.task_ids.len())
            } else {
                format!(
                    "Delete {} selected tasks?\nThis cannot be undone.",
                    dialog.task_ids.len()
                )
            };
            render_confirm_body(
                frame,
                inner_area,
                &text,
                dialog.focused_field == ConfirmCancelField::Confirm,
            );
        }
        ActiveDialog::Error(dialog) => {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(3)])
                .split(inner_area);
            frame.render_widget(
                Paragraph::new(format!("{}\n\n{}", dialog.title, dialog.detail))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                layout[0],
            );
            render_button(frame, layout[1], "[ OK ]", true);
        }
        ActiveDialog::None => {}
    }
}

fn render_confirm_body(frame: &mut Frame<'_>, area: Rect, text: &str, confirm_focused: bool) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(3)])
        .split(area);

    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        layout[0],
    );

    let button_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[1]);

    render_button(frame, button_layout[0], "[ Delete ]", confirm_focused);
    render_button(frame, button_layout[1], "[ Cancel ]", !confirm_focused);
}

fn render_input_field(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    value: &str,
    is_focused: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(label)
        .style(if is_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        });
    frame.render_widget(Paragraph::new(value).block(block), area);
}

fn render_button(frame: &mut Frame<'_>, area: Rect, label: &str, is_focused: bool) {
    let (bg, fg) = if is_focused {
        (Color::Blue, Color::White)
    } else {
        (Color::Reset, Color::Reset)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if is_focused {
            Style::default().fg(Color::Blue)
        } else {
            Style::default().fg(Color::Gray)
        })
        .style(Style::default().bg(bg).fg(fg));
    frame.render_widget(
        Paragraph::new(label)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
