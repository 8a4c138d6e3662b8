use crossterm::event::{KeyCode, KeyEvent};

use crate::model::task::{Category, Priority, Stage, SubTask};
use crate::tui::app::{App, FormField, FormState, FormTarget, step};

use super::*;

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    let Some(form) = app.form.as_mut() else {
        app.mode = crate::tui::app::Mode::Navigate;
        return;
    };

    if key.code == KeyCode::Esc {
        app.close_dialog();
        return;
    }
    if is_ctrl(&key, 's') {
        submit_form(app);
        return;
    }

    match key.code {
        KeyCode::Tab => {
            form.focus(form.field.next());
            return;
        }
        KeyCode::BackTab => {
            form.focus(form.field.prev());
            return;
        }
        _ => {}
    }

    match form.field {
        FormField::Category | FormField::Priority | FormField::Stage => {
            let forward = match key.code {
                KeyCode::Right | KeyCode::Char(' ') | KeyCode::Char('l') => true,
                KeyCode::Left | KeyCode::Char('h') => false,
                KeyCode::Enter => {
                    submit_form(app);
                    return;
                }
                KeyCode::Down => {
                    form.focus(form.field.next());
                    return;
                }
                KeyCode::Up => {
                    form.focus(form.field.prev());
                    return;
                }
                _ => return,
            };
            cycle_choice(form, forward);
        }
        FormField::Subtasks => handle_subtask_keys(form, key),
        FormField::Title | FormField::Description => match key.code {
            KeyCode::Enter => submit_form(app),
            KeyCode::Down => form.focus(form.field.next()),
            KeyCode::Up => form.focus(form.field.prev()),
            _ => {
                let mut cursor = form.cursor;
                if let Some(buf) = form.text_mut() {
                    edit_text(buf, &mut cursor, key);
                }
                form.cursor = cursor;
                form.error = None;
            }
        },
    }
}

fn cycle_choice(form: &mut FormState, forward: bool) {
    match form.field {
        FormField::Category => form.category = step(&Category::ALL, form.category, forward),
        FormField::Priority => form.priority = step(&Priority::ALL, form.priority, forward),
        FormField::Stage => form.stage = step(&Stage::ALL, form.stage, forward),
        _ => {}
    }
}

/// The sub-task field: type a title and press Enter to append it; ↑↓ select,
/// Ctrl-T toggles and Ctrl-D removes the selected row.
fn handle_subtask_keys(form: &mut FormState, key: KeyEvent) {
    if is_ctrl(&key, 't') {
        if let Some(sub) = form.subtasks.get_mut(form.subtask_cursor) {
            sub.completed = !sub.completed;
        }
        return;
    }
    if is_ctrl(&key, 'd') {
        if form.subtask_cursor < form.subtasks.len() {
            form.subtasks.remove(form.subtask_cursor);
            form.subtask_cursor = form
                .subtask_cursor
                .min(form.subtasks.len().saturating_sub(1));
        }
        return;
    }
    match key.code {
        KeyCode::Enter => {
            let title = form.subtask_input.trim();
            if title.is_empty() {
                form.error = Some("sub-task title cannot be empty".into());
                return;
            }
            form.subtasks.push(SubTask::new(title.to_string()));
            form.subtask_cursor = form.subtasks.len() - 1;
            form.subtask_input.clear();
            form.cursor = 0;
            form.error = None;
        }
        KeyCode::Up => {
            if form.subtask_cursor == 0 {
                form.focus(form.field.prev());
            } else {
                form.subtask_cursor -= 1;
            }
        }
        KeyCode::Down => {
            if form.subtask_cursor + 1 < form.subtasks.len() {
                form.subtask_cursor += 1;
            }
        }
        _ => {
            edit_text(&mut form.subtask_input, &mut form.cursor, key);
            form.error = None;
        }
    }
}

/// Apply the form. A blank title keeps the dialog open with an error.
pub(super) fn submit_form(app: &mut App) {
    let Some(form) = app.form.as_mut() else {
        return;
    };
    let Some(command) = form.to_command() else {
        form.error = Some("title cannot be empty".into());
        form.focus(FormField::Title);
        return;
    };
    let edited = match &form.target {
        FormTarget::Edit { id } => Some(id.clone()),
        FormTarget::Add => None,
    };
    app.close_dialog();
    let created = app.dispatch(command);
    if let Some(id) = created.or(edited) {
        app.focus_task(&id);
    }
}
