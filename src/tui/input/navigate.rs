use crossterm::event::{KeyCode, KeyEvent};

use crate::model::task::Stage;
use crate::ops::board_ops::BoardCommand;
use crate::tui::app::{App, ConfirmAction, Mode, PromptPurpose};

use super::*;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    if is_ctrl(&key, 'c') {
        app.should_quit = true;
        return;
    }
    // Any key acknowledges the last status message
    app.status_message = None;

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,

        // Focus
        KeyCode::Left | KeyCode::Char('h') => app.focused = app.focused.prev(),
        KeyCode::Right | KeyCode::Char('l') => app.focused = app.focused.next(),
        KeyCode::Char(c @ '1'..='4') => {
            if let Some(stage) = Stage::from_index(c as usize - '1' as usize) {
                app.focused = stage;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => move_cursor(app, -1),
        KeyCode::Down | KeyCode::Char('j') => move_cursor(app, 1),
        KeyCode::Home | KeyCode::Char('g') => app.cursors[app.focused.index()] = 0,
        KeyCode::End | KeyCode::Char('G') => {
            let len = app.visible(app.focused).len();
            app.cursors[app.focused.index()] = len.saturating_sub(1);
        }

        // Cards
        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Enter | KeyCode::Char('e') => app.open_edit_form(),
        KeyCode::Char(' ') | KeyCode::Char('x') => {
            if let Some(id) = app.cursor_task_id() {
                app.dispatch(BoardCommand::ToggleDone { id: id.clone() });
                app.focus_task(&id);
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => request_delete(app),
        KeyCode::Char('s') => {
            if let Some(id) = app.cursor_task_id() {
                app.open_prompt(PromptPurpose::Subtask { todo_id: id }, "");
            }
        }
        KeyCode::Char('m') => app.begin_move(),
        KeyCode::Char('<') | KeyCode::Char('H') => app.shift_card(false),
        KeyCode::Char('>') | KeyCode::Char('L') => app.shift_card(true),

        // View
        KeyCode::Char('f') => {
            app.filters.status = app.filters.status.cycle();
            app.clamp_cursors();
        }
        KeyCode::Char('c') => {
            app.filters.cycle_category();
            app.clamp_cursors();
        }
        KeyCode::Char('F') => {
            app.filters.clear();
            app.clamp_cursors();
        }
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('n') => {
            let name = app.store.profile().name;
            app.open_prompt(PromptPurpose::Name, &name);
        }
        KeyCode::Char('K') => app.key_hints_override = Some(!app.key_hints_visible()),
        _ => {}
    }
}

fn move_cursor(app: &mut App, delta: isize) {
    let len = app.visible(app.focused).len();
    if len == 0 {
        return;
    }
    let cursor = &mut app.cursors[app.focused.index()];
    *cursor = cursor.saturating_add_signed(delta).min(len - 1);
}

/// Delete the focused card, asking first unless `board.confirm_delete` is off
fn request_delete(app: &mut App) {
    let Some(task) = app.cursor_task() else {
        return;
    };
    let action = ConfirmAction::DeleteTask {
        id: task.id.clone(),
        title: task.title.clone(),
    };
    if app.config.board.confirm_delete {
        app.confirm = Some(action);
        app.mode = Mode::Confirm;
    } else {
        run_confirmed(app, action);
    }
}
