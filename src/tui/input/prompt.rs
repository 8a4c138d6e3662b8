use crossterm::event::{KeyCode, KeyEvent};

use crate::model::profile::normalize_name;
use crate::ops::board_ops::BoardCommand;
use crate::tui::app::{App, PromptPurpose};

use super::*;

pub(super) fn handle_prompt(app: &mut App, key: KeyEvent) {
    let Some(prompt) = app.prompt.as_mut() else {
        app.close_dialog();
        return;
    };
    match key.code {
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Enter => submit_prompt(app),
        _ => {
            edit_text(&mut prompt.buffer, &mut prompt.cursor, key);
            prompt.error = None;
        }
    }
}

fn submit_prompt(app: &mut App) {
    let Some(prompt) = app.prompt.as_mut() else {
        return;
    };
    match prompt.purpose.clone() {
        PromptPurpose::Name => {
            let Some(name) = normalize_name(&prompt.buffer) else {
                prompt.error = Some("name cannot be empty".into());
                return;
            };
            app.close_dialog();
            if let Err(e) = app.store.set_name(&name) {
                app.set_error(format!("could not save name: {}", e));
            }
        }
        PromptPurpose::Subtask { todo_id } => {
            let title = prompt.buffer.trim().to_string();
            if title.is_empty() {
                prompt.error = Some("sub-task title cannot be empty".into());
                return;
            }
            app.close_dialog();
            app.dispatch(BoardCommand::AddSubtask {
                todo_id: todo_id.clone(),
                title,
            });
            app.focus_task(&todo_id);
        }
    }
}
