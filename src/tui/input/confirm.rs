use crossterm::event::{KeyCode, KeyEvent};

use crate::ops::board_ops::BoardCommand;
use crate::tui::app::{App, ConfirmAction};

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            let action = app.confirm.take();
            app.close_dialog();
            if let Some(action) = action {
                run_confirmed(app, action);
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.close_dialog(),
        _ => {}
    }
}

pub(super) fn run_confirmed(app: &mut App, action: ConfirmAction) {
    match action {
        ConfirmAction::DeleteTask { id, title } => {
            app.set_status(format!("deleted \"{}\" (copy kept in recovery log)", title));
            app.dispatch(BoardCommand::Delete { id });
        }
    }
}
