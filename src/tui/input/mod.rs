mod common;
mod confirm;
mod edit;
mod move_mode;
mod navigate;
mod prompt;

use crossterm::event::{KeyCode, KeyEvent};

use super::app::{App, Mode};

// Submodules reach each other's helpers through `use super::*;`
#[allow(unused_imports)]
use common::*;
#[allow(unused_imports)]
use confirm::*;
#[allow(unused_imports)]
use edit::*;
#[allow(unused_imports)]
use move_mode::*;
#[allow(unused_imports)]
use navigate::*;
#[allow(unused_imports)]
use prompt::*;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    // Help overlay swallows the next key
    if app.show_help {
        app.show_help = false;
        return;
    }

    let key = normalize_key(key);
    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Move => handle_move(app, key),
        Mode::Edit => handle_edit(app, key),
        Mode::Prompt => handle_prompt(app, key),
        Mode::Confirm => handle_confirm(app, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Stage;
    use crate::tui::render::test_helpers::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn help_overlay_eats_one_key() {
        let (_dir, mut app) = app_with_tasks(vec![card("a", "Alpha", Stage::Backlog)]);
        app.show_help = true;
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn modifier_presses_are_ignored() {
        let (_dir, mut app) = app_with_tasks(Vec::new());
        app.show_help = true;
        handle_key(
            &mut app,
            KeyEvent::new(
                KeyCode::Modifier(crossterm::event::ModifierKeyCode::LeftShift),
                KeyModifiers::SHIFT,
            ),
        );
        assert!(app.show_help);
    }
}
