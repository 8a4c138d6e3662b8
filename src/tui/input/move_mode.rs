use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;

pub(super) fn handle_move(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('m') | KeyCode::Char(' ') => app.commit_move(),
        KeyCode::Esc | KeyCode::Char('q') => app.cancel_move(),
        KeyCode::Left | KeyCode::Char('h') => retarget_column(app, false),
        KeyCode::Right | KeyCode::Char('l') => retarget_column(app, true),
        KeyCode::Up | KeyCode::Char('k') => retarget_slot(app, |i, _| i.saturating_sub(1)),
        KeyCode::Down | KeyCode::Char('j') => retarget_slot(app, |i, last| (i + 1).min(last)),
        KeyCode::Home | KeyCode::Char('g') => retarget_slot(app, |_, _| 0),
        KeyCode::End | KeyCode::Char('G') => retarget_slot(app, |_, last| last),
        _ => {}
    }
}

/// Carry the card into the neighbouring column, keeping its row where possible
fn retarget_column(app: &mut App, forward: bool) {
    let Some(ms) = &app.move_state else {
        return;
    };
    let stage = if forward {
        ms.target_stage.next()
    } else {
        ms.target_stage.prev()
    };
    let last = app.move_slots(stage).saturating_sub(1);
    if let Some(ms) = &mut app.move_state {
        ms.target_stage = stage;
        ms.target_index = ms.target_index.min(last);
        app.focused = stage;
    }
}

fn retarget_slot(app: &mut App, f: impl Fn(usize, usize) -> usize) {
    let Some(stage) = app.move_state.as_ref().map(|ms| ms.target_stage) else {
        return;
    };
    let last = app.move_slots(stage).saturating_sub(1);
    if let Some(ms) = &mut app.move_state {
        ms.target_index = f(ms.target_index, last);
    }
}

#[cfg(test)]
mod tests {
    use super::super::handle_key;
    use crate::model::task::Stage;
    use crate::tui::app::{App, Mode};
    use crate::tui::render::test_helpers::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ids(app: &App) -> Vec<String> {
        app.store.tasks().iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn grab_move_drop_across_columns() {
        let (_dir, mut app) = app_with_tasks(vec![
            card("a", "Alpha", Stage::Backlog),
            card("b", "Beta", Stage::Todo),
            card("c", "Gamma", Stage::Todo),
        ]);
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.mode, Mode::Move);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(ids(&app), vec!["b", "a", "c"]);
        let alpha = app.store.find("a").unwrap();
        assert_eq!(alpha.stage, Stage::Todo);
        assert!(!alpha.completed);
        assert_eq!(app.focused, Stage::Todo);
        assert_eq!(app.cursors[Stage::Todo.index()], 1);
    }

    #[test]
    fn slot_is_clamped_to_column() {
        let (_dir, mut app) = app_with_tasks(vec![
            card("a", "Alpha", Stage::Backlog),
            card("b", "Beta", Stage::Todo),
        ]);
        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Right);
        for _ in 0..5 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.move_state.as_ref().unwrap().target_index, 1);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.move_state.as_ref().unwrap().target_index, 0);
    }

    #[test]
    fn escape_leaves_board_untouched() {
        let (_dir, mut app) = app_with_tasks(vec![
            card("a", "Alpha", Stage::Backlog),
            card("b", "Beta", Stage::Todo),
        ]);
        let revision = app.store.revision();
        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.store.revision(), revision);
        assert_eq!(app.store.find("a").unwrap().stage, Stage::Backlog);
        assert_eq!(app.focused, Stage::Backlog);
    }

    #[test]
    fn drop_in_place_does_not_write() {
        let (_dir, mut app) = app_with_tasks(vec![
            card("a", "Alpha", Stage::Todo),
            card("b", "Beta", Stage::Todo),
        ]);
        app.focused = Stage::Todo;
        let revision = app.store.revision();
        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.revision(), revision);
        assert_eq!(ids(&app), vec!["a", "b"]);
    }
}
