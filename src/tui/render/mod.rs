pub mod board_view;
pub mod dialog;
pub mod form_popup;
pub mod header;
pub mod help_overlay;
pub mod status_row;

mod helpers;
#[cfg(test)]
pub(crate) mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::{App, Mode};

/// Draw the whole screen: header, board, status row, then any dialog on top
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: header (2 rows) | board | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    header::render_header(frame, app, chunks[0]);
    board_view::render_board(frame, app, chunks[1]);
    status_row::render_status_row(frame, app, chunks[2]);

    // Dialogs sit on top of the board
    match app.mode {
        Mode::Edit => form_popup::render_form_popup(frame, app, area),
        Mode::Prompt => dialog::render_prompt(frame, app, area),
        Mode::Confirm => dialog::render_confirm(frame, app, area),
        Mode::Navigate | Mode::Move => {}
    }

    if app.show_help {
        help_overlay::render_help_overlay(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Stage;
    use test_helpers::*;

    #[test]
    fn full_screen_layout() {
        let (_dir, mut app) = app_with_tasks(vec![
            card("a", "Plan sprint", Stage::Todo),
            card("b", "Ship release", Stage::Done),
        ]);
        let output = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with(" Hello, Tester!"));
        assert!(output.contains("Plan sprint"));
        assert!(output.contains("Ship release"));
        assert!(lines.last().unwrap().contains("? help"));
    }

    #[test]
    fn dialogs_render_over_board() {
        let (_dir, mut app) = app_with_tasks(vec![card("a", "Plan sprint", Stage::Backlog)]);
        app.open_add_form();
        let output = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        assert!(output.contains("New task in Backlog"));

        app.close_dialog();
        app.show_help = true;
        let output = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        assert!(output.contains("Key Bindings"));
    }
}
