use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, ConfirmAction, PromptPurpose};
use crate::tui::theme::Theme;
use crate::util::text;

use super::helpers::{centered_rect, scroll_to_cursor};

const DIALOG_WIDTH: u16 = 48;

fn dialog_block<'a>(theme: &Theme, title: String) -> Block<'a> {
    let bg = theme.background;
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.selection_border).bg(bg))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(bg))
}

/// One-line text prompt: the first-run name question or a new sub-task
pub fn render_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let Some(prompt) = &app.prompt else {
        return;
    };
    let theme = &app.theme;
    let bg = theme.background;

    let (title, hint) = match &prompt.purpose {
        PromptPurpose::Name => (" What's your name? ".to_string(), "Enter save"),
        PromptPurpose::Subtask { todo_id } => {
            let parent = app
                .store
                .find(todo_id)
                .map(|t| t.title.as_str())
                .unwrap_or("");
            let budget = (DIALOG_WIDTH as usize).saturating_sub(20);
            (
                format!(" New sub-task: {} ", text::truncate_to_width(parent, budget)),
                "Enter add \u{00B7} Esc cancel",
            )
        }
    };

    let rect = centered_rect(DIALOG_WIDTH, 5, area);
    frame.render_widget(Clear, rect);
    let block = dialog_block(theme, title);
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let field_cells = (inner.width as usize).saturating_sub(2);
    let (shown, col) = scroll_to_cursor(&prompt.buffer, prompt.cursor, field_cells);
    let status = match &prompt.error {
        Some(err) => Span::styled(format!(" {}", err), Style::default().fg(theme.red).bg(bg)),
        None => Span::styled(format!(" {}", hint), Style::default().fg(theme.dim).bg(bg)),
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(" ", Style::default().bg(bg)),
            Span::styled(
                text::pad_to_width(&shown, field_cells),
                Style::default().fg(theme.text_bright).bg(theme.selection_bg),
            ),
        ]),
        Line::from(""),
        Line::from(status),
    ];
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), inner);
    frame.set_cursor_position(Position::new(inner.x + 1 + col as u16, inner.y));
}

/// Yes/no question before a destructive action
pub fn render_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let Some(action) = &app.confirm else {
        return;
    };
    let theme = &app.theme;
    let bg = theme.background;

    let question = match action {
        ConfirmAction::DeleteTask { title, .. } => {
            let budget = (DIALOG_WIDTH as usize).saturating_sub(14);
            format!("Delete \"{}\"?", text::truncate_to_width(title, budget))
        }
    };

    let rect = centered_rect(DIALOG_WIDTH, 5, area);
    frame.render_widget(Clear, rect);
    let block = dialog_block(theme, " Confirm ".to_string());
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let lines = vec![
        Line::from(Span::styled(
            format!(" {}", question),
            Style::default().fg(theme.text_bright).bg(bg),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" y", Style::default().fg(theme.red).bg(bg)),
            Span::styled(" yes \u{00B7} ", Style::default().fg(theme.dim).bg(bg)),
            Span::styled("n", Style::default().fg(theme.highlight).bg(bg)),
            Span::styled(" no", Style::default().fg(theme.dim).bg(bg)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Stage;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn name_prompt_on_first_run() {
        let (_dir, app) = app_with_tasks_named("", Vec::new());
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_prompt(frame, &app, area)
        });
        assert!(output.contains("What's your name?"));
        assert!(output.contains("Enter save"));
    }

    #[test]
    fn prompt_shows_buffer_and_error() {
        let (_dir, mut app) = app_with_tasks(vec![card("a", "Groceries", Stage::Todo)]);
        app.open_prompt(PromptPurpose::Subtask { todo_id: "a".into() }, "milk");
        if let Some(prompt) = app.prompt.as_mut() {
            prompt.error = Some("sub-task title cannot be empty".into());
        }
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_prompt(frame, &app, area)
        });
        assert!(output.contains("New sub-task: Groceries"));
        assert!(output.contains(" milk"));
        assert!(output.contains("sub-task title cannot be empty"));
    }

    #[test]
    fn confirm_names_the_card() {
        let (_dir, mut app) = app_with_tasks(vec![card("a", "Groceries", Stage::Todo)]);
        app.confirm = Some(ConfirmAction::DeleteTask {
            id: "a".into(),
            title: "Groceries".into(),
        });
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_confirm(frame, &app, area)
        });
        assert!(output.contains("Delete \"Groceries\"?"));
        assert!(output.contains("y yes \u{00B7} n no"));
    }
}
