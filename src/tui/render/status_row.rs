use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::util::text;

use super::helpers::spans_width;

/// Render the status row (bottom of screen): a message on the left, key hints
/// for the current mode on the right
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let width = area.width as usize;

    let mut spans = Vec::new();
    if let Some(message) = &app.status_message {
        let color = if app.status_is_error {
            theme.red
        } else {
            theme.green
        };
        spans.push(Span::styled(
            format!(" {}", message),
            Style::default().fg(color).bg(bg),
        ));
    } else if let Some(ms) = &app.move_state {
        let title = app
            .store
            .find(&ms.task_id)
            .map(|t| t.title.as_str())
            .unwrap_or("");
        spans.push(Span::styled(
            " MOVE ",
            Style::default()
                .fg(bg)
                .bg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(
                " {} \u{2192} {} #{}",
                text::truncate_to_width(title, 24),
                ms.target_stage.label(),
                ms.target_index + 1
            ),
            Style::default().fg(theme.text_bright).bg(bg),
        ));
    } else if app.filters.is_active() {
        spans.push(Span::styled(
            format!(" filter: {}", app.filters.describe()),
            Style::default().fg(theme.yellow).bg(bg),
        ));
    }

    if app.key_hints_visible() {
        let hints = Span::styled(
            format!("{} ", mode_hints(app.mode)),
            Style::default().fg(theme.dim).bg(bg),
        );
        let used = spans_width(&spans) + spans_width(std::slice::from_ref(&hints));
        if used < width {
            spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
            spans.push(hints);
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn mode_hints(mode: Mode) -> &'static str {
    match mode {
        Mode::Navigate => "a add \u{00B7} e edit \u{00B7} m move \u{00B7} f filter \u{00B7} ? help",
        Mode::Move => "\u{2190}\u{2191}\u{2192}\u{2193} place \u{00B7} Enter drop \u{00B7} Esc cancel",
        Mode::Edit => "Tab next \u{00B7} ^S save \u{00B7} Esc cancel",
        Mode::Prompt => "Enter ok \u{00B7} Esc cancel",
        Mode::Confirm => "y yes \u{00B7} n no",
    }
}
