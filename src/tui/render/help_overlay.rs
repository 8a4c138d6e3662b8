use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

use super::helpers::centered_rect;

const BOARD_KEYS: &[(&str, &str)] = &[
    (" \u{2190}\u{2192}/hl 1-4", "Focus column"),
    (" \u{2191}\u{2193}/jk g/G", "Move cursor / jump to top, bottom"),
    (" a", "Add a card to this column"),
    (" Enter/e", "Edit card"),
    (" Space/x", "Toggle done"),
    (" s", "Add a sub-task"),
    (" d/Del", "Delete card"),
    (" m", "Pick up card to move it"),
    (" </>", "Shift card one column"),
];

const MOVE_KEYS: &[(&str, &str)] = &[
    (" \u{2190}\u{2192}/hl", "Carry to another column"),
    (" \u{2191}\u{2193}/jk", "Choose the slot"),
    (" Enter/m", "Drop"),
    (" Esc", "Put it back"),
];

const VIEW_KEYS: &[(&str, &str)] = &[
    (" f", "Cycle status filter"),
    (" c", "Cycle category filter"),
    (" F", "Clear filters"),
    (" t", "Toggle light/dark theme"),
    (" n", "Change your name"),
    (" K", "Show/hide key hints"),
    (" ?", "Toggle this help"),
    (" q", "Quit"),
];

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(" Key Bindings", header_style)));

    for (heading, keys) in [("Board", BOARD_KEYS), ("Moving a card", MOVE_KEYS), ("View", VIEW_KEYS)] {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", heading), header_style)));
        for &(key, desc) in keys {
            add_binding(&mut lines, key, desc, key_style, desc_style);
        }
    }

    let height = lines.len() as u16 + 2;
    let overlay_area = centered_rect(56, height, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 16;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn lists_groups() {
        let (_dir, app) = app_with_tasks(Vec::new());
        let output = render_to_string(TERM_W, 40, |frame, area| {
            render_help_overlay(frame, &app, area)
        });
        assert!(output.contains("Key Bindings"));
        assert!(output.contains("Moving a card"));
        assert!(output.contains("Toggle light/dark theme"));
    }
}
