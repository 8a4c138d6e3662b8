use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;

use super::helpers::spans_width;

/// Greeting on the left, active filters and theme on the right, then a rule
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let width = area.width as usize;

    let mut spans = vec![Span::styled(
        format!(" {}", app.store.profile().greeting()),
        Style::default()
            .fg(theme.highlight)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];

    let mut right = Vec::new();
    if app.filters.is_active() {
        right.push(Span::styled(
            format!("filter: {}", app.filters.describe()),
            Style::default().fg(theme.yellow).bg(bg),
        ));
        right.push(Span::styled("  ", Style::default().bg(bg)));
    }
    let total = app.store.tasks().len();
    right.push(Span::styled(
        format!("{} task{}  {} ", total, if total == 1 { "" } else { "s" }, theme.preference),
        Style::default().fg(theme.dim).bg(bg),
    ));

    let used = spans_width(&spans) + spans_width(&right);
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
        spans.extend(right);
    }

    let rule = Line::from(Span::styled(
        "\u{2500}".repeat(width),
        Style::default().fg(theme.border).bg(bg),
    ));
    let paragraph = Paragraph::new(vec![Line::from(spans), rule]).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Category, Stage};
    use crate::tui::render::test_helpers::*;
    use insta::assert_snapshot;

    #[test]
    fn greeting_and_summary() {
        let (_dir, app) = app_with_tasks(vec![card("a", "Alpha", Stage::Todo)]);
        let output = render_to_string(40, 2, |frame, area| render_header(frame, &app, area));
        assert_snapshot!(output, @r"
         Hello, Tester!           1 task  light
        ────────────────────────────────────────
        ");
    }

    #[test]
    fn welcome_and_filters() {
        let (_dir, mut app) = app_with_tasks_named("", Vec::new());
        app.filters.category = Some(Category::Health);
        let output = render_to_string(60, 2, |frame, area| render_header(frame, &app, area));
        let first = output.lines().next().unwrap();
        assert!(first.starts_with(" Welcome!"));
        assert!(first.contains("filter: all · health"));
        assert!(first.ends_with("0 tasks  light"));
    }
}
