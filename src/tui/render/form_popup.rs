use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, FormField, FormState, FormTarget};
use crate::tui::theme::Theme;
use crate::util::text;

use super::helpers::{centered_rect, scroll_to_cursor};

const FORM_WIDTH: u16 = 60;
/// Column where field values start: one space of margin plus the label
const LABEL_CELLS: usize = 11;
/// Sub-task rows shown before the list scrolls
const MAX_SUBTASK_ROWS: usize = 6;

/// The add/edit dialog
pub fn render_form_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = &app.form else {
        return;
    };
    let theme = &app.theme;
    let bg = theme.background;

    let title = match &form.target {
        FormTarget::Add => format!(" New task in {} ", form.stage.label()),
        FormTarget::Edit { .. } => " Edit task ".to_string(),
    };

    let subtask_rows = form.subtasks.len().min(MAX_SUBTASK_ROWS);
    // 5 single-line fields, a gap, the sub-task label, its rows, the input
    // row, a gap and the status line
    let height = 5 + 1 + 1 + subtask_rows as u16 + 1 + 1 + 1 + 2;
    let rect = centered_rect(FORM_WIDTH, height, area);
    frame.render_widget(Clear, rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.selection_border).bg(bg))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(bg));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let value_cells = (inner.width as usize).saturating_sub(LABEL_CELLS + 1);
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor: Option<(usize, usize)> = None;

    for field in [FormField::Title, FormField::Description] {
        let focused = form.field == field;
        let value = match field {
            FormField::Title => &form.title,
            _ => &form.description,
        };
        let shown = if focused {
            let (shown, col) = scroll_to_cursor(value, form.cursor, value_cells);
            cursor = Some((LABEL_CELLS + col, lines.len()));
            shown
        } else {
            text::truncate_to_width(value, value_cells)
        };
        let value_bg = if focused { theme.selection_bg } else { bg };
        lines.push(Line::from(vec![
            label_span(theme, field, focused),
            Span::styled(
                text::pad_to_width(&shown, value_cells),
                Style::default().fg(theme.text_bright).bg(value_bg),
            ),
        ]));
    }

    let choices = [
        (FormField::Category, form.category.label(), theme.category_color(form.category)),
        (FormField::Priority, form.priority.as_str(), theme.priority_color(form.priority)),
        (FormField::Stage, form.stage.label(), theme.stage_color(form.stage)),
    ];
    for (field, value, color) in choices {
        lines.push(choice_line(theme, field, value, color, form.field == field));
    }
    lines.push(Line::from(""));

    let subtasks_focused = form.field == FormField::Subtasks;
    let (done, total) = progress(form);
    let mut label = vec![label_span(theme, FormField::Subtasks, subtasks_focused)];
    if total > 0 {
        label.push(Span::styled(
            format!("{}/{} done", done, total),
            Style::default().fg(theme.dim).bg(bg),
        ));
    }
    lines.push(Line::from(label));

    let first = form
        .subtask_cursor
        .saturating_sub(MAX_SUBTASK_ROWS - 1)
        .min(form.subtasks.len().saturating_sub(MAX_SUBTASK_ROWS));
    for (i, sub) in form.subtasks.iter().enumerate().skip(first).take(MAX_SUBTASK_ROWS) {
        let selected = subtasks_focused && i == form.subtask_cursor;
        let row_bg = if selected { theme.selection_bg } else { bg };
        let (check, check_color) = if sub.completed {
            ("[x] ", theme.green)
        } else {
            ("[ ] ", theme.dim)
        };
        let marker = if selected { "\u{258C}" } else { " " };
        lines.push(Line::from(vec![
            Span::styled(" ".repeat(LABEL_CELLS - 1), Style::default().bg(bg)),
            Span::styled(marker, Style::default().fg(theme.selection_border).bg(row_bg)),
            Span::styled(check, Style::default().fg(check_color).bg(row_bg)),
            Span::styled(
                text::pad_to_width(&sub.title, value_cells.saturating_sub(4)),
                Style::default().fg(theme.text).bg(row_bg),
            ),
        ]));
    }

    let input_cells = value_cells.saturating_sub(2);
    let input = if subtasks_focused {
        let (shown, col) = scroll_to_cursor(&form.subtask_input, form.cursor, input_cells);
        cursor = Some((LABEL_CELLS + 2 + col, lines.len()));
        shown
    } else {
        text::truncate_to_width(&form.subtask_input, input_cells)
    };
    lines.push(Line::from(vec![
        Span::styled(" ".repeat(LABEL_CELLS), Style::default().bg(bg)),
        Span::styled("+ ", Style::default().fg(theme.highlight).bg(bg)),
        Span::styled(
            text::pad_to_width(&input, input_cells),
            Style::default().fg(theme.text_bright).bg(if subtasks_focused {
                theme.selection_bg
            } else {
                bg
            }),
        ),
    ]));
    lines.push(Line::from(""));

    let status = match &form.error {
        Some(err) => Span::styled(format!(" {}", err), Style::default().fg(theme.red).bg(bg)),
        None => Span::styled(
            format!(" {}", field_hint(form.field)),
            Style::default().fg(theme.dim).bg(bg),
        ),
    };
    lines.push(Line::from(status));

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), inner);

    if let Some((col, row)) = cursor
        && (row as u16) < inner.height
    {
        let x = (inner.x + col as u16).min(inner.right().saturating_sub(1));
        frame.set_cursor_position(Position::new(x, inner.y + row as u16));
    }
}

fn label_span<'a>(theme: &Theme, field: FormField, focused: bool) -> Span<'a> {
    let style = if focused {
        Style::default()
            .fg(theme.highlight)
            .bg(theme.background)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.dim).bg(theme.background)
    };
    Span::styled(
        format!(" {:<width$}", field.label(), width = LABEL_CELLS - 1),
        style,
    )
}

fn choice_line<'a>(
    theme: &Theme,
    field: FormField,
    value: &str,
    color: Color,
    focused: bool,
) -> Line<'a> {
    let bg = theme.background;
    let mut spans = vec![label_span(theme, field, focused)];
    if focused {
        spans.push(Span::styled("\u{2039} ", Style::default().fg(theme.highlight).bg(bg)));
        spans.push(Span::styled(
            value.to_string(),
            Style::default().fg(color).bg(bg).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(" \u{203A}", Style::default().fg(theme.highlight).bg(bg)));
    } else {
        spans.push(Span::styled(format!("  {}", value), Style::default().fg(color).bg(bg)));
    }
    Line::from(spans)
}

fn progress(form: &FormState) -> (usize, usize) {
    let done = form.subtasks.iter().filter(|s| s.completed).count();
    (done, form.subtasks.len())
}

fn field_hint(field: FormField) -> &'static str {
    match field {
        FormField::Title | FormField::Description => "Tab next \u{00B7} Enter save \u{00B7} Esc cancel",
        FormField::Category | FormField::Priority | FormField::Stage => {
            "\u{2190}\u{2192} change \u{00B7} Tab next \u{00B7} Enter save"
        }
        FormField::Subtasks => {
            "Enter add \u{00B7} ^T toggle \u{00B7} ^D remove \u{00B7} ^S save"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Stage, SubTask};
    use crate::tui::render::test_helpers::*;

    fn render(app: &App) -> String {
        render_to_string(TERM_W, TERM_H, |frame, area| render_form_popup(frame, app, area))
    }

    #[test]
    fn add_form_shows_defaults() {
        let (_dir, mut app) = app_with_tasks(Vec::new());
        app.focused = Stage::Todo;
        app.open_add_form();
        let output = render(&app);
        assert!(output.contains("New task in Todo"));
        assert!(output.contains(" Title"));
        assert!(output.contains(" Notes"));
        assert!(output.contains("Category    Other"));
        assert!(output.contains("Priority    Medium"));
        assert!(output.contains("Stage       Todo"));
        assert!(output.contains("Tab next"));
    }

    #[test]
    fn focused_choice_has_arrows() {
        let mut task = card("a", "Groceries", Stage::Backlog);
        task.subtasks = vec![SubTask {
            id: "s1".into(),
            title: "milk".into(),
            completed: true,
        }];
        let (_dir, mut app) = app_with_tasks(vec![task]);
        app.open_edit_form();
        if let Some(form) = app.form.as_mut() {
            form.focus(FormField::Priority);
        }
        let output = render(&app);
        assert!(output.contains("Edit task"));
        assert!(output.contains("Groceries"));
        assert!(output.contains("Priority  \u{2039} Medium \u{203A}"));
        assert!(output.contains("1/1 done"));
        assert!(output.contains("[x] milk"));
    }

    #[test]
    fn error_replaces_hint() {
        let (_dir, mut app) = app_with_tasks(Vec::new());
        app.open_add_form();
        if let Some(form) = app.form.as_mut() {
            form.error = Some("title cannot be empty".into());
        }
        let output = render(&app);
        assert!(output.contains("title cannot be empty"));
        assert!(!output.contains("Tab next"));
    }
}
