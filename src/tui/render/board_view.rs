use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::task::{Stage, Task};
use crate::ops::columns::partition;
use crate::tui::app::App;
use crate::tui::theme::Theme;
use crate::util::text;

use super::helpers::spans_width;

/// Rows taken by one card
const CARD_HEIGHT: usize = 2;

/// How one column is drawn
struct ColumnView<'a> {
    stage: Stage,
    cards: Vec<&'a Task>,
    /// Card drawn as selected (the cursor, or the carried card in MOVE mode)
    selected: Option<usize>,
    focused: bool,
    carrying: bool,
    scroll: usize,
    total: usize,
}

/// Render the four stage columns side by side
pub fn render_board(frame: &mut Frame, app: &mut App, area: Rect) {
    let visible = Stage::ALL.map(|s| app.visible(s));
    let preview = app.move_preview();
    let carried = app.move_state.as_ref().map(|ms| ms.task_id.clone());
    let counts = app.column_counts();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    // While a card is carried the board shows where it would land
    let preview_columns = preview.as_deref().map(partition);
    let tasks = app.store.tasks();

    for stage in Stage::ALL {
        let i = stage.index();
        let cards: Vec<&Task> = match &preview_columns {
            Some(columns) => columns.get(stage).to_vec(),
            None => visible[i].iter().map(|&idx| &tasks[idx]).collect(),
        };

        let selected = match &carried {
            Some(id) => cards.iter().position(|t| &t.id == id),
            None if stage == app.focused && !cards.is_empty() => {
                Some(app.cursors[i].min(cards.len() - 1))
            }
            None => None,
        };

        let capacity = (chunks[i].height.saturating_sub(2) as usize / CARD_HEIGHT).max(1);
        app.scroll[i] = scroll_for(app.scroll[i], selected, cards.len(), capacity);

        let view = ColumnView {
            stage,
            cards,
            selected,
            focused: stage == app.focused,
            carrying: carried.is_some(),
            scroll: app.scroll[i],
            total: counts[i],
        };
        render_column(frame, &app.theme, &view, chunks[i]);
    }
}

/// Keep `selected` inside a window of `capacity` cards
fn scroll_for(scroll: usize, selected: Option<usize>, len: usize, capacity: usize) -> usize {
    let max_scroll = len.saturating_sub(capacity);
    let scroll = match selected {
        Some(sel) if sel < scroll => sel,
        Some(sel) if sel >= scroll + capacity => sel + 1 - capacity,
        _ => scroll,
    };
    scroll.min(max_scroll)
}

fn render_column(frame: &mut Frame, theme: &Theme, view: &ColumnView, area: Rect) {
    let bg = theme.background;
    let border_color = if view.focused {
        theme.selection_border
    } else {
        theme.border
    };
    let count = if view.cards.len() == view.total || view.carrying {
        format!("{}", view.cards.len())
    } else {
        format!("{}/{}", view.cards.len(), view.total)
    };
    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", view.stage.label()),
            Style::default()
                .fg(theme.stage_color(view.stage))
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{} ", count), Style::default().fg(theme.dim).bg(bg)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color).bg(bg))
        .title(title)
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let mut lines: Vec<Line> = Vec::new();
    if view.cards.is_empty() {
        let empty = if view.total > 0 { "(filtered out)" } else { "(empty)" };
        lines.push(Line::from(Span::styled(
            text::truncate_to_width(&format!(" {}", empty), width),
            Style::default().fg(theme.dim).bg(bg),
        )));
    }

    for (pos, task) in view.cards.iter().enumerate().skip(view.scroll) {
        if lines.len() + CARD_HEIGHT > inner.height as usize {
            break;
        }
        let is_selected = view.selected == Some(pos);
        lines.extend(card_lines(theme, task, is_selected, view.carrying, width));
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), inner);
}

/// Two rows: check box and title, then category, priority and sub-task progress
fn card_lines<'a>(
    theme: &Theme,
    task: &Task,
    selected: bool,
    carrying: bool,
    width: usize,
) -> [Line<'a>; 2] {
    let bg = if selected { theme.selection_bg } else { theme.background };
    let base = Style::default().bg(bg);

    let marker = match (selected, carrying) {
        (true, true) => "\u{2261}",
        (true, false) => "\u{258C}",
        _ => " ",
    };
    let check = if task.completed { "[x] " } else { "[ ] " };
    let check_color = if task.completed { theme.green } else { theme.dim };
    let mut title_style = base.fg(if selected {
        theme.text_bright
    } else {
        theme.text
    });
    if task.completed {
        title_style = title_style.add_modifier(Modifier::CROSSED_OUT);
    }
    if selected && carrying {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }

    let title_cells = width.saturating_sub(1 + check.len());
    let title = text::pad_to_width(&task.title, title_cells);
    let first = Line::from(vec![
        Span::styled(marker, base.fg(theme.selection_border)),
        Span::styled(check, base.fg(check_color)),
        Span::styled(title, title_style),
    ]);

    let mut meta = vec![
        Span::styled(" ", base),
        Span::styled(task.category.as_str(), base.fg(theme.category_color(task.category))),
        Span::styled(" \u{00B7} ", base.fg(theme.dim)),
        Span::styled(task.priority.as_str(), base.fg(theme.priority_color(task.priority))),
    ];
    let (done, total) = task.subtask_progress();
    if total > 0 {
        meta.push(Span::styled(format!(" {}/{}", done, total), base.fg(theme.dim)));
    }
    let used = spans_width(&meta);
    if used < width {
        meta.push(Span::styled(" ".repeat(width - used), base));
    }

    [first, Line::from(meta)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::SubTask;
    use crate::tui::render::test_helpers::*;

    fn board() -> Vec<Task> {
        let mut groceries = card("a", "Groceries", Stage::Todo);
        groceries.subtasks = vec![
            SubTask {
                id: "s1".into(),
                title: "milk".into(),
                completed: true,
            },
            SubTask {
                id: "s2".into(),
                title: "eggs".into(),
                completed: false,
            },
        ];
        vec![
            groceries,
            card("b", "Write the quarterly report", Stage::InProgress),
            card("c", "Book flights", Stage::Done),
        ]
    }

    fn render(app: &mut App) -> String {
        render_to_string(TERM_W, 12, |frame, area| render_board(frame, app, area))
    }

    #[test]
    fn columns_show_titles_and_counts() {
        let (_dir, mut app) = app_with_tasks(board());
        let output = render(&mut app);
        let top = output.lines().next().unwrap();
        assert!(top.contains("Backlog 0"));
        assert!(top.contains("Todo 1"));
        assert!(top.contains("In Progress 1"));
        assert!(top.contains("Done 1"));
        assert!(output.contains("(empty)"));
        assert!(output.contains("[ ] Groceries"));
        assert!(output.contains("[x] Book flights"));
        assert!(output.contains(" work · Medium 1/2"));
    }

    #[test]
    fn long_titles_are_truncated() {
        let (_dir, mut app) = app_with_tasks(board());
        let output = render(&mut app);
        assert!(output.contains("[ ] Write the qu\u{2026}"));
    }

    #[test]
    fn filtered_columns_say_so() {
        let (_dir, mut app) = app_with_tasks(board());
        app.filters.status = crate::ops::filter::StatusFilter::Completed;
        let output = render(&mut app);
        assert!(output.contains("Todo 0/1"));
        assert!(output.contains("(filtered out)"));
        assert!(output.contains("Book flights"));
    }

    #[test]
    fn move_preview_shows_card_in_target_column() {
        let (_dir, mut app) = app_with_tasks(board());
        app.focused = Stage::Todo;
        app.begin_move();
        if let Some(ms) = app.move_state.as_mut() {
            ms.target_stage = Stage::Done;
            ms.target_index = 1;
        }
        let output = render(&mut app);
        let top = output.lines().next().unwrap();
        assert!(top.contains("Todo 0"));
        assert!(top.contains("Done 2"));
        assert!(output.contains("\u{2261}[x] Groceries"));
        // the stored board is unchanged until the drop
        assert_eq!(app.store.find("a").unwrap().stage, Stage::Todo);
    }

    #[test]
    fn scroll_follows_selection() {
        assert_eq!(scroll_for(0, Some(0), 10, 3), 0);
        assert_eq!(scroll_for(0, Some(5), 10, 3), 3);
        assert_eq!(scroll_for(5, Some(2), 10, 3), 2);
        assert_eq!(scroll_for(8, None, 4, 3), 1);
    }
}
