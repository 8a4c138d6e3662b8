use chrono::{TimeZone, Utc};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::io::board_store::BoardStore;
use crate::io::store::KvStore;
use crate::model::config::AppConfig;
use crate::model::task::{Category, Priority, Stage, Task};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// A work card with medium priority and no sub-tasks
pub fn card(id: &str, title: &str, stage: Stage) -> Task {
    let ts = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        completed: stage.is_done(),
        category: Category::Work,
        priority: Priority::Medium,
        stage,
        subtasks: Vec::new(),
        created_at: ts,
        updated_at: ts,
    }
}

/// An App over a throwaway data dir holding `tasks`, greeted as "Tester"
pub fn app_with_tasks(tasks: Vec<Task>) -> (TempDir, App) {
    app_with_tasks_named("Tester", tasks)
}

/// Like [`app_with_tasks`]; an empty `name` leaves the profile unset so the
/// name prompt opens.
pub fn app_with_tasks_named(name: &str, tasks: Vec<Task>) -> (TempDir, App) {
    let dir = TempDir::new().unwrap();
    let (mut store, _) = BoardStore::load(KvStore::open(dir.path()), Utc::now());
    if !name.is_empty() {
        store.set_name(name).unwrap();
    }
    store.replace(tasks);
    let app = App::new(store, AppConfig::default());
    (dir, app)
}
