use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::model::task::{Stage, SubTask, Task};
use crate::ops::columns::Columns;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ColumnJson<'a> {
    pub stage: Stage,
    pub count: usize,
    pub tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
pub struct ProfileJson {
    pub name: String,
    pub greeting: String,
}

#[derive(Serialize)]
pub struct CreatedJson {
    pub id: String,
}

pub fn board_to_json<'a>(columns: &Columns<'a>) -> Vec<ColumnJson<'a>> {
    columns
        .iter()
        .map(|(stage, tasks)| ColumnJson {
            stage,
            count: tasks.len(),
            tasks: tasks.to_vec(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// The first 8 characters of an id, enough to address it on the command line
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn check_char(done: bool) -> char {
    if done { 'x' } else { ' ' }
}

/// One-line summary: `[ ] 3f2a9c1e Title  work · High  (1/3)`
pub fn format_task_line(task: &Task) -> String {
    let (done, total) = task.subtask_progress();
    let progress = if total > 0 {
        format!("  ({}/{})", done, total)
    } else {
        String::new()
    };
    format!(
        "[{}] {} {}  {} · {}{}",
        check_char(task.completed),
        short_id(&task.id),
        task.title,
        task.category,
        task.priority,
        progress
    )
}

/// Listing line with the stage column label in front
pub fn format_list_line(task: &Task) -> String {
    format!("{:<11}  {}", task.stage.label(), format_task_line(task))
}

pub fn format_subtask_line(sub: &SubTask) -> String {
    format!("[{}] {} {}", check_char(sub.completed), short_id(&sub.id), sub.title)
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Detailed task view
pub fn format_task_detail(task: &Task) -> Vec<String> {
    let mut lines = vec![
        format!("[{}] {}", check_char(task.completed), task.title),
        format!("id: {}", task.id),
        format!("stage: {}", task.stage.label()),
        format!("category: {}", task.category),
        format!("priority: {}", task.priority),
        format!("created: {}", format_timestamp(&task.created_at)),
        format!("updated: {}", format_timestamp(&task.updated_at)),
    ];

    if !task.description.is_empty() {
        lines.push("description:".to_string());
        for line in task.description.lines() {
            lines.push(format!("  {}", line));
        }
    }

    if !task.subtasks.is_empty() {
        let (done, total) = task.subtask_progress();
        lines.push(String::new());
        lines.push(format!("subtasks ({}/{}):", done, total));
        for sub in &task.subtasks {
            lines.push(format!("  {}", format_subtask_line(sub)));
        }
    }

    lines
}

/// Column header used by `tb board`
pub fn format_column_header(stage: Stage, count: usize) -> String {
    format!("== {} ({}) ==", stage.label(), count)
}

/// All four columns, one block per stage
pub fn format_board(columns: &Columns<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, (stage, tasks)) in columns.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format_column_header(stage, tasks.len()));
        if tasks.is_empty() {
            lines.push("  (empty)".to_string());
        }
        for (pos, task) in tasks.iter().enumerate() {
            lines.push(format!("{:>3}. {}", pos, format_task_line(task)));
        }
    }
    lines
}
