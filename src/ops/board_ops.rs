use chrono::{DateTime, Utc};

use crate::model::draft::{TaskDraft, TaskPatch};
use crate::model::task::{Stage, SubTask, Task, new_id};

/// Error type for looking up tasks by id or id prefix
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("sub-task not found: {0}")]
    SubTaskNotFound(String),
    #[error("ambiguous id prefix '{prefix}' matches {count} items")]
    Ambiguous { prefix: String, count: usize },
}

// ---------------------------------------------------------------------------
// Task CRUD
// ---------------------------------------------------------------------------

/// Create a task from `draft` and prepend it.
///
/// The stage is the draft's own stage, else `requested_stage`, else Backlog.
/// Returns the new collection and the new id; a blank title returns an
/// unchanged copy and `None`.
pub fn add_task(
    tasks: &[Task],
    draft: TaskDraft,
    requested_stage: Option<Stage>,
    now: DateTime<Utc>,
) -> (Vec<Task>, Option<String>) {
    let title = draft.title.trim();
    if title.is_empty() {
        return (tasks.to_vec(), None);
    }

    let stage = draft.stage.or(requested_stage).unwrap_or(Stage::Backlog);
    let task = Task {
        id: new_id(),
        title: title.to_string(),
        description: draft.description.trim().to_string(),
        completed: stage.is_done(),
        category: draft.category,
        priority: draft.priority,
        stage,
        subtasks: draft.subtasks.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };
    let id = task.id.clone();

    let mut next = Vec::with_capacity(tasks.len() + 1);
    next.push(task);
    next.extend_from_slice(tasks);
    (next, Some(id))
}

/// Merge the present fields of `patch` into the task with `id`.
pub fn update_task(tasks: &[Task], id: &str, patch: &TaskPatch, now: DateTime<Utc>) -> Vec<Task> {
    if !patch.is_valid() {
        return tasks.to_vec();
    }
    map_task(tasks, id, |task| {
        if let Some(title) = &patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            task.description = description.trim().to_string();
        }
        if let Some(category) = patch.category {
            task.category = category;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(subtasks) = &patch.subtasks {
            task.subtasks = subtasks.clone();
        }
        task.set_stage(patch.stage.unwrap_or(task.stage));
        task.touch(now);
        true
    })
}

pub fn delete_task(tasks: &[Task], id: &str) -> Vec<Task> {
    tasks.iter().filter(|t| t.id != id).cloned().collect()
}

/// Done → Todo, anything else → Done
pub fn toggle_done(tasks: &[Task], id: &str, now: DateTime<Utc>) -> Vec<Task> {
    map_task(tasks, id, |task| {
        let stage = if task.stage.is_done() {
            Stage::Todo
        } else {
            Stage::Done
        };
        task.set_stage(stage);
        task.touch(now);
        true
    })
}

// ---------------------------------------------------------------------------
// Sub-tasks
// ---------------------------------------------------------------------------

/// Append an incomplete sub-task; blank titles are ignored.
pub fn add_subtask(tasks: &[Task], todo_id: &str, title: &str, now: DateTime<Utc>) -> Vec<Task> {
    let title = title.trim();
    if title.is_empty() {
        return tasks.to_vec();
    }
    map_task(tasks, todo_id, |task| {
        task.subtasks.push(SubTask::new(title.to_string()));
        task.touch(now);
        true
    })
}

pub fn remove_subtask(
    tasks: &[Task],
    todo_id: &str,
    subtask_id: &str,
    now: DateTime<Utc>,
) -> Vec<Task> {
    map_task(tasks, todo_id, |task| {
        let before = task.subtasks.len();
        task.subtasks.retain(|s| s.id != subtask_id);
        if task.subtasks.len() == before {
            return false;
        }
        task.touch(now);
        true
    })
}

pub fn toggle_subtask(
    tasks: &[Task],
    todo_id: &str,
    subtask_id: &str,
    now: DateTime<Utc>,
) -> Vec<Task> {
    map_task(tasks, todo_id, |task| {
        let Some(sub) = task.subtasks.iter_mut().find(|s| s.id == subtask_id) else {
            return false;
        };
        sub.completed = !sub.completed;
        task.touch(now);
        true
    })
}

/// Copy `tasks`, applying `edit` to the task with `id`. When `edit` returns
/// false the original task is kept untouched.
fn map_task(tasks: &[Task], id: &str, mut edit: impl FnMut(&mut Task) -> bool) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            if t.id != id {
                return t.clone();
            }
            let mut edited = t.clone();
            if edit(&mut edited) { edited } else { t.clone() }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A named board mutation, applied with [`apply`]
#[derive(Debug, Clone, PartialEq)]
pub enum BoardCommand {
    Add {
        draft: TaskDraft,
        stage: Option<Stage>,
    },
    Update {
        id: String,
        patch: TaskPatch,
    },
    Delete {
        id: String,
    },
    ToggleDone {
        id: String,
    },
    AddSubtask {
        todo_id: String,
        title: String,
    },
    RemoveSubtask {
        todo_id: String,
        subtask_id: String,
    },
    ToggleSubtask {
        todo_id: String,
        subtask_id: String,
    },
    /// Whole-collection replacement, produced by drag/drop
    Replace(Vec<Task>),
}

/// Outcome of applying a command
#[derive(Debug, Clone)]
pub struct Applied {
    pub tasks: Vec<Task>,
    /// Id of the task created by `Add`
    pub created: Option<String>,
}

pub fn apply(tasks: &[Task], command: BoardCommand, now: DateTime<Utc>) -> Applied {
    let mut created = None;
    let tasks = match command {
        BoardCommand::Add { draft, stage } => {
            let (next, id) = add_task(tasks, draft, stage, now);
            created = id;
            next
        }
        BoardCommand::Update { id, patch } => update_task(tasks, &id, &patch, now),
        BoardCommand::Delete { id } => delete_task(tasks, &id),
        BoardCommand::ToggleDone { id } => toggle_done(tasks, &id, now),
        BoardCommand::AddSubtask { todo_id, title } => add_subtask(tasks, &todo_id, &title, now),
        BoardCommand::RemoveSubtask {
            todo_id,
            subtask_id,
        } => remove_subtask(tasks, &todo_id, &subtask_id, now),
        BoardCommand::ToggleSubtask {
            todo_id,
            subtask_id,
        } => toggle_subtask(tasks, &todo_id, &subtask_id, now),
        BoardCommand::Replace(next) => next,
    };
    Applied { tasks, created }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

pub fn find_task<'a>(tasks: &'a [Task], id: &str) -> Option<&'a Task> {
    tasks.iter().find(|t| t.id == id)
}

/// Resolve a full id or a unique id prefix to a task id.
pub fn resolve_task_id(tasks: &[Task], query: &str) -> Result<String, ResolveError> {
    let query = query.trim();
    let ids = tasks.iter().map(|t| t.id.as_str());
    resolve_prefix(ids, query).map_err(|e| match e {
        ResolveError::SubTaskNotFound(q) => ResolveError::NotFound(q),
        other => other,
    })
}

/// Resolve a sub-task id or unique prefix within one task.
pub fn resolve_subtask_id(task: &Task, query: &str) -> Result<String, ResolveError> {
    resolve_prefix(task.subtasks.iter().map(|s| s.id.as_str()), query.trim())
}

fn resolve_prefix<'a>(
    ids: impl Iterator<Item = &'a str>,
    query: &str,
) -> Result<String, ResolveError> {
    if query.is_empty() {
        return Err(ResolveError::SubTaskNotFound(query.to_string()));
    }
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(query)).collect();
    if let Some(exact) = matches.iter().find(|id| **id == query) {
        return Ok(exact.to_string());
    }
    match matches.as_slice() {
        [] => Err(ResolveError::SubTaskNotFound(query.to_string())),
        [one] => Ok(one.to_string()),
        many => Err(ResolveError::Ambiguous {
            prefix: query.to_string(),
            count: many.len(),
        }),
    }
}
