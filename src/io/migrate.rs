//! Load-time upgrade of stored task records.
//!
//! Older boards stored a free-form `status` string and no sub-tasks. Each stored
//! element is decoded as a [`StoredRecord`]: either an already-current [`Task`]
//! or a permissive [`LegacyRecord`] that is mapped onto the current schema.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::model::task::{
    Category, Priority, Stage, SubTask, Task, new_id, truncate_to_millis,
};

/// A stored element, decoded at the storage boundary
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredRecord {
    /// Carries both `stage` and `subtasks`
    Current(Task),
    Legacy(LegacyRecord),
}

/// Any older record shape. Everything but the title is optional; unknown
/// enum spellings are tolerated and defaulted during mapping.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub subtasks: Option<Vec<SubTask>>,
    #[serde(default)]
    pub created_at: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<f64>,
}

/// Stage for a record without a usable `stage` field
pub fn stage_for_status(status: Option<&str>, completed: Option<bool>) -> Stage {
    match status.map(|s| s.trim().to_lowercase()) {
        Some(s) if s == "ongoing" => Stage::InProgress,
        Some(s) if s == "done" => Stage::Done,
        Some(_) => Stage::Backlog,
        None if completed == Some(true) => Stage::Done,
        None => Stage::Backlog,
    }
}

impl LegacyRecord {
    /// Map onto the current schema. Total: every legacy record yields a task.
    pub fn into_task(self, now: DateTime<Utc>) -> Task {
        let stage = self
            .stage
            .as_deref()
            .and_then(|s| s.parse::<Stage>().ok())
            .unwrap_or_else(|| stage_for_status(self.status.as_deref(), self.completed));
        let created_at = self.created_at.and_then(millis_to_datetime).unwrap_or(now);
        let updated_at = self
            .updated_at
            .and_then(millis_to_datetime)
            .unwrap_or(created_at);

        Task {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(new_id),
            title: self.title,
            description: self.description.unwrap_or_default(),
            completed: stage.is_done(),
            category: self
                .category
                .and_then(|c| c.parse::<Category>().ok())
                .unwrap_or_default(),
            priority: self
                .priority
                .and_then(|p| p.parse::<Priority>().ok())
                .unwrap_or_default(),
            stage,
            subtasks: self.subtasks.unwrap_or_default(),
            created_at,
            updated_at,
        }
    }
}

fn millis_to_datetime(ms: f64) -> Option<DateTime<Utc>> {
    if ms.is_finite() {
        DateTime::from_timestamp_millis(ms as i64)
    } else {
        None
    }
}

/// A stored element that could not be decoded as any record shape
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRecord {
    /// Position in the stored array; `None` when the stored value was not an array
    pub index: Option<usize>,
    pub raw: String,
    pub reason: String,
}

/// Result of a migration pass
#[derive(Debug, Clone, Default)]
pub struct Migration {
    pub tasks: Vec<Task>,
    /// Whether any record had to be rewritten
    pub changed: bool,
    pub dropped: Vec<DroppedRecord>,
}

impl Migration {
    /// Whether the store should be rewritten with `tasks`
    pub fn needs_rewrite(&self) -> bool {
        self.changed || !self.dropped.is_empty()
    }
}

/// Migrate the raw value stored under the items key.
///
/// Absent means an empty board. Any non-array value is reported as a single
/// dropped record and yields an empty board.
pub fn migrate_value(value: Option<&Value>, now: DateTime<Utc>) -> Migration {
    match value {
        None | Some(Value::Null) => Migration::default(),
        Some(Value::Array(items)) => migrate(items, now),
        Some(other) => Migration {
            tasks: Vec::new(),
            changed: false,
            dropped: vec![DroppedRecord {
                index: None,
                raw: other.to_string(),
                reason: "stored items are not an array".to_string(),
            }],
        },
    }
}

/// Decode and upgrade each stored element, preserving order.
pub fn migrate(values: &[Value], now: DateTime<Utc>) -> Migration {
    let now = truncate_to_millis(now);
    let mut out = Migration::default();

    for (index, value) in values.iter().enumerate() {
        match StoredRecord::deserialize(value) {
            Ok(StoredRecord::Current(mut task)) => {
                if !task.is_consistent() {
                    task.completed = task.stage.is_done();
                    out.changed = true;
                }
                out.tasks.push(task);
            }
            Ok(StoredRecord::Legacy(record)) => {
                out.tasks.push(record.into_task(now));
                out.changed = true;
            }
            Err(e) => out.dropped.push(DroppedRecord {
                index: Some(index),
                raw: value.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    out
}
