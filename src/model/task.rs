use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow column a task occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Backlog,
    Todo,
    InProgress,
    Done,
}

impl Stage {
    /// All stages in board order (left to right)
    pub const ALL: [Stage; 4] = [Stage::Backlog, Stage::Todo, Stage::InProgress, Stage::Done];

    /// Position of this stage in board order
    pub fn index(self) -> usize {
        match self {
            Stage::Backlog => 0,
            Stage::Todo => 1,
            Stage::InProgress => 2,
            Stage::Done => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Stage> {
        Stage::ALL.get(index).copied()
    }

    /// Human-readable column title
    pub fn label(self) -> &'static str {
        match self {
            Stage::Backlog => "Backlog",
            Stage::Todo => "Todo",
            Stage::InProgress => "In Progress",
            Stage::Done => "Done",
        }
    }

    /// The stage string used in the persisted schema
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Backlog => "Backlog",
            Stage::Todo => "Todo",
            Stage::InProgress => "InProgress",
            Stage::Done => "Done",
        }
    }

    pub fn is_done(self) -> bool {
        self == Stage::Done
    }

    /// Next column to the right, saturating at Done
    pub fn next(self) -> Stage {
        Stage::from_index(self.index() + 1).unwrap_or(Stage::Done)
    }

    /// Next column to the left, saturating at Backlog
    pub fn prev(self) -> Stage {
        self.index()
            .checked_sub(1)
            .and_then(Stage::from_index)
            .unwrap_or(Stage::Backlog)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "backlog" => Ok(Stage::Backlog),
            "todo" => Ok(Stage::Todo),
            "inprogress" | "in-progress" | "in_progress" | "in progress" => Ok(Stage::InProgress),
            "done" => Ok(Stage::Done),
            _ => Err(format!(
                "unknown stage '{}' (expected: backlog, todo, in-progress, done)",
                s
            )),
        }
    }
}

/// Task category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
    Shopping,
    Learning,
    Health,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Work,
        Category::Personal,
        Category::Shopping,
        Category::Learning,
        Category::Health,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Shopping => "shopping",
            Category::Learning => "learning",
            Category::Health => "health",
            Category::Other => "other",
        }
    }

    /// Capitalized label for forms and cards
    pub fn label(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Shopping => "Shopping",
            Category::Learning => "Learning",
            Category::Health => "Health",
            Category::Other => "Other",
        }
    }

    /// Cycle to the next category (wraps around)
    pub fn cycle(self) -> Category {
        let idx = Category::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Category::ALL[(idx + 1) % Category::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown category '{}' (expected: work, personal, shopping, learning, health, other)",
                    s
                )
            })
    }
}

/// Task priority, ordered by severity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }

    /// Cycle to the next priority (wraps around)
    pub fn cycle(self) -> Priority {
        let idx = Priority::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Priority::ALL[(idx + 1) % Priority::ALL.len()]
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown priority '{}' (expected: low, medium, high, critical)",
                    s
                )
            })
    }
}

/// A checklist item owned by a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl SubTask {
    pub fn new(title: String) -> Self {
        SubTask {
            id: new_id(),
            title,
            completed: false,
        }
    }
}

/// A task card on the board.
///
/// `completed` mirrors `stage == Done`; every operation that changes `stage`
/// re-derives it through [`Task::set_stage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    pub stage: Stage,
    pub subtasks: Vec<SubTask>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Move the task to `stage`, keeping `completed` in sync
    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
        self.completed = stage.is_done();
    }

    /// Whether `completed` agrees with `stage`
    pub fn is_consistent(&self) -> bool {
        self.completed == self.stage.is_done()
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// (completed, total) sub-task counts
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        (done, self.subtasks.len())
    }
}

/// Generate a fresh unique identifier for a task or sub-task
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current time at the millisecond precision timestamps are stored with
pub fn timestamp_now() -> DateTime<Utc> {
    truncate_to_millis(Utc::now())
}

pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}
