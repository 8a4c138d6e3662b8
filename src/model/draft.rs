use serde::{Deserialize, Serialize};

use super::task::{Category, Priority, Stage, SubTask, Task};

/// A task payload from the add form, without identity or timestamps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    /// Overrides the requested column when set
    #[serde(default)]
    pub stage: Option<Stage>,
    #[serde(default)]
    pub subtasks: Option<Vec<SubTask>>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        TaskDraft {
            title: title.into(),
            ..Default::default()
        }
    }

    /// A draft is submittable once its title has visible text
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// A partial edit. Fields left as `None` keep the task's current value.
///
/// There is no `completed` field: it is always derived from `stage`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub stage: Option<Stage>,
    pub subtasks: Option<Vec<SubTask>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Build a patch carrying every editable field of `task`, as the edit form does
    pub fn from_task(task: &Task) -> Self {
        TaskPatch {
            title: Some(task.title.clone()),
            description: Some(task.description.clone()),
            category: Some(task.category),
            priority: Some(task.priority),
            stage: Some(task.stage),
            subtasks: None,
        }
    }

    /// A blank title in the patch rejects the whole edit
    pub fn is_valid(&self) -> bool {
        self.title.as_deref().is_none_or(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_validity_ignores_whitespace() {
        assert!(TaskDraft::new("Write report").is_valid());
        assert!(!TaskDraft::new("   ").is_valid());
        assert!(!TaskDraft::new("").is_valid());
    }

    #[test]
    fn draft_defaults_match_form_defaults() {
        let draft = TaskDraft::new("x");
        assert_eq!(draft.category, Category::Other);
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.stage, None);
        assert_eq!(draft.subtasks, None);
    }

    #[test]
    fn patch_validity() {
        assert!(TaskPatch::default().is_valid());
        assert!(TaskPatch::default().is_empty());
        let blank = TaskPatch {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert!(!blank.is_valid());
    }
}
