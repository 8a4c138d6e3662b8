//! Grab-move-drop reordering across stage columns.
//!
//! Positions are always column-relative indices on the unfiltered board: a
//! drag records where the card was picked up, and a drop names the column and
//! slot it should land in.

use chrono::{DateTime, Utc};

use crate::model::task::{Stage, Task};
use crate::ops::columns::{flatten_owned, partition_owned};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source_stage: Stage,
        source_index: usize,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DragCoordinator {
    state: DragState,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Pick up the card at `index` in `stage`. Replaces any drag in progress.
    pub fn begin(&mut self, stage: Stage, index: usize) {
        self.state = DragState::Dragging {
            source_stage: stage,
            source_index: index,
        };
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Drop the held card at `target_index` in `target_stage` and return the
    /// reordered collection. The index is clamped to the column length.
    ///
    /// Returns `None` (and goes idle) when nothing is held or the recorded
    /// source slot no longer exists.
    pub fn drop_at(
        &mut self,
        tasks: &[Task],
        target_stage: Stage,
        target_index: usize,
        now: DateTime<Utc>,
    ) -> Option<Vec<Task>> {
        let DragState::Dragging {
            source_stage,
            source_index,
        } = std::mem::take(&mut self.state)
        else {
            return None;
        };

        let mut lists = partition_owned(tasks.to_vec());
        let source = &mut lists[source_stage.index()];
        if source_index >= source.len() {
            return None;
        }
        let mut moved = source.remove(source_index);
        if moved.stage != target_stage {
            moved.set_stage(target_stage);
            moved.touch(now);
        }

        let dest = &mut lists[target_stage.index()];
        let at = target_index.min(dest.len());
        if source_stage == target_stage && at == source_index {
            return Some(tasks.to_vec());
        }
        dest.insert(at, moved);
        Some(flatten_owned(lists))
    }
}

/// Move the task with `id` to `target_index` in `target_stage` in one step.
/// `None` when no task has that id.
pub fn move_task(
    tasks: &[Task],
    id: &str,
    target_stage: Stage,
    target_index: usize,
    now: DateTime<Utc>,
) -> Option<Vec<Task>> {
    let (stage, index) = locate(tasks, id)?;
    let mut drag = DragCoordinator::new();
    drag.begin(stage, index);
    drag.drop_at(tasks, target_stage, target_index, now)
}

/// Column and column-relative index of the task with `id`
pub fn locate(tasks: &[Task], id: &str) -> Option<(Stage, usize)> {
    let task = tasks.iter().find(|t| t.id == id)?;
    let index = tasks
        .iter()
        .filter(|t| t.stage == task.stage)
        .position(|t| t.id == id)?;
    Some((task.stage, index))
}
