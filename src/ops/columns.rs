use crate::model::task::{Stage, Task};

/// The board split into one ordered list per stage, borrowing the collection.
///
/// Relative order inside each list is the collection order.
#[derive(Debug, Clone)]
pub struct Columns<'a> {
    lists: [Vec<&'a Task>; 4],
}

impl<'a> Columns<'a> {
    pub fn get(&self, stage: Stage) -> &[&'a Task] {
        &self.lists[stage.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, &[&'a Task])> {
        Stage::ALL.into_iter().map(|s| (s, self.get(s)))
    }

    /// Task counts in stage order
    pub fn counts(&self) -> [usize; 4] {
        Stage::ALL.map(|s| self.lists[s.index()].len())
    }

    /// Concatenate the columns in stage order
    pub fn flatten(&self) -> Vec<Task> {
        self.lists
            .iter()
            .flat_map(|list| list.iter().map(|t| (*t).clone()))
            .collect()
    }
}

pub fn partition(tasks: &[Task]) -> Columns<'_> {
    let mut lists: [Vec<&Task>; 4] = Default::default();
    for task in tasks {
        lists[task.stage.index()].push(task);
    }
    Columns { lists }
}

/// Owning variant used when the lists are about to be edited
pub fn partition_owned(tasks: Vec<Task>) -> [Vec<Task>; 4] {
    let mut lists: [Vec<Task>; 4] = Default::default();
    for task in tasks {
        lists[task.stage.index()].push(task);
    }
    lists
}

pub fn flatten_owned(lists: [Vec<Task>; 4]) -> Vec<Task> {
    lists.into_iter().flatten().collect()
}

/// Per-stage collection indices, recomputed only when the board revision changes
#[derive(Debug, Default)]
pub struct ColumnCache {
    revision: Option<u64>,
    indices: [Vec<usize>; 4],
}

impl ColumnCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices into `tasks` for each stage, in stage order
    pub fn get(&mut self, revision: u64, tasks: &[Task]) -> &[Vec<usize>; 4] {
        if self.revision != Some(revision) {
            for list in &mut self.indices {
                list.clear();
            }
            for (i, task) in tasks.iter().enumerate() {
                self.indices[task.stage.index()].push(i);
            }
            self.revision = Some(revision);
        }
        &self.indices
    }

    /// Indices for a single stage
    pub fn column(&mut self, revision: u64, tasks: &[Task], stage: Stage) -> &[usize] {
        &self.get(revision, tasks)[stage.index()]
    }

    pub fn invalidate(&mut self) {
        self.revision = None;
    }
}
