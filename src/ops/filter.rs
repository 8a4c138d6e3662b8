use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::task::{Category, Task};

/// Completion filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn cycle(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "completed" | "done" => Ok(StatusFilter::Completed),
            _ => Err(format!(
                "unknown status '{}' (expected: all, active, completed)",
                s
            )),
        }
    }
}

/// What the board and `tb list` show. Filtering hides cards; it never changes
/// the collection or the indices drag/drop works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub category: Option<Category>,
}

impl Filters {
    pub fn matches(&self, task: &Task) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        };
        status_ok && self.category.is_none_or(|c| task.category == c)
    }

    pub fn is_active(&self) -> bool {
        *self != Filters::default()
    }

    /// all → work → personal → ... → other → all
    pub fn cycle_category(&mut self) {
        self.category = match self.category {
            None => Some(Category::ALL[0]),
            Some(c) if c == Category::ALL[Category::ALL.len() - 1] => None,
            Some(c) => Some(c.cycle()),
        };
    }

    pub fn clear(&mut self) {
        *self = Filters::default();
    }

    /// Short label for the status row, e.g. "active · work"
    pub fn describe(&self) -> String {
        match self.category {
            Some(c) => format!("{} · {}", self.status, c),
            None => self.status.to_string(),
        }
    }
}
