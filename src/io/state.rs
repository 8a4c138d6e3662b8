use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::io::paths::state_path;
use crate::io::store::atomic_write;
use crate::model::task::Stage;
use crate::ops::filter::Filters;

/// Persisted TUI state (written to .state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UiState {
    /// Column that had focus
    #[serde(default)]
    pub focused_stage: Stage,
    /// Cursor row per column, in stage order
    #[serde(default)]
    pub cursors: [usize; 4],
    /// Active view filters
    #[serde(default)]
    pub filters: Filters,
    /// Per-session key hint override (None = use config default)
    #[serde(default)]
    pub key_hints_override: Option<bool>,
}

/// Read .state.json from the data directory
pub fn read_ui_state(data_dir: &Path) -> Option<UiState> {
    let content = fs::read_to_string(state_path(data_dir)).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the data directory
pub fn write_ui_state(data_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let content = serde_json::to_string_pretty(state)?;
    atomic_write(&state_path(data_dir), content.as_bytes())
}
