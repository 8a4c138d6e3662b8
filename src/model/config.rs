use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::task::{Category, Priority, Stage};

/// Configuration from config.toml in the data directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Defaults applied when creating tasks, plus delete behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub default_category: Category,
    #[serde(default)]
    pub default_priority: Priority,
    #[serde(default)]
    pub default_stage: Stage,
    /// Ask before deleting a task in the board view
    #[serde(default = "default_true")]
    pub confirm_delete: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            default_category: Category::Other,
            default_priority: Priority::Medium,
            default_stage: Stage::Backlog,
            confirm_delete: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Color overrides keyed by theme ("light" / "dark"), then by palette slot
    #[serde(default)]
    pub colors: HashMap<String, HashMap<String, String>>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_key_hints: true,
            colors: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.board.default_category, Category::Other);
        assert_eq!(config.board.default_priority, Priority::Medium);
        assert_eq!(config.board.default_stage, Stage::Backlog);
        assert!(config.board.confirm_delete);
        assert!(config.ui.show_key_hints);
        assert!(config.ui.colors.is_empty());
    }

    #[test]
    fn parses_board_and_color_sections() {
        let text = r##"
[board]
default_category = "work"
default_priority = "High"
default_stage = "Todo"
confirm_delete = false

[ui.colors.dark]
background = "#101010"
"##;
        let config: AppConfig = toml::from_str(text).unwrap();
        assert_eq!(config.board.default_category, Category::Work);
        assert_eq!(config.board.default_priority, Priority::High);
        assert_eq!(config.board.default_stage, Stage::Todo);
        assert!(!config.board.confirm_delete);
        assert_eq!(config.ui.colors["dark"]["background"], "#101010");
    }
}
