use std::collections::HashMap;

use ratatui::style::Color;

use crate::model::config::UiConfig;
use crate::model::profile::ThemePreference;
use crate::model::task::{Category, Priority, Stage};

/// Parsed color theme for the TUI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub preference: ThemePreference,
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    pub purple: Color,
    pub blue: Color,
    pub selection_bg: Color,
    pub selection_border: Color,
    pub border: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Theme {
            preference: ThemePreference::Dark,
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            cyan: Color::Rgb(0x44, 0xDD, 0xFF),
            purple: Color::Rgb(0xCC, 0x66, 0xFF),
            blue: Color::Rgb(0x44, 0x88, 0xFF),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            selection_border: Color::Rgb(0xFB, 0x41, 0x96),
            border: Color::Rgb(0x4A, 0x45, 0x7A),
        }
    }

    pub fn light() -> Self {
        Theme {
            preference: ThemePreference::Light,
            background: Color::Rgb(0xFA, 0xF8, 0xF5),
            text: Color::Rgb(0x3A, 0x36, 0x4A),
            text_bright: Color::Rgb(0x10, 0x0C, 0x1E),
            highlight: Color::Rgb(0xC2, 0x18, 0x5B),
            dim: Color::Rgb(0x8A, 0x86, 0x99),
            red: Color::Rgb(0xC6, 0x28, 0x28),
            yellow: Color::Rgb(0xB2, 0x80, 0x00),
            green: Color::Rgb(0x2E, 0x7D, 0x32),
            cyan: Color::Rgb(0x00, 0x83, 0x8F),
            purple: Color::Rgb(0x6A, 0x1B, 0x9A),
            blue: Color::Rgb(0x15, 0x65, 0xC0),
            selection_bg: Color::Rgb(0xF3, 0xE0, 0xEA),
            selection_border: Color::Rgb(0xC2, 0x18, 0x5B),
            border: Color::Rgb(0xC9, 0xC4, 0xD6),
        }
    }

    /// Built-in palette for `preference` with `[ui.colors.<light|dark>]`
    /// overrides applied. Unknown slots and malformed colors are ignored.
    pub fn from_config(preference: ThemePreference, ui: &UiConfig) -> Self {
        let mut theme = match preference {
            ThemePreference::Light => Theme::light(),
            ThemePreference::Dark => Theme::dark(),
        };
        if let Some(overrides) = ui.colors.get(preference.as_str()) {
            theme.apply_overrides(overrides);
        }
        theme
    }

    fn apply_overrides(&mut self, overrides: &HashMap<String, String>) {
        for (slot, value) in overrides {
            let Some(color) = parse_hex_color(value) else {
                continue;
            };
            let target = match slot.as_str() {
                "background" => &mut self.background,
                "text" => &mut self.text,
                "text_bright" => &mut self.text_bright,
                "highlight" => &mut self.highlight,
                "dim" => &mut self.dim,
                "red" => &mut self.red,
                "yellow" => &mut self.yellow,
                "green" => &mut self.green,
                "cyan" => &mut self.cyan,
                "purple" => &mut self.purple,
                "blue" => &mut self.blue,
                "selection_bg" => &mut self.selection_bg,
                "selection_border" => &mut self.selection_border,
                "border" => &mut self.border,
                _ => continue,
            };
            *target = color;
        }
    }

    pub fn category_color(&self, category: Category) -> Color {
        match category {
            Category::Work => self.blue,
            Category::Personal => self.purple,
            Category::Shopping => self.yellow,
            Category::Learning => self.cyan,
            Category::Health => self.green,
            Category::Other => self.dim,
        }
    }

    pub fn priority_color(&self, priority: Priority) -> Color {
        match priority {
            Priority::Low => self.dim,
            Priority::Medium => self.text,
            Priority::High => self.yellow,
            Priority::Critical => self.red,
        }
    }

    /// Column title color
    pub fn stage_color(&self, stage: Stage) -> Color {
        match stage {
            Stage::Backlog => self.dim,
            Stage::Todo => self.text_bright,
            Stage::InProgress => self.highlight,
            Stage::Done => self.green,
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#FF4444"), Some(Color::Rgb(0xFF, 0x44, 0x44)));
        assert_eq!(parse_hex_color("#0c001b"), Some(Color::Rgb(0x0C, 0x00, 0x1B)));
        assert_eq!(parse_hex_color("FF4444"), None);
        assert_eq!(parse_hex_color("#FF44"), None);
        assert_eq!(parse_hex_color("#ZZZZZZ"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn preference_picks_palette() {
        let ui = UiConfig::default();
        assert_eq!(Theme::from_config(ThemePreference::Dark, &ui), Theme::dark());
        assert_eq!(Theme::from_config(ThemePreference::Light, &ui), Theme::light());
        assert_ne!(Theme::light().background, Theme::dark().background);
    }

    #[test]
    fn overrides_apply_only_to_their_palette() {
        let mut ui = UiConfig::default();
        let mut dark = HashMap::new();
        dark.insert("background".to_string(), "#000000".to_string());
        dark.insert("nonsense".to_string(), "#111111".to_string());
        dark.insert("text".to_string(), "not a color".to_string());
        ui.colors.insert("dark".to_string(), dark);

        let theme = Theme::from_config(ThemePreference::Dark, &ui);
        assert_eq!(theme.background, Color::Rgb(0, 0, 0));
        assert_eq!(theme.text, Theme::dark().text);

        let light = Theme::from_config(ThemePreference::Light, &ui);
        assert_eq!(light, Theme::light());
    }

    #[test]
    fn critical_stands_out() {
        let theme = Theme::dark();
        assert_eq!(theme.priority_color(Priority::Critical), theme.red);
        assert_eq!(theme.category_color(Category::Other), theme.dim);
    }
}
