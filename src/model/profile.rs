use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Color scheme preference, stored under `ts_todo:theme`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn toggle(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            _ => Err(format!("unknown theme '{}' (expected: light, dark)", s)),
        }
    }
}

/// The board owner's display name. Empty means the board should ask for one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
}

impl UserProfile {
    pub fn new(name: impl Into<String>) -> Self {
        UserProfile { name: name.into() }
    }

    pub fn needs_name(&self) -> bool {
        self.name.trim().is_empty()
    }

    /// Header greeting
    pub fn greeting(&self) -> String {
        if self.needs_name() {
            "Welcome!".to_string()
        } else {
            format!("Hello, {}!", self.name.trim())
        }
    }
}

/// Trim a submitted name; blank input is rejected
pub fn normalize_name(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_falls_back_to_welcome() {
        assert_eq!(UserProfile::default().greeting(), "Welcome!");
        assert_eq!(UserProfile::new("  ").greeting(), "Welcome!");
        assert_eq!(UserProfile::new("Ada").greeting(), "Hello, Ada!");
    }

    #[test]
    fn name_is_trimmed_and_blank_rejected() {
        assert_eq!(normalize_name("  Ada  "), Some("Ada".to_string()));
        assert_eq!(normalize_name("   "), None);
        assert_eq!(normalize_name(""), None);
    }

    #[test]
    fn theme_toggles_and_parses() {
        assert_eq!(ThemePreference::Light.toggle(), ThemePreference::Dark);
        assert_eq!(ThemePreference::Dark.toggle(), ThemePreference::Light);
        assert_eq!("DARK".parse::<ThemePreference>(), Ok(ThemePreference::Dark));
        assert!("sepia".parse::<ThemePreference>().is_err());
        assert_eq!(
            serde_json::to_string(&ThemePreference::Dark).unwrap(),
            "\"dark\""
        );
    }
}
