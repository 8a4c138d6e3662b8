use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::paths::config_path;
use crate::io::store::atomic_write;
use crate::model::config::AppConfig;
use crate::model::task::{Category, Priority, Stage};

/// Error type for config.toml access
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not parse config.toml: {0}")]
    EditParseError(#[from] toml_edit::TomlError),
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Load the config; a missing file yields the defaults.
pub fn load_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = config_path(data_dir);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(toml::from_str(&text)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::ReadError { path, source: e }),
    }
}

/// Load the config for interactive use: problems are reported once on stderr
/// and the defaults are used instead.
pub fn load_config_or_default(data_dir: &Path) -> AppConfig {
    load_config(data_dir).unwrap_or_else(|e| {
        eprintln!("warning: {} (using defaults)", e);
        AppConfig::default()
    })
}

/// Read the config as both the parsed form and the raw toml_edit document,
/// for round-trip-safe editing.
pub fn read_config_document(
    data_dir: &Path,
) -> Result<(AppConfig, toml_edit::DocumentMut), ConfigError> {
    let path = config_path(data_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(ConfigError::ReadError { path, source: e }),
    };
    let config: AppConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the document back, preserving formatting and comments.
pub fn write_config_document(
    data_dir: &Path,
    doc: &toml_edit::DocumentMut,
) -> Result<(), ConfigError> {
    let path = config_path(data_dir);
    atomic_write(&path, doc.to_string().as_bytes())
        .map_err(|e| ConfigError::WriteError { path, source: e })
}

/// Set a dotted key such as `board.default_stage` or `ui.colors.dark.background`.
///
/// Enum values are normalized to their stored spelling and the edited document
/// must still parse as a valid config.
pub fn set_config_value(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    raw: &str,
) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };
    let value = match key {
        "board.default_category" => {
            toml_edit::value(raw.parse::<Category>().map_err(invalid)?.as_str())
        }
        "board.default_priority" => {
            toml_edit::value(raw.parse::<Priority>().map_err(invalid)?.as_str())
        }
        "board.default_stage" => toml_edit::value(raw.parse::<Stage>().map_err(invalid)?.as_str()),
        "board.confirm_delete" | "ui.show_key_hints" => {
            toml_edit::value(parse_bool(raw).ok_or_else(|| invalid("expected true or false".into()))?)
        }
        _ if is_color_key(key) => toml_edit::value(raw),
        _ => return Err(ConfigError::UnknownKey(key.to_string())),
    };

    let parts: Vec<&str> = key.split('.').collect();
    let (last, tables) = parts
        .split_last()
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    let mut table = doc.as_table_mut();
    for name in tables {
        if !table.contains_key(name) {
            let mut t = toml_edit::Table::new();
            t.set_implicit(true);
            table.insert(name, toml_edit::Item::Table(t));
        }
        table = table[*name]
            .as_table_mut()
            .ok_or_else(|| invalid(format!("{} is not a table", name)))?;
    }
    table[*last] = value;

    toml::from_str::<AppConfig>(&doc.to_string())?;
    Ok(())
}

/// `ui.colors.<light|dark>.<slot>`
fn is_color_key(key: &str) -> bool {
    let parts: Vec<&str> = key.split('.').collect();
    matches!(parts.as_slice(), ["ui", "colors", "light" | "dark", slot] if !slot.is_empty())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
