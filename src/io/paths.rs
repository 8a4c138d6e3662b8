use std::path::{Path, PathBuf};

/// Environment variable that overrides the default data directory
pub const DATA_DIR_ENV: &str = "TB_DATA_DIR";

pub const STORE_FILE: &str = "store.json";
pub const CONFIG_FILE: &str = "config.toml";
pub const STATE_FILE: &str = ".state.json";
pub const RECOVERY_FILE: &str = ".recovery.log";

/// Resolve the data directory: explicit flag, then `$TB_DATA_DIR`, then `~/.taskboard`.
///
/// The directory is not created here; writers create it on first use.
pub fn resolve_data_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Ok(dir) = std::env::var(DATA_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }
    home_dir().join(".taskboard")
}

/// Get the user's home directory
fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

pub fn store_path(data_dir: &Path) -> PathBuf {
    data_dir.join(STORE_FILE)
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

pub fn state_path(data_dir: &Path) -> PathBuf {
    data_dir.join(STATE_FILE)
}

pub fn recovery_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(RECOVERY_FILE)
}

/// Abbreviate a path by replacing $HOME with ~
pub fn abbreviate_path(path: &Path) -> String {
    if let Ok(home) = std::env::var("HOME")
        && let Ok(rest) = path.strip_prefix(&home)
    {
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}
