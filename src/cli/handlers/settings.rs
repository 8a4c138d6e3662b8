use std::path::Path;

use chrono::{DateTime, Utc};

use super::{CmdResult, data_dir_display};
use crate::cli::commands::*;
use crate::cli::output::ProfileJson;
use crate::io::board_store::BoardStore;
use crate::io::config_io;
use crate::io::paths::{abbreviate_path, config_path, recovery_log_path};
use crate::io::recovery;
use crate::io::store::KvStore;
use crate::model::profile::{ThemePreference, normalize_name};
use crate::model::task::timestamp_now;

/// Default number of entries shown by `tb recovery`
const DEFAULT_RECOVERY_LIMIT: usize = 10;

// Profile keys share store.json with the task collection, so they go
// through the board and its migration pass.
fn open(data_dir: &Path) -> BoardStore {
    BoardStore::load(KvStore::open(data_dir), timestamp_now()).0
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

pub(super) fn cmd_name(data_dir: &Path, args: NameArgs, json: bool) -> CmdResult {
    let mut store = open(data_dir);
    if let Some(raw) = args.name {
        let name = normalize_name(&raw).ok_or("name cannot be empty")?;
        store.set_name(&name)?;
    }

    let profile = store.profile();
    if json {
        let out = ProfileJson {
            name: profile.name.clone(),
            greeting: profile.greeting(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if profile.needs_name() {
        println!("(no name set; use `tb name <name>`)");
    } else {
        println!("{}", profile.name);
    }
    Ok(())
}

pub(super) fn cmd_theme(data_dir: &Path, args: ThemeArgs, json: bool) -> CmdResult {
    let mut store = open(data_dir);
    if let Some(value) = args.value {
        let theme = if value.eq_ignore_ascii_case("toggle") {
            store.theme().toggle()
        } else {
            value.parse::<ThemePreference>()?
        };
        store.set_theme(theme)?;
    }

    let theme = store.theme();
    if json {
        println!("{}", serde_json::to_string(&theme)?);
    } else {
        println!("{}", theme);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

pub(super) fn cmd_config(data_dir: &Path, args: ConfigCmd, json: bool) -> CmdResult {
    match args.action {
        None => {
            let config = config_io::load_config(data_dir)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
        Some(ConfigAction::Set(set)) => {
            let (_, mut doc) = config_io::read_config_document(data_dir)?;
            config_io::set_config_value(&mut doc, &set.key, &set.value)?;
            config_io::write_config_document(data_dir, &doc)?;
        }
        Some(ConfigAction::Path) => {
            println!("{}", config_path(&data_dir_display(data_dir)).display());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

fn parse_timestamp(flag: &str, raw: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("invalid {} timestamp '{}': {}", flag, raw, e).into())
}

pub(super) fn cmd_recovery(data_dir: &Path, args: RecoveryCmd, json: bool) -> CmdResult {
    match args.action {
        Some(RecoveryAction::Path) => {
            println!("{}", recovery_log_path(&data_dir_display(data_dir)).display());
        }
        Some(RecoveryAction::Prune(prune)) => {
            let before = prune
                .before
                .as_deref()
                .map(|raw| parse_timestamp("--before", raw))
                .transpose()?;
            let removed = recovery::prune_recovery(data_dir, before, prune.all)?;
            if json {
                println!("{}", serde_json::json!({ "removed": removed }));
            } else {
                println!("removed {} entr{}", removed, if removed == 1 { "y" } else { "ies" });
            }
        }
        None => {
            let since = args
                .since
                .as_deref()
                .map(|raw| parse_timestamp("--since", raw))
                .transpose()?;
            let limit = args.limit.unwrap_or(DEFAULT_RECOVERY_LIMIT);
            let entries = recovery::read_recovery_entries(data_dir, Some(limit), since);

            if json {
                let values: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else if entries.is_empty() {
                println!(
                    "recovery log is empty ({})",
                    abbreviate_path(&recovery_log_path(data_dir))
                );
            } else {
                for entry in &entries {
                    print!("{}", entry.to_markdown());
                }
                let total = recovery::recovery_count(data_dir);
                if total > entries.len() {
                    println!("({} of {} entries shown, use --limit for more)", entries.len(), total);
                }
            }
        }
    }
    Ok(())
}
