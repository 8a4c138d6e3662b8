use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::io::paths::recovery_log_path;
use crate::io::store::atomic_write;
use crate::model::task::Task;

/// Log size above which old entries are trimmed before appending (1 MB)
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Default number of days before entries are prunable.
pub const PRUNE_AGE_DAYS: i64 = 30;

const FILE_HEADER: &str = "\
<!-- taskboard recovery log
     Records the board could not load or save, and every deleted task,
     are kept here as JSON.
     View with: tb recovery
     Prune old entries: tb recovery prune
     Safe to delete once nothing here is needed. -->

---
";

/// What kind of data an entry preserves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// A stored value that could not be decoded
    Parser,
    /// A store write that failed; the body holds the unsaved value
    Write,
    /// A task removed by the user
    Delete,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Parser => write!(f, "parser"),
            RecoveryCategory::Write => write!(f, "write"),
            RecoveryCategory::Delete => write!(f, "delete"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "parser" => Some(RecoveryCategory::Parser),
            "write" => Some(RecoveryCategory::Write),
            "delete" => Some(RecoveryCategory::Delete),
            _ => None,
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl RecoveryEntry {
    pub fn new(category: RecoveryCategory, description: impl Into<String>) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: Vec::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Render as a markdown block:
    ///
    /// ```text
    /// ## 2026-02-10T14:32:05Z [delete] task 3f2a deleted
    ///
    /// Task: 3f2a...
    ///
    /// ```json
    /// {...}
    /// ```
    ///
    /// ---
    /// ```
    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {} [{}] {}\n\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        );
        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        if !self.body.is_empty() {
            out.push_str("\n```json\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }
        out.push_str("\n---\n");
        out
    }

    /// JSON form used by `tb recovery --json`
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append an entry to the log. Failures are reported on stderr and otherwise ignored.
pub fn log_recovery(data_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = append_entry(data_dir, &entry) {
        eprintln!("warning: could not write to recovery log: {}", e);
    }
}

fn append_entry(data_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let path = recovery_log_path(data_dir);

    if let Ok(meta) = std::fs::metadata(&path)
        && meta.len() > MAX_LOG_SIZE
    {
        let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
        if let Ok(content) = std::fs::read_to_string(&path) {
            let _ = atomic_write(&path, prune_entries_before(&content, &cutoff).as_bytes());
        }
    }

    let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())
}

/// Preserve a deleted task so it can be restored by hand.
pub fn log_task_deletion(data_dir: &Path, task: &Task) {
    let body = serde_json::to_string_pretty(task).unwrap_or_default();
    log_recovery(
        data_dir,
        RecoveryEntry::new(
            RecoveryCategory::Delete,
            format!("task {} deleted", short_id(&task.id)),
        )
        .field("Task", task.id.clone())
        .field("Title", task.title.clone())
        .body(body),
    );
}

/// Preserve a stored record that could not be decoded.
pub fn log_dropped_record(data_dir: &Path, key: &str, index: Option<usize>, raw: &str, reason: &str) {
    let mut entry = RecoveryEntry::new(RecoveryCategory::Parser, "dropped unreadable record")
        .field("Key", key);
    if let Some(i) = index {
        entry = entry.field("Index", i.to_string());
    }
    log_recovery(data_dir, entry.field("Error", reason).body(raw));
}

/// Preserve a value the store failed to persist.
pub fn log_write_failure(data_dir: &Path, key: &str, payload: &str, error: &str) {
    log_recovery(
        data_dir,
        RecoveryEntry::new(RecoveryCategory::Write, format!("could not save {}", key))
            .field("Key", key)
            .field("Error", error)
            .body(payload),
    );
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read entries, most recent first, optionally limited to the newest `limit`
/// and to those at or after `since`.
pub fn read_recovery_entries(
    data_dir: &Path,
    limit: Option<usize>,
    since: Option<DateTime<Utc>>,
) -> Vec<RecoveryEntry> {
    let content = match std::fs::read_to_string(recovery_log_path(data_dir)) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);
    if let Some(since) = since {
        entries.retain(|e| e.timestamp >= since);
    }
    entries.reverse();
    if let Some(n) = limit {
        entries.truncate(n);
    }
    entries
}

/// Number of entries in the log
pub fn recovery_count(data_dir: &Path) -> usize {
    std::fs::read_to_string(recovery_log_path(data_dir))
        .map(|c| parse_entries(&c).len())
        .unwrap_or(0)
}

fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines().peekable();

    while let Some(line) = lines.next() {
        let Some((timestamp, category, description)) =
            line.strip_prefix("## ").and_then(parse_entry_header)
        else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body_lines: Vec<&str> = Vec::new();
        let mut in_body = false;

        while let Some(&next) = lines.peek() {
            if !in_body && (next == "---" || next.starts_with("## ")) {
                if next == "---" {
                    lines.next();
                }
                break;
            }
            lines.next();
            if in_body {
                if next == "```" {
                    in_body = false;
                } else {
                    body_lines.push(next);
                }
            } else if next.starts_with("```") {
                in_body = true;
            } else if let Some((key, value)) = next.trim().split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(RecoveryEntry {
            timestamp,
            category,
            description,
            fields,
            body: body_lines.join("\n"),
        });
    }

    entries
}

/// Parse `<rfc3339> [<category>] <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (timestamp_str, rest) = header.split_once(' ')?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc);
    let rest = rest.strip_prefix('[')?;
    let (category_str, description) = rest.split_once("] ")?;
    let category = RecoveryCategory::parse_category(category_str)?;
    Some((timestamp, category, description.to_string()))
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Remove entries older than `before` (default: 30 days ago), or every entry
/// when `all` is set. Returns the number of entries removed.
pub fn prune_recovery(
    data_dir: &Path,
    before: Option<DateTime<Utc>>,
    all: bool,
) -> io::Result<usize> {
    let path = recovery_log_path(data_dir);
    if !path.exists() {
        return Ok(0);
    }
    let content = std::fs::read_to_string(&path)?;
    let original_count = parse_entries(&content).len();

    if all {
        atomic_write(&path, FILE_HEADER.as_bytes())?;
        return Ok(original_count);
    }

    let cutoff = before.unwrap_or_else(|| Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS));
    let trimmed = prune_entries_before(&content, &cutoff);
    let remaining = parse_entries(&trimmed).len();
    atomic_write(&path, trimmed.as_bytes())?;
    Ok(original_count - remaining)
}

/// Drop entries stamped before `cutoff`, keeping the file header intact.
fn prune_entries_before(content: &str, cutoff: &DateTime<Utc>) -> String {
    let mut result = String::new();
    let mut current = String::new();
    let mut keep_current = false;
    let mut in_header = content.starts_with("<!--");

    for line in content.lines() {
        if in_header {
            result.push_str(line);
            result.push('\n');
            if line == "---" {
                in_header = false;
            }
            continue;
        }

        if let Some(header) = line.strip_prefix("## ")
            && let Some((ts, _, _)) = parse_entry_header(header)
        {
            if keep_current {
                result.push_str(&current);
            }
            current.clear();
            keep_current = ts >= *cutoff;
        }
        current.push_str(line);
        current.push('\n');
    }
    if keep_current {
        result.push_str(&current);
    }
    result
}
