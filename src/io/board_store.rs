use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::io::migrate::migrate_value;
use crate::io::recovery::{log_dropped_record, log_task_deletion, log_write_failure};
use crate::io::store::{ITEMS_KEY, KvStore, NAME_KEY, StoreError, THEME_KEY};
use crate::model::profile::{ThemePreference, UserProfile};
use crate::model::task::{Task, timestamp_now};
use crate::ops::board_ops::{self, BoardCommand, find_task};

/// Callback run after every replacement with the new collection and revision
pub type Observer = Box<dyn FnMut(&[Task], u64)>;

/// What happened while loading the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Some records were upgraded from an older shape
    pub migrated: bool,
    /// Records that could not be read and went to the recovery log
    pub dropped: usize,
}

/// The in-memory board, the single source of truth for the task collection.
///
/// The collection only changes through [`BoardStore::replace`], which bumps
/// the revision, writes through to the key-value store and notifies observers.
/// A failed write keeps the new state in memory; the unsaved collection goes
/// to the recovery log and the error is held for the caller to report.
pub struct BoardStore {
    kv: KvStore,
    tasks: Vec<Task>,
    revision: u64,
    observers: Vec<Observer>,
    save_error: Option<String>,
}

impl fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardStore")
            .field("data_dir", &self.kv.data_dir())
            .field("tasks", &self.tasks.len())
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl BoardStore {
    /// Open the board in `data_dir`, upgrading stored records if needed.
    pub fn open(data_dir: &Path) -> Self {
        Self::load(KvStore::open(data_dir), timestamp_now()).0
    }

    /// Load the collection from `kv` and run the migration pass.
    ///
    /// The store is rewritten only when a record was upgraded or dropped.
    pub fn load(kv: KvStore, now: DateTime<Utc>) -> (Self, LoadReport) {
        let migration = migrate_value(kv.get_raw(ITEMS_KEY), now);
        for dropped in &migration.dropped {
            log_dropped_record(
                kv.data_dir(),
                ITEMS_KEY,
                dropped.index,
                &dropped.raw,
                &dropped.reason,
            );
        }
        let report = LoadReport {
            migrated: migration.changed,
            dropped: migration.dropped.len(),
        };
        let rewrite = migration.needs_rewrite();

        let mut store = BoardStore {
            kv,
            tasks: migration.tasks,
            revision: 0,
            observers: Vec::new(),
            save_error: None,
        };
        if rewrite {
            store.persist();
        }
        (store, report)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        find_task(&self.tasks, id)
    }

    /// Bumped by every replacement; used to memoize derived views.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn data_dir(&self) -> &Path {
        self.kv.data_dir()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&[Task], u64) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Install `tasks` as the whole collection.
    pub fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.revision += 1;
        self.persist();
        let revision = self.revision;
        for observer in &mut self.observers {
            observer(&self.tasks, revision);
        }
    }

    /// Run a board command. Returns whether the collection changed and the id
    /// of a newly created task. Commands that change nothing do not write.
    pub fn apply(&mut self, command: BoardCommand, now: DateTime<Utc>) -> (bool, Option<String>) {
        let deleted = match &command {
            BoardCommand::Delete { id } => self.find(id).cloned(),
            _ => None,
        };
        let applied = board_ops::apply(&self.tasks, command, now);
        if applied.tasks == self.tasks {
            return (false, applied.created);
        }
        if let Some(task) = deleted {
            log_task_deletion(self.data_dir(), &task);
        }
        self.replace(applied.tasks);
        (true, applied.created)
    }

    /// The last write failure, cleared on read
    pub fn take_save_error(&mut self) -> Option<String> {
        self.save_error.take()
    }

    fn persist(&mut self) {
        if let Err(e) = self.kv.set(ITEMS_KEY, &self.tasks) {
            self.record_failure(ITEMS_KEY, &self.tasks.clone(), &e);
        }
    }

    fn record_failure<T: Serialize + ?Sized>(&mut self, key: &str, value: &T, err: &StoreError) {
        let payload = serde_json::to_string_pretty(value).unwrap_or_default();
        log_write_failure(self.kv.data_dir(), key, &payload, &err.to_string());
        self.save_error = Some(err.to_string());
    }

    // -----------------------------------------------------------------------
    // Profile and theme
    // -----------------------------------------------------------------------

    pub fn profile(&self) -> UserProfile {
        UserProfile::new(self.kv.get(NAME_KEY, String::new()))
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), StoreError> {
        self.kv.set(NAME_KEY, name).inspect_err(|e| {
            log_write_failure(self.kv.data_dir(), NAME_KEY, name, &e.to_string());
        })
    }

    /// Stored theme; absent or unrecognized values read as light
    pub fn theme(&self) -> ThemePreference {
        self.kv.get(THEME_KEY, ThemePreference::Light)
    }

    pub fn set_theme(&mut self, theme: ThemePreference) -> Result<(), StoreError> {
        self.kv.set(THEME_KEY, &theme).inspect_err(|e| {
            log_write_failure(self.kv.data_dir(), THEME_KEY, theme.as_str(), &e.to_string());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::paths::store_path;
    use crate::io::recovery::{RecoveryCategory, read_recovery_entries};
    use crate::model::draft::TaskDraft;
    use crate::model::task::Stage;
    use serde_json::json;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_760_000_000_000).unwrap()
    }

    fn write_store(dir: &Path, value: serde_json::Value) {
        fs::write(store_path(dir), serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    fn add(store: &mut BoardStore, title: &str) -> String {
        store
            .apply(
                BoardCommand::Add {
                    draft: TaskDraft::new(title),
                    stage: None,
                },
                now(),
            )
            .1
            .unwrap()
    }

    #[test]
    fn empty_dir_opens_empty_without_writing() {
        let tmp = TempDir::new().unwrap();
        let store = BoardStore::open(tmp.path());
        assert!(store.tasks().is_empty());
        assert_eq!(store.revision(), 0);
        assert!(!store_path(tmp.path()).exists());
    }

    #[test]
    fn replace_persists_and_bumps_revision() {
        let tmp = TempDir::new().unwrap();
        let mut store = BoardStore::open(tmp.path());
        let id = add(&mut store, "Persist me");
        assert_eq!(store.revision(), 1);

        let reopened = BoardStore::open(tmp.path());
        assert_eq!(reopened.tasks(), store.tasks());
        assert_eq!(reopened.find(&id).unwrap().title, "Persist me");
    }

    #[test]
    fn noop_commands_do_not_bump_revision() {
        let tmp = TempDir::new().unwrap();
        let mut store = BoardStore::open(tmp.path());
        let (changed, _) = store.apply(BoardCommand::ToggleDone { id: "nope".into() }, now());
        assert!(!changed);
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn observers_see_every_replacement() {
        let tmp = TempDir::new().unwrap();
        let mut store = BoardStore::open(tmp.path());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |tasks, rev| sink.borrow_mut().push((tasks.len(), rev)));

        add(&mut store, "one");
        add(&mut store, "two");
        store.replace(Vec::new());
        assert_eq!(*seen.borrow(), vec![(1, 1), (2, 2), (0, 3)]);
    }

    #[test]
    fn legacy_records_are_migrated_and_rewritten() {
        let tmp = TempDir::new().unwrap();
        write_store(
            tmp.path(),
            json!({
                "ts_todo:name": "Ada",
                "ts_todo:items": [
                    {"id": "a", "title": "Old", "completed": false, "status": "ongoing",
                     "category": "work", "priority": "Low", "createdAt": 1, "updatedAt": 2}
                ]
            }),
        );

        let (store, report) = BoardStore::load(KvStore::open(tmp.path()), now());
        assert!(report.migrated);
        assert_eq!(report.dropped, 0);
        assert_eq!(store.tasks()[0].stage, Stage::InProgress);

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store_path(tmp.path())).unwrap()).unwrap();
        assert_eq!(raw["ts_todo:items"][0]["stage"], "InProgress");
        assert_eq!(raw["ts_todo:items"][0]["subtasks"], json!([]));
        assert_eq!(raw["ts_todo:name"], "Ada");
    }

    #[test]
    fn current_records_leave_store_untouched() {
        let tmp = TempDir::new().unwrap();
        let mut store = BoardStore::open(tmp.path());
        add(&mut store, "fresh");
        let before = fs::read_to_string(store_path(tmp.path())).unwrap();
        // Reformat so any rewrite would be visible
        let compact: serde_json::Value = serde_json::from_str(&before).unwrap();
        fs::write(store_path(tmp.path()), compact.to_string()).unwrap();

        let (_, report) = BoardStore::load(KvStore::open(tmp.path()), now());
        assert_eq!(report, LoadReport::default());
        assert_eq!(
            fs::read_to_string(store_path(tmp.path())).unwrap(),
            compact.to_string()
        );
    }

    #[test]
    fn undecodable_records_are_logged_and_dropped() {
        let tmp = TempDir::new().unwrap();
        write_store(
            tmp.path(),
            json!({"ts_todo:items": [{"title": "ok"}, {"title": false}]}),
        );
        let (store, report) = BoardStore::load(KvStore::open(tmp.path()), now());
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(report.dropped, 1);

        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Parser);
        assert_eq!(entries[0].body, r#"{"title":false}"#);
    }

    #[test]
    fn delete_is_logged() {
        let tmp = TempDir::new().unwrap();
        let mut store = BoardStore::open(tmp.path());
        let id = add(&mut store, "Doomed");
        store.apply(BoardCommand::Delete { id: id.clone() }, now());
        assert!(store.tasks().is_empty());

        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries[0].category, RecoveryCategory::Delete);
        assert_eq!(entries[0].fields[0].1, id);
    }

    #[test]
    fn failed_write_keeps_state_and_logs_payload() {
        let tmp = TempDir::new().unwrap();
        let blocked = tmp.path().join("blocked");
        fs::write(&blocked, "").unwrap();
        let mut store = BoardStore::open(&blocked);

        add(&mut store, "Unsaved");
        assert_eq!(store.tasks().len(), 1);
        assert!(store.take_save_error().is_some());
        assert!(store.take_save_error().is_none());
    }

    #[test]
    fn profile_and_theme_defaults() {
        let tmp = TempDir::new().unwrap();
        let mut store = BoardStore::open(tmp.path());
        assert!(store.profile().needs_name());
        assert_eq!(store.theme(), ThemePreference::Light);

        store.set_name("Ada").unwrap();
        store.set_theme(ThemePreference::Dark).unwrap();
        let reopened = BoardStore::open(tmp.path());
        assert_eq!(reopened.profile().greeting(), "Hello, Ada!");
        assert_eq!(reopened.theme(), ThemePreference::Dark);
    }

    #[test]
    fn invalid_theme_reads_as_light() {
        let tmp = TempDir::new().unwrap();
        write_store(tmp.path(), json!({"ts_todo:theme": "sepia"}));
        assert_eq!(BoardStore::open(tmp.path()).theme(), ThemePreference::Light);
    }
}
