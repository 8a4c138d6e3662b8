use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::io::paths::store_path;
use crate::io::recovery::log_dropped_record;

/// Display name of the board owner (string)
pub const NAME_KEY: &str = "ts_todo:name";
/// The task collection (array of tasks)
pub const ITEMS_KEY: &str = "ts_todo:items";
/// Theme preference ("light" / "dark")
pub const THEME_KEY: &str = "ts_todo:theme";

/// Error type for key-value store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: io::Error,
    },
    #[error("not overwriting {path}: it could not be read when the board was opened")]
    Unreadable { path: PathBuf },
    #[error("could not encode value for {key}: {source}")]
    EncodeError {
        key: String,
        source: serde_json::Error,
    },
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// A durable string-keyed JSON store backed by one file.
///
/// The whole document is held in memory; every `set` rewrites the file.
/// Key order is preserved across rewrites.
#[derive(Debug)]
pub struct KvStore {
    data_dir: PathBuf,
    entries: IndexMap<String, Value>,
    /// The file exists but could not be read; writes would destroy it
    unreadable: bool,
}

impl KvStore {
    /// Open the store in `data_dir`. A missing file is an empty store. A file
    /// that is not UTF-8 JSON is backed up as `store.json.bak`, recorded in the
    /// recovery log, and replaced by an empty store. A file that exists but
    /// cannot be read at all is left alone: the store opens empty and refuses
    /// to write.
    pub fn open(data_dir: &Path) -> Self {
        let path = store_path(data_dir);
        let mut unreadable = false;
        let entries = match fs::read(&path) {
            Ok(bytes) => match decode(&bytes) {
                Ok(map) => map,
                Err(reason) => {
                    set_aside(data_dir, &path, &bytes, &reason);
                    IndexMap::new()
                }
            },
            Err(_) if !path.exists() => IndexMap::new(),
            Err(e) => {
                eprintln!(
                    "warning: could not read {} (changes will not be saved): {}",
                    path.display(),
                    e
                );
                unreadable = true;
                IndexMap::new()
            }
        };
        KvStore {
            data_dir: data_dir.to_path_buf(),
            entries,
            unreadable,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self) -> PathBuf {
        store_path(&self.data_dir)
    }

    /// Typed read; any missing or undecodable value yields `default`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.entries
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(default)
    }

    /// The raw JSON stored under `key`
    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Encode `value` under `key` and persist the whole document.
    ///
    /// The in-memory value is updated even when the file write fails, so the
    /// caller can keep working and report the failure.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let encoded = serde_json::to_value(value).map_err(|e| StoreError::EncodeError {
            key: key.to_string(),
            source: e,
        })?;
        self.entries.insert(key.to_string(), encoded);
        self.flush()
    }

    /// Rewrite the store file from memory.
    pub fn flush(&self) -> Result<(), StoreError> {
        let path = self.path();
        if self.unreadable {
            return Err(StoreError::Unreadable { path });
        }
        let text = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            StoreError::EncodeError {
                key: "store.json".to_string(),
                source: e,
            }
        })?;
        atomic_write(&path, format!("{}\n", text).as_bytes())
            .map_err(|e| StoreError::WriteError { path, source: e })
    }
}

fn decode(bytes: &[u8]) -> Result<IndexMap<String, Value>, String> {
    let text = std::str::from_utf8(bytes).map_err(|e| e.to_string())?;
    serde_json::from_str(text).map_err(|e| e.to_string())
}

/// Keep a copy of an undecodable store file before it is treated as empty.
fn set_aside(data_dir: &Path, path: &Path, bytes: &[u8], reason: &str) {
    let bak = path.with_extension("json.bak");
    match fs::copy(path, &bak) {
        Ok(_) => eprintln!(
            "warning: could not parse {} (backed up as {}): {}",
            path.display(),
            bak.display(),
            reason
        ),
        Err(e) => eprintln!(
            "warning: could not parse {} ({}); backup to {} failed: {}",
            path.display(),
            reason,
            bak.display(),
            e
        ),
    }
    log_dropped_record(
        data_dir,
        "store.json",
        None,
        &String::from_utf8_lossy(bytes),
        reason,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::recovery::read_recovery_entries;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_and_defaults() {
        let tmp = TempDir::new().unwrap();
        let store = KvStore::open(tmp.path());
        assert_eq!(store.get(NAME_KEY, String::from("nobody")), "nobody");
        assert!(!store.contains(ITEMS_KEY));
        assert!(!store.path().exists());
    }

    #[test]
    fn set_persists_and_reopens() {
        let tmp = TempDir::new().unwrap();
        let mut store = KvStore::open(tmp.path());
        store.set(NAME_KEY, "Ada").unwrap();
        store.set(THEME_KEY, "dark").unwrap();

        let reopened = KvStore::open(tmp.path());
        assert_eq!(reopened.get(NAME_KEY, String::new()), "Ada");
        assert_eq!(reopened.get(THEME_KEY, String::new()), "dark");
    }

    #[test]
    fn key_order_is_preserved() {
        let tmp = TempDir::new().unwrap();
        let mut store = KvStore::open(tmp.path());
        store.set(THEME_KEY, "light").unwrap();
        store.set(NAME_KEY, "Ada").unwrap();
        store.set(THEME_KEY, "dark").unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        let theme_at = text.find(THEME_KEY).unwrap();
        let name_at = text.find(NAME_KEY).unwrap();
        assert!(theme_at < name_at);
    }

    #[test]
    fn wrong_type_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let mut store = KvStore::open(tmp.path());
        store.set(ITEMS_KEY, &42).unwrap();
        let items: Vec<String> = store.get(ITEMS_KEY, Vec::new());
        assert!(items.is_empty());
        assert_eq!(store.get_raw(ITEMS_KEY), Some(&Value::from(42)));
    }

    #[test]
    fn corrupt_file_is_backed_up_and_logged() {
        let tmp = TempDir::new().unwrap();
        fs::write(store_path(tmp.path()), "{ not json").unwrap();

        let store = KvStore::open(tmp.path());
        assert_eq!(store.get(NAME_KEY, String::new()), "");
        assert!(tmp.path().join("store.json.bak").exists());
        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].body, "{ not json");
    }

    #[test]
    fn non_utf8_file_is_backed_up_byte_for_byte() {
        let tmp = TempDir::new().unwrap();
        let raw = b"{\"ts_todo:name\": \"Ada\", \"ts_todo:items\": [{\"title\": \"Caf\xE9\"}]}";
        fs::write(store_path(tmp.path()), raw).unwrap();

        let mut store = KvStore::open(tmp.path());
        assert_eq!(store.get(NAME_KEY, String::new()), "");
        assert_eq!(fs::read(tmp.path().join("store.json.bak")).unwrap(), raw);
        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].body.contains("\"ts_todo:name\": \"Ada\""));

        // writing afterwards replaces store.json but the backup stays intact
        store.set(NAME_KEY, "Bob").unwrap();
        assert_eq!(fs::read(tmp.path().join("store.json.bak")).unwrap(), raw);
    }

    #[test]
    fn unreadable_file_is_never_overwritten() {
        let tmp = TempDir::new().unwrap();
        // a directory in place of the file exists but cannot be read as one
        fs::create_dir(store_path(tmp.path())).unwrap();

        let mut store = KvStore::open(tmp.path());
        let err = store.set(NAME_KEY, "Ada").unwrap_err();
        assert!(matches!(err, StoreError::Unreadable { .. }));
        assert_eq!(store.get(NAME_KEY, String::new()), "Ada");
        assert!(store_path(tmp.path()).is_dir());
    }

    #[test]
    fn atomic_write_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("x.txt");
        atomic_write(&path, b"hello").unwrap();
        atomic_write(&path, b"bye").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "bye");
    }

    #[test]
    fn write_failure_keeps_value_in_memory() {
        let tmp = TempDir::new().unwrap();
        // A regular file where the data directory should be makes every write fail.
        let blocker = tmp.path().join("blocked");
        fs::write(&blocker, "").unwrap();
        let mut store = KvStore::open(&blocker);

        let err = store.set(NAME_KEY, "Ada").unwrap_err();
        assert!(matches!(err, StoreError::WriteError { .. }));
        assert_eq!(store.get(NAME_KEY, String::new()), "Ada");
    }
}
