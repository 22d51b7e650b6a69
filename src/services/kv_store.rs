//! Key-value stores backing the settings engine.
//!
//! The host's persistence medium is modelled as [`KeyValueStore`]: a
//! structured `load`/`save` path plus a raw text path used to repair records
//! that stopped being valid JSON.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::types::errors::StoreError;

/// Trait defining the persistence medium interface.
pub trait KeyValueStore {
    /// Structured read. `Ok(None)` when nothing is stored under `key`.
    fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;
    /// Structured write.
    fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError>;
    /// Raw text of the record, valid JSON or not.
    fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Overwrites the record with `text` verbatim.
    fn write_raw(&self, key: &str, text: &str) -> Result<(), StoreError>;
    /// The text `save` would store for `value` in an empty record.
    fn render_raw(&self, value: &serde_json::Value) -> String {
        value.to_string()
    }
}

fn parse_record(key: &str, text: &str) -> Result<serde_json::Value, StoreError> {
    serde_json::from_str(text).map_err(|_| StoreError::Corrupt(key.to_string()))
}

// === JsonFileStore ===

/// One `<key>.config.json` file per key, the document wrapped as `{"settings": …}`.
pub struct JsonFileStore {
    dir: PathBuf,
}

const ENVELOPE_FIELD: &str = "settings";

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.config.json", key))
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| StoreError::Io(format!("Failed to create store directory: {}", e)))
    }
}

impl KeyValueStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let Some(text) = self.read_raw(key)? else {
            return Ok(None);
        };
        let mut envelope = parse_record(key, &text)?;
        Ok(envelope
            .as_object_mut()
            .and_then(|map| map.remove(ENVELOPE_FIELD)))
    }

    fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        // Keep any sibling fields other writers put in the same file.
        let mut envelope = match self.read_raw(key)? {
            Some(text) => parse_record(key, &text)?,
            None => serde_json::json!({}),
        };
        match envelope.as_object_mut() {
            Some(map) => {
                map.insert(ENVELOPE_FIELD.to_string(), value.clone());
            }
            None => envelope = serde_json::json!({ ENVELOPE_FIELD: value }),
        }
        let text = serde_json::to_string_pretty(&envelope)
            .map_err(|e| StoreError::Io(format!("Failed to serialize record: {}", e)))?;
        self.write_raw(key, &text)
    }

    fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StoreError::Io(format!("Failed to read {}: {}", path.display(), e)))
    }

    fn render_raw(&self, value: &serde_json::Value) -> String {
        let envelope = serde_json::json!({ ENVELOPE_FIELD: value });
        serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| envelope.to_string())
    }

    fn write_raw(&self, key: &str, text: &str) -> Result<(), StoreError> {
        self.ensure_dir()?;
        let path = self.path_for(key);
        fs::write(&path, text)
            .map_err(|e| StoreError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }
}

// === SqliteStore ===

/// Records kept in the `kv_store` table of a SQLite database.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(Self::new(Database::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Opens the database in the platform data directory, creating it if needed.
    pub fn open_default() -> Result<Self, StoreError> {
        let path = crate::platform::get_database_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        Self::open(path)
    }
}

impl KeyValueStore for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        match self.read_raw(key)? {
            Some(text) => parse_record(key, &text).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        self.write_raw(key, &value.to_string())
    }

    fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .db
            .connection()
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_raw(&self, key: &str, text: &str) -> Result<(), StoreError> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        self.db.connection().execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, text, now],
        )?;
        Ok(())
    }
}

// === MemoryStore ===

/// In-memory store. Can be told to reject writes to exercise failure paths.
#[derive(Default)]
pub struct MemoryStore {
    records: RefCell<HashMap<String, String>>,
    reject_structured: Cell<bool>,
    reject_raw: Cell<bool>,
    structured_writes: Cell<u32>,
    raw_writes: Cell<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_structured_writes(&self, reject: bool) {
        self.reject_structured.set(reject);
    }

    pub fn reject_raw_writes(&self, reject: bool) {
        self.reject_raw.set(reject);
    }

    pub fn structured_writes(&self) -> u32 {
        self.structured_writes.get()
    }

    pub fn raw_writes(&self) -> u32 {
        self.raw_writes.get()
    }

    /// Stores `text` without counting it as a write, e.g. to plant a corrupt record.
    pub fn put_raw(&self, key: &str, text: &str) {
        self.records
            .borrow_mut()
            .insert(key.to_string(), text.to_string());
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        match self.read_raw(key)? {
            Some(text) => parse_record(key, &text).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        if self.reject_structured.get() {
            return Err(StoreError::WriteRejected(key.to_string()));
        }
        self.structured_writes.set(self.structured_writes.get() + 1);
        self.put_raw(key, &value.to_string());
        Ok(())
    }

    fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.records.borrow().get(key).cloned())
    }

    fn write_raw(&self, key: &str, text: &str) -> Result<(), StoreError> {
        if self.reject_raw.get() {
            return Err(StoreError::WriteRejected(key.to_string()));
        }
        self.raw_writes.set(self.raw_writes.get() + 1);
        self.put_raw(key, text);
        Ok(())
    }
}
