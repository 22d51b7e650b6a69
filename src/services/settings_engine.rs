// ChannelTabs Settings Engine
// Loads, migrates and saves the persisted bar document (tabs, favourites,
// groups and display preferences) through a pluggable key-value store.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::services::kv_store::KeyValueStore;
use crate::services::location_resolver::channel_id_from_url;
use crate::types::errors::{SettingsError, StoreError};
use crate::types::favourite::UNGROUPED;
use crate::types::settings::{BarSettings, CURRENT_SCHEMA_VERSION};

pub const SETTINGS_KEY_PREFIX: &str = "channeltabs_new";
pub const LEGACY_SETTINGS_KEY: &str = "channeltabs";

/// Per-account settings key: `channeltabs_new_<accountId>`, or the bare
/// prefix when no account is known yet.
pub fn settings_key(account_id: Option<&str>) -> String {
    match account_id {
        Some(id) => format!("{}_{}", SETTINGS_KEY_PREFIX, id),
        None => SETTINGS_KEY_PREFIX.to_string(),
    }
}

/// Which write path a save ended up using.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Structured save succeeded.
    Structured,
    /// The record was corrupt and was overwritten raw.
    Raw,
    /// The first path failed; the other one succeeded.
    Fallback,
    /// Both paths failed. The in-memory state is still authoritative.
    Failed,
    /// Not written: the stored record could not be read and is left untouched.
    Skipped,
}

impl SaveOutcome {
    pub fn is_saved(self) -> bool {
        matches!(self, SaveOutcome::Structured | SaveOutcome::Raw | SaveOutcome::Fallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WritePath {
    Structured,
    Raw,
}

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&self) -> Result<BarSettings, SettingsError>;
    fn save(&self, snapshot: &BarSettings) -> SaveOutcome;
    fn key(&self) -> &str;
}

/// Settings engine persisting [`BarSettings`] under a per-account key.
pub struct SettingsEngine {
    store: Rc<dyn KeyValueStore>,
    key: String,
    legacy_key: String,
    read_only: Cell<bool>,
}

impl SettingsEngine {
    pub fn new(store: Rc<dyn KeyValueStore>, account_id: Option<&str>) -> Self {
        Self::with_keys(store, settings_key(account_id), LEGACY_SETTINGS_KEY.to_string())
    }

    pub fn with_keys(store: Rc<dyn KeyValueStore>, key: String, legacy_key: String) -> Self {
        Self {
            store,
            key,
            legacy_key,
            read_only: Cell::new(false),
        }
    }

    /// Set while the stored record could not be loaded. Saves are skipped so
    /// a document this build does not understand is never replaced.
    pub fn is_read_only(&self) -> bool {
        self.read_only.get()
    }

    pub fn store(&self) -> &Rc<dyn KeyValueStore> {
        &self.store
    }

    /// The first decodable document under the primary key, then the legacy key.
    fn load_stored(&self) -> Result<Option<BarSettings>, SettingsError> {
        for key in [self.key.as_str(), self.legacy_key.as_str()] {
            if let Some(doc) = self.read_document(key)? {
                if let Some(settings) = self.decode(key, doc)? {
                    info!(key, "loaded settings");
                    return Ok(Some(settings));
                }
            }
        }
        Ok(None)
    }

    /// Reads a stored document. Corrupt and empty records count as absent.
    fn read_document(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        match self.store.load(key) {
            Ok(Some(doc)) if doc.as_object().is_some_and(|m| m.is_empty()) => Ok(None),
            Ok(doc) => Ok(doc),
            Err(StoreError::Corrupt(k)) => {
                warn!(key = %k, "persisted settings are corrupt, ignoring");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Migrates and deserializes a document; `None` if it does not decode.
    fn decode(&self, key: &str, doc: Value) -> Result<Option<BarSettings>, SettingsError> {
        let Some(doc) = migrate(doc)? else {
            warn!(key, "persisted settings are not an object, ignoring");
            return Ok(None);
        };
        match serde_json::from_value::<BarSettings>(doc) {
            Ok(settings) => Ok(Some(settings)),
            Err(e) => {
                warn!(key, error = %e, "persisted settings do not decode, ignoring");
                Ok(None)
            }
        }
    }

    fn write(&self, path: WritePath, value: &Value) -> Result<(), StoreError> {
        match path {
            WritePath::Structured => self.store.save(&self.key, value),
            WritePath::Raw => self.store.write_raw(&self.key, &self.store.render_raw(value)),
        }
    }

    fn record_is_corrupt(&self) -> bool {
        match self.store.read_raw(&self.key) {
            Ok(Some(text)) => serde_json::from_str::<Value>(&text).is_err(),
            Ok(None) => false,
            Err(e) => {
                warn!(key = %self.key, error = %e, "could not inspect stored settings");
                false
            }
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the primary key, then the legacy key, then defaults.
    ///
    /// The normalized document is written back under the primary key.
    ///
    /// A newer schema or a store failure leaves the engine read-only until a
    /// later load succeeds.
    fn load(&self) -> Result<BarSettings, SettingsError> {
        let loaded = match self.load_stored() {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(key = %self.key, error = %e, "stored settings unreadable, saves disabled for this session");
                self.read_only.set(true);
                return Err(e);
            }
        };
        self.read_only.set(false);
        let mut settings = loaded.unwrap_or_else(|| {
            info!(key = %self.key, "no stored settings, using defaults");
            BarSettings::default()
        });
        drop_dangling_group_ids(&mut settings);
        self.save(&settings);
        Ok(settings)
    }

    /// Saves a snapshot. Never fails; the outcome says which path was used, if any.
    fn save(&self, snapshot: &BarSettings) -> SaveOutcome {
        if self.read_only.get() {
            debug!(key = %self.key, "settings are read-only, not saving");
            return SaveOutcome::Skipped;
        }
        let value = match serde_json::to_value(snapshot) {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "failed to serialize settings");
                return SaveOutcome::Failed;
            }
        };

        let (first, second) = if self.record_is_corrupt() {
            warn!(key = %self.key, "stored settings are not valid JSON, overwriting");
            (WritePath::Raw, WritePath::Structured)
        } else {
            (WritePath::Structured, WritePath::Raw)
        };

        match self.write(first, &value) {
            Ok(()) if first == WritePath::Raw => return SaveOutcome::Raw,
            Ok(()) => return SaveOutcome::Structured,
            Err(e) => warn!(key = %self.key, error = %e, "settings save failed, retrying"),
        }
        match self.write(second, &value) {
            Ok(()) => SaveOutcome::Fallback,
            Err(e) => {
                error!(key = %self.key, error = %e, "fallback settings save failed");
                SaveOutcome::Failed
            }
        }
    }

    fn key(&self) -> &str {
        &self.key
    }
}

/// Favourites pointing at a group that no longer exists go back to the bar.
fn drop_dangling_group_ids(settings: &mut BarSettings) {
    let groups = &settings.fav_groups;
    let mut dropped = 0;
    for fav in settings.favs.iter_mut() {
        if fav.is_grouped() && !groups.iter().any(|g| g.group_id == fav.group_id) {
            fav.group_id = UNGROUPED;
            dropped += 1;
        }
    }
    if dropped > 0 {
        warn!(dropped, "favourites referenced missing groups, ungrouped them");
    }
}

/// Brings a document up to [`CURRENT_SCHEMA_VERSION`].
///
/// Returns `Ok(None)` for documents that are not JSON objects.
pub fn migrate(mut doc: Value) -> Result<Option<Value>, SettingsError> {
    let Some(map) = doc.as_object_mut() else {
        return Ok(None);
    };
    let current = map
        .get("schemaVersion")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    if current > u64::from(CURRENT_SCHEMA_VERSION) {
        return Err(SettingsError::UnsupportedVersion(current));
    }

    if current < 1 {
        migration_v1(map);
        info!(from = current, to = 1, "migrated settings");
    }

    map.insert(
        "schemaVersion".to_string(),
        Value::from(CURRENT_SCHEMA_VERSION),
    );
    Ok(Some(doc))
}

/// V1: favourites get a `channelId` recovered from their url and a `groupId`.
fn migration_v1(doc: &mut serde_json::Map<String, Value>) {
    let Some(favs) = doc.get_mut("favs").and_then(Value::as_array_mut) else {
        return;
    };
    for fav in favs.iter_mut().filter_map(Value::as_object_mut) {
        if fav.get("channelId").map_or(true, Value::is_null) {
            let recovered = fav
                .get("url")
                .and_then(Value::as_str)
                .and_then(channel_id_from_url)
                .map(str::to_string);
            if let Some(id) = recovered {
                fav.insert("channelId".to_string(), Value::String(id));
            }
        }
        if fav.get("groupId").map_or(true, Value::is_null) {
            fav.insert("groupId".to_string(), Value::from(UNGROUPED));
        }
    }
}
