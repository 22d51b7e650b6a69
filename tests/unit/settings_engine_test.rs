//! Integration-level unit tests for the SettingsEngine public API.
//!
//! These tests exercise the engine through its trait interface: defaults,
//! the legacy key fallback, corrupt-record repair, the retry path, and the
//! v0 → v1 favourite migration.

use std::rc::Rc;

use channeltabs::services::kv_store::{JsonFileStore, KeyValueStore, MemoryStore};
use channeltabs::services::settings_engine::{
    SaveOutcome, SettingsEngine, SettingsEngineTrait, LEGACY_SETTINGS_KEY,
};
use channeltabs::types::errors::SettingsError;
use channeltabs::types::favourite::{Favourite, FavouriteGroup, UNGROUPED};
use channeltabs::types::settings::{BarSettings, CURRENT_SCHEMA_VERSION};
use channeltabs::types::tab::Tab;
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

const KEY: &str = "channeltabs_new_42";

fn memory_engine() -> (Rc<MemoryStore>, SettingsEngine) {
    let store = Rc::new(MemoryStore::new());
    let engine = SettingsEngine::new(store.clone(), Some("42"));
    (store, engine)
}

fn sample_settings() -> BarSettings {
    let mut settings = BarSettings::default();
    let mut tab = Tab::friends();
    tab.selected = true;
    settings.tabs.push(tab);
    settings.favs.push(Favourite {
        name: "#general".into(),
        icon_url: "https://cdn.example/icons/1.png".into(),
        url: "/channels/1/11".into(),
        channel_id: Some("11".into()),
        guild_id: None,
        group_id: 0,
        minimized: true,
    });
    settings.fav_groups.push(FavouriteGroup {
        name: "Work".into(),
        group_id: 0,
    });
    settings.preferences.compact_style = true;
    settings.preferences.tab_width_min = 140;
    settings
}

/// With nothing stored, `load()` returns defaults and writes them back.
#[test]
fn test_load_defaults_when_nothing_is_stored() {
    let (store, engine) = memory_engine();
    let settings = engine.load().unwrap();

    assert_eq!(settings, BarSettings::default());
    assert_eq!(engine.key(), KEY);
    assert_eq!(store.structured_writes(), 1);
    assert!(store.load(KEY).unwrap().is_some());
}

/// A saved snapshot survives a brand new engine over the same directory.
#[test]
fn test_save_persists_across_engines() {
    let dir = TempDir::new().unwrap();
    let settings = sample_settings();
    {
        let engine = SettingsEngine::new(Rc::new(JsonFileStore::new(dir.path())), Some("42"));
        engine.load().unwrap();
        assert_eq!(engine.save(&settings), SaveOutcome::Structured);
    }

    let engine = SettingsEngine::new(Rc::new(JsonFileStore::new(dir.path())), Some("42"));
    assert_eq!(engine.load().unwrap(), settings);
}

#[test]
fn test_accounts_do_not_share_settings() {
    let store = Rc::new(MemoryStore::new());
    let alice = SettingsEngine::new(store.clone(), Some("1"));
    let bob = SettingsEngine::new(store.clone(), Some("2"));

    alice.save(&sample_settings());
    assert_eq!(bob.load().unwrap(), BarSettings::default());
    assert_eq!(alice.load().unwrap(), sample_settings());
}

#[test]
fn test_legacy_key_is_read_when_primary_is_absent() {
    let (store, engine) = memory_engine();
    store.put_raw(
        LEGACY_SETTINGS_KEY,
        &json!({ "tabs": [{ "url": "/channels/@me", "name": "Friends", "selected": true }] }).to_string(),
    );

    let settings = engine.load().unwrap();
    assert_eq!(settings.tabs.len(), 1);
    // Written back under the primary key, already migrated.
    let stored = store.load(KEY).unwrap().unwrap();
    assert_eq!(stored["schemaVersion"], json!(CURRENT_SCHEMA_VERSION));
}

#[test]
fn test_corrupt_primary_falls_back_and_is_repaired_raw() {
    let (store, engine) = memory_engine();
    store.put_raw(KEY, "{\"tabs\": [");
    store.put_raw(LEGACY_SETTINGS_KEY, &json!({ "compactStyle": true }).to_string());

    let settings = engine.load().unwrap();
    assert!(settings.preferences.compact_style);
    // The write-back during load overwrote the broken record raw.
    assert_eq!(store.raw_writes(), 1);
    assert!(store.load(KEY).is_ok());

    assert_eq!(engine.save(&settings), SaveOutcome::Structured);
}

#[test]
fn test_undecodable_document_is_treated_as_absent() {
    let (store, engine) = memory_engine();
    store.put_raw(KEY, &json!({ "tabs": "not a list" }).to_string());
    assert_eq!(engine.load().unwrap(), BarSettings::default());
}

#[test]
fn test_newer_schema_version_is_an_error() {
    let (store, engine) = memory_engine();
    store.put_raw(KEY, &json!({ "schemaVersion": CURRENT_SCHEMA_VERSION + 1 }).to_string());
    assert!(matches!(engine.load(), Err(SettingsError::UnsupportedVersion(_))));
}

#[test]
fn test_unreadable_record_is_never_overwritten() {
    let (store, engine) = memory_engine();
    let newer = json!({
        "schemaVersion": CURRENT_SCHEMA_VERSION + 1,
        "favs": [{ "name": "keep", "url": "/channels/1/22" }]
    })
    .to_string();
    store.put_raw(KEY, &newer);

    assert!(engine.load().is_err());
    assert!(engine.is_read_only());
    let outcome = engine.save(&sample_settings());

    assert_eq!(outcome, SaveOutcome::Skipped);
    assert!(!outcome.is_saved());
    assert_eq!(store.read_raw(KEY).unwrap().as_deref(), Some(newer.as_str()));
    assert_eq!(store.structured_writes() + store.raw_writes(), 0);
}

#[test]
fn test_successful_load_lifts_read_only() {
    let (store, engine) = memory_engine();
    store.put_raw(KEY, &json!({ "schemaVersion": CURRENT_SCHEMA_VERSION + 1 }).to_string());
    assert!(engine.load().is_err());

    store.put_raw(KEY, &serde_json::to_string(&sample_settings()).unwrap());
    assert_eq!(engine.load().unwrap(), sample_settings());
    assert!(!engine.is_read_only());
    assert_eq!(engine.save(&sample_settings()), SaveOutcome::Structured);
}

#[test]
fn test_favourites_in_missing_groups_are_ungrouped() {
    let (store, engine) = memory_engine();
    store.put_raw(
        KEY,
        &json!({
            "schemaVersion": CURRENT_SCHEMA_VERSION,
            "favs": [
                { "name": "kept", "url": "/channels/1/22", "groupId": 3 },
                { "name": "dangling", "url": "/channels/1/23", "groupId": 7 },
                { "name": "loose", "url": "/channels/1/24", "groupId": -1 }
            ],
            "favGroups": [{ "name": "G", "groupId": 3 }]
        })
        .to_string(),
    );

    let settings = engine.load().unwrap();
    let groups: Vec<i32> = settings.favs.iter().map(|f| f.group_id).collect();
    assert_eq!(groups, vec![3, UNGROUPED, UNGROUPED]);

    let stored: BarSettings = serde_json::from_value(store.load(KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored.favs[1].group_id, UNGROUPED);
}

#[test]
fn test_structured_failure_retries_raw() {
    let (store, engine) = memory_engine();
    store.reject_structured_writes(true);

    assert_eq!(engine.save(&sample_settings()), SaveOutcome::Fallback);
    assert_eq!(store.raw_writes(), 1);
    assert_eq!(engine.load().unwrap(), sample_settings());
}

#[test]
fn test_corrupt_record_with_failing_raw_write_retries_structured() {
    let (store, engine) = memory_engine();
    store.put_raw(KEY, "garbage");
    store.reject_raw_writes(true);

    assert_eq!(engine.save(&sample_settings()), SaveOutcome::Fallback);
    assert_eq!(store.structured_writes(), 1);
}

#[test]
fn test_both_paths_failing_reports_failed() {
    let (store, engine) = memory_engine();
    store.reject_structured_writes(true);
    store.reject_raw_writes(true);

    let outcome = engine.save(&sample_settings());
    assert_eq!(outcome, SaveOutcome::Failed);
    assert!(!outcome.is_saved());
}

/// Repairing a corrupt JSON file keeps the `{"settings": …}` envelope, so the
/// next load reads the repaired document.
#[test]
fn test_corrupt_json_file_is_repaired_with_envelope() {
    let dir = TempDir::new().unwrap();
    let store = Rc::new(JsonFileStore::new(dir.path()));
    store.write_raw(KEY, "not json at all").unwrap();
    let engine = SettingsEngine::new(store.clone(), Some("42"));

    assert_eq!(engine.save(&sample_settings()), SaveOutcome::Raw);
    let raw: serde_json::Value = serde_json::from_str(&store.read_raw(KEY).unwrap().unwrap()).unwrap();
    assert!(raw.get("settings").is_some());
    assert_eq!(engine.load().unwrap(), sample_settings());
}

#[rstest]
#[case::guild_channel("/channels/1/22", Some("22"))]
#[case::dm("/channels/@me/33", Some("33"))]
#[case::guild_only("/channels/1", None)]
#[case::trailing_segment("/channels/1/22/44", None)]
#[case::not_a_channel("/guild-discovery", None)]
fn test_migration_recovers_channel_ids(#[case] url: &str, #[case] expected: Option<&str>) {
    let (store, engine) = memory_engine();
    store.put_raw(KEY, &json!({ "favs": [{ "name": "fav", "url": url }] }).to_string());

    let settings = engine.load().unwrap();
    assert_eq!(settings.favs[0].channel_id.as_deref(), expected);
    assert_eq!(settings.favs[0].group_id, UNGROUPED);
}

#[test]
fn test_migration_keeps_existing_fields() {
    let (store, engine) = memory_engine();
    store.put_raw(
        KEY,
        &json!({
            "favs": [{ "name": "fav", "url": "/channels/1/22", "channelId": "99", "groupId": 3 }],
            "favGroups": [{ "name": "G", "groupId": 3 }]
        })
        .to_string(),
    );

    let settings = engine.load().unwrap();
    assert_eq!(settings.favs[0].channel_id.as_deref(), Some("99"));
    assert_eq!(settings.favs[0].group_id, 3);
}
