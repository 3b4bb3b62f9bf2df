//! Tests for the JSON record store.

use federal_storage::{JsonStore, StorageErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Entry {
    name: String,
    id: String,
}

fn entry(name: &str, id: &str) -> Entry {
    Entry {
        name: name.to_string(),
        id: id.to_string(),
    }
}

#[test]
fn test_missing_file_is_initialised_empty() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("banco").join("blacklist.json");
    let store: JsonStore<Vec<Entry>> = JsonStore::new(&path);

    assert!(store.load().is_empty());
    assert!(path.exists(), "load should create the backing file");
}

#[test]
fn test_update_persists_across_instances() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("blacklist.json");

    let store: JsonStore<Vec<Entry>> = JsonStore::new(&path);
    store.update(|list| list.push(entry("X", "123"))).unwrap();

    let reopened: JsonStore<Vec<Entry>> = JsonStore::new(&path);
    assert_eq!(reopened.load(), vec![entry("X", "123")]);
}

#[test]
fn test_file_is_versioned_envelope() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tickets.json");
    let store: JsonStore<BTreeMap<String, u32>> = JsonStore::new(&path);
    store.update(|map| map.insert("42".to_string(), 7)).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["version"], 1);
    assert_eq!(raw["records"]["42"], 7);
}

#[test]
fn test_legacy_bare_container_is_read() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("blacklist.json");
    std::fs::write(&path, r#"[{"name":"Old","id":"999"}]"#).unwrap();

    let store: JsonStore<Vec<Entry>> = JsonStore::new(&path);
    assert_eq!(store.load(), vec![entry("Old", "999")]);
}

#[test]
fn test_corrupt_file_falls_back_and_is_moved_aside() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("punicoes.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store: JsonStore<Vec<Entry>> = JsonStore::new(&path);
    assert!(store.load().is_empty());
    assert!(temp_dir.path().join("punicoes.json.corrupt").exists());
    assert!(path.exists());
}

#[test]
fn test_modify_without_change_does_not_write() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tickets.json");
    let store: JsonStore<BTreeMap<String, u32>> = JsonStore::new(&path);
    store.update(|map| map.insert("1".to_string(), 1)).unwrap();
    let before = std::fs::metadata(&path).unwrap().modified().unwrap();

    let touched = store.modify(|map| map.get_mut("missing").map(|v| *v += 1)).unwrap();
    assert!(touched.is_none());
    assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), before);
}

#[derive(Debug)]
struct Rejected(Option<StorageErrorKind>);

impl From<federal_storage::StorageError> for Rejected {
    fn from(err: federal_storage::StorageError) -> Self {
        Rejected(Some(err.kind))
    }
}

#[test]
fn test_try_update_discards_on_error() {
    let temp_dir = TempDir::new().unwrap();
    let store: JsonStore<Vec<Entry>> = JsonStore::new(temp_dir.path().join("b.json"));
    store.update(|list| list.push(entry("X", "123"))).unwrap();

    let result: Result<(), Rejected> = store.try_update(|list| {
        list.clear();
        Err(Rejected(None))
    });

    assert!(result.is_err());
    assert_eq!(store.load().len(), 1);
}

#[test]
fn test_unreadable_file_blocks_writes() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("punicoes.json");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("keep"), "records").unwrap();
    let store: JsonStore<Vec<Entry>> = JsonStore::new(&path);

    let mut mutated = false;
    let err = store
        .update(|list| {
            mutated = true;
            list.push(entry("X", "1"));
        })
        .unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::FileRead(_)), "{err}");
    assert!(!mutated);

    let err = store.modify(|list| list.pop()).unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::FileRead(_)));
    let result: Result<(), Rejected> = store.try_update(|_| Ok(()));
    assert!(matches!(result, Err(Rejected(Some(StorageErrorKind::FileRead(_))))));

    assert!(store.load().is_empty());
    assert!(path.is_dir());
    assert_eq!(std::fs::read_to_string(path.join("keep")).unwrap(), "records");
    assert!(!temp_dir.path().join("punicoes.json.corrupt").exists());
}

#[test]
fn test_non_utf8_file_is_moved_aside_intact() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("blacklist.json");
    std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
    let store: JsonStore<Vec<Entry>> = JsonStore::new(&path);

    store.update(|list| list.push(entry("Y", "2"))).unwrap();

    assert_eq!(
        std::fs::read(temp_dir.path().join("blacklist.json.corrupt")).unwrap(),
        vec![0xff, 0xfe, 0x00]
    );
    assert_eq!(store.load(), vec![entry("Y", "2")]);
}
