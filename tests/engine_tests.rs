//! Integration tests for the OneVault engine.

use std::fs;
use std::sync::Arc;
use std::thread;

use onevault::config::{Settings, VaultLayout};
use onevault::{EngineState, VaultEngine, VaultError};
use tempfile::TempDir;

/// Helper: a default vault layout inside a fresh temp dir.
fn layout() -> (TempDir, VaultLayout) {
    let dir = TempDir::new().expect("create temp dir");
    let layout = Settings::default().layout(dir.path());
    (dir, layout)
}

// ---------------------------------------------------------------------------
// The todo scenario end to end
// ---------------------------------------------------------------------------

#[test]
fn todo_scenario() {
    let (_dir, layout) = layout();
    let engine = VaultEngine::new(layout);

    engine.add_text("todo", "buy milk").unwrap();

    let all = engine.list_texts().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "todo");

    assert_eq!(engine.get_text("todo").unwrap(), "buy milk");

    let hits = engine.search_text("TO").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "todo");
    assert_eq!(hits[0].text, "buy milk");

    engine.delete_text("todo").unwrap();
    assert!(engine.list_texts().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Title uniqueness
// ---------------------------------------------------------------------------

#[test]
fn duplicate_add_keeps_original_content() {
    let (_dir, layout) = layout();
    let engine = VaultEngine::new(layout);

    engine.add_text("A", "x").unwrap();
    let result = engine.add_text("A", "y");
    assert!(matches!(result, Err(VaultError::DuplicateTitle(ref t)) if t == "A"));

    assert_eq!(engine.get_text("A").unwrap(), "x");
}

// ---------------------------------------------------------------------------
// Update preserves identity
// ---------------------------------------------------------------------------

#[test]
fn update_preserves_created_at() {
    let (_dir, layout) = layout();
    let engine = VaultEngine::new(layout);

    let before = engine.add_text("A", "x").unwrap();
    let after = engine.update_text("A", "y").unwrap();

    assert_eq!(engine.get_text("A").unwrap(), "y");
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);

    let stored = engine.get_entry("A").unwrap();
    assert_eq!(stored, after);
}

#[test]
fn update_missing_title_fails() {
    let (_dir, layout) = layout();
    let engine = VaultEngine::new(layout);

    let result = engine.update_text("nope", "y");
    assert!(matches!(result, Err(VaultError::NotFound(_))));
}

// ---------------------------------------------------------------------------
// Delete then get
// ---------------------------------------------------------------------------

#[test]
fn delete_then_get_is_not_found() {
    let (_dir, layout) = layout();
    let engine = VaultEngine::new(layout);

    engine.add_text("A", "x").unwrap();
    engine.add_text("B", "y").unwrap();
    engine.delete_text("A").unwrap();

    assert!(matches!(engine.get_text("A"), Err(VaultError::NotFound(_))));
    assert!(engine.search_text("A").unwrap().is_empty());
    assert!(matches!(engine.delete_text("A"), Err(VaultError::NotFound(_))));
    assert_eq!(engine.get_text("B").unwrap(), "y");
}

// ---------------------------------------------------------------------------
// Persistence survives restart
// ---------------------------------------------------------------------------

#[test]
fn records_survive_restart() {
    let (_dir, layout) = layout();

    {
        let engine = VaultEngine::new(layout.clone());
        engine.add_text("first", "one\nwith a second line").unwrap();
        engine.add_text("second", "ünïcödé ✓").unwrap();
    }

    // A new engine on the same files stands in for a new process.
    let engine = VaultEngine::new(layout);
    assert_eq!(engine.state(), EngineState::Uninitialized);

    let all = engine.list_texts().unwrap();
    let pairs: Vec<_> = all
        .iter()
        .map(|e| (e.title.as_str(), e.text.as_str()))
        .collect();
    assert_eq!(
        pairs,
        [("first", "one\nwith a second line"), ("second", "ünïcödé ✓")]
    );
}

#[test]
fn store_file_never_holds_plaintext() {
    let (_dir, layout) = layout();
    let engine = VaultEngine::new(layout.clone());

    engine.add_text("diary", "a very recognisable sentence").unwrap();

    let raw = fs::read_to_string(&layout.store_file).unwrap();
    assert!(raw.contains("\"diary\""));
    assert!(!raw.contains("recognisable"));
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[test]
fn search_keeps_insertion_order() {
    let (_dir, layout) = layout();
    let engine = VaultEngine::new(layout);

    engine.add_text("Work notes", "1").unwrap();
    engine.add_text("groceries", "2").unwrap();
    engine.add_text("old NOTES", "3").unwrap();

    let titles: Vec<_> = engine
        .search_text("notes")
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, ["Work notes", "old NOTES"]);
}

#[test]
fn search_content_matches_decoded_text() {
    let (_dir, layout) = layout();
    let engine = VaultEngine::new(layout);

    engine.add_text("todo", "Buy MILK").unwrap();
    engine.add_text("ideas", "write a parser").unwrap();

    let hits = engine.search_content("milk").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "todo");

    // Title search does not look inside the text.
    assert!(engine.search_text("milk").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Failure modes
// ---------------------------------------------------------------------------

#[test]
fn corrupt_store_is_reported() {
    let (_dir, layout) = layout();
    fs::create_dir_all(layout.store_file.parent().unwrap()).unwrap();
    fs::write(&layout.store_file, "{\"version\": 1, \"records\": [").unwrap();

    let engine = VaultEngine::new(layout.clone());
    assert!(matches!(
        engine.list_texts(),
        Err(VaultError::StoreCorrupt(_))
    ));

    // The broken file is left untouched.
    assert_eq!(
        fs::read_to_string(&layout.store_file).unwrap(),
        "{\"version\": 1, \"records\": ["
    );
}

#[test]
fn corrupt_key_is_reported() {
    let (_dir, layout) = layout();
    fs::create_dir_all(layout.key_file.parent().unwrap()).unwrap();
    fs::write(&layout.key_file, [0u8; 31]).unwrap();

    let engine = VaultEngine::new(layout);
    assert!(matches!(
        engine.add_text("a", "b"),
        Err(VaultError::KeyCorrupt { found: 31, .. })
    ));
}

#[test]
fn tampered_content_is_a_decode_error() {
    let (_dir, layout) = layout();
    {
        let engine = VaultEngine::new(layout.clone());
        engine.add_text("note", "hello").unwrap();
    }

    let raw = fs::read_to_string(&layout.store_file).unwrap();
    let mut doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    doc["records"][0]["content"] = serde_json::Value::String("%%%".into());
    fs::write(&layout.store_file, doc.to_string()).unwrap();

    let engine = VaultEngine::new(layout);
    assert!(matches!(
        engine.get_text("note"),
        Err(VaultError::DecodeError(_))
    ));
    assert!(matches!(
        engine.list_texts(),
        Err(VaultError::DecodeError(_))
    ));
}

#[test]
fn damaged_record_can_be_repaired_or_removed() {
    let (_dir, layout) = layout();
    {
        let engine = VaultEngine::new(layout.clone());
        engine.add_text("bad", "hello").unwrap();
        engine.add_text("worse", "world").unwrap();
    }

    let raw = fs::read_to_string(&layout.store_file).unwrap();
    let mut doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    doc["records"][0]["content"] = serde_json::Value::String("%%%".into());
    doc["records"][1]["content"] = serde_json::Value::String("%%%".into());
    fs::write(&layout.store_file, doc.to_string()).unwrap();

    let engine = VaultEngine::new(layout);
    assert!(engine.contains("bad").unwrap());
    assert!(!engine.contains("missing").unwrap());

    engine.update_text("bad", "fixed").unwrap();
    assert_eq!(engine.get_text("bad").unwrap(), "fixed");

    engine.delete_text("worse").unwrap();
    assert!(!engine.contains("worse").unwrap());
    assert_eq!(engine.len().unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Backups
// ---------------------------------------------------------------------------

#[test]
fn mutations_leave_backups() {
    let (_dir, layout) = layout();
    let engine = VaultEngine::new(layout.clone());

    engine.add_text("a", "1").unwrap();
    engine.add_text("b", "2").unwrap();

    let backups = onevault::vault::format::list_backups(&layout.store_file, &layout.backup_dir)
        .unwrap();
    assert!(!backups.is_empty());
    assert!(backups.len() <= layout.max_backups);
}

// ---------------------------------------------------------------------------
// Shared engine across threads
// ---------------------------------------------------------------------------

#[test]
fn concurrent_writers_all_land() {
    let (_dir, layout) = layout();
    let engine = Arc::new(VaultEngine::new(VaultLayout {
        max_backups: 0,
        ..layout.clone()
    }));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..5 {
                    engine
                        .add_text(&format!("t{t}-{i}"), &format!("value {t} {i}"))
                        .unwrap();
                    engine.list_texts().unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(engine.len().unwrap(), 40);

    let reopened = VaultEngine::new(layout);
    assert_eq!(reopened.len().unwrap(), 40);
    assert_eq!(reopened.get_text("t3-4").unwrap(), "value 3 4");
}
