//! Cart persistence across sessions and against hostile storage contents.

use minishop_core::application::CatalogSession;
use minishop_core::infrastructure::config::AppConfig;
use minishop_core::infrastructure::storage::{FileStore, KeyValueStore};
use std::path::Path;

fn session_over(dir: &Path) -> CatalogSession {
    CatalogSession::with_store(AppConfig::default(), Box::new(FileStore::new(dir)))
}

#[test]
fn cart_survives_session_restart() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = session_over(dir.path());
    first.adjust_quantity("p1", 3);
    first.adjust_quantity("p2", 1);
    drop(first);

    let second = session_over(dir.path());
    assert_eq!(second.cart().quantity("p1"), Some(3));
    assert_eq!(second.cart().quantity("p2"), Some(1));
}

#[test]
fn cleared_cart_stays_cleared_after_restart() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = session_over(dir.path());
    first.adjust_quantity("p1", 2);
    first.clear_cart();
    drop(first);

    let second = session_over(dir.path());
    assert!(second.cart().is_empty());
}

#[test]
fn corrupt_storage_degrades_to_an_empty_cart() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    store.set("mini_shop_cart_v1", "{{{{ not json").unwrap();

    let session = session_over(dir.path());
    assert!(session.cart().is_empty());
}

#[test]
fn tampered_entries_are_revalidated_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    store
        .set(
            "mini_shop_cart_v1",
            r#"{"ok":{"qty":2},"neg":{"qty":-5},"text":{"qty":"abc"},"huge":{"qty":900000}}"#,
        )
        .unwrap();

    let session = session_over(dir.path());
    assert_eq!(session.cart().quantity("ok"), Some(2));
    assert_eq!(session.cart().quantity("neg"), None);
    assert_eq!(session.cart().quantity("text"), None);
    assert_eq!(session.cart().quantity("huge"), Some(9_999));
}

#[test]
fn persisted_payload_shape_is_id_to_qty_object() {
    let dir = tempfile::tempdir().unwrap();

    let mut session = session_over(dir.path());
    session.adjust_quantity("p1", 2);
    drop(session);

    let store = FileStore::new(dir.path());
    let raw = store.get("mini_shop_cart_v1").unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["p1"]["qty"], 2);
}
