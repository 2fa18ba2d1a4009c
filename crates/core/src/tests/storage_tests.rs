use super::*;

#[test]
fn memory_store_reports_absence_then_value() {
    let mut store = MemoryStore::default();
    assert_eq!(store.get("k").unwrap(), None);
    store.set("k", "[null]").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("[null]"));
    store.remove("k").unwrap();
    assert_eq!(store.get("k").unwrap(), None);
}

#[test]
fn file_store_creates_directory_on_first_write() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("nested").join("store");
    let mut store = FileStore::new(&root);

    assert_eq!(store.get("overrides").unwrap(), None);
    store.set("overrides", "[]").unwrap();

    assert!(root.join("overrides.json").exists());
    assert_eq!(store.get("overrides").unwrap().as_deref(), Some("[]"));
}

#[test]
fn file_store_remove_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = FileStore::new(dir.path());
    store.remove("missing").unwrap();
    store.set("present", "1").unwrap();
    store.remove("present").unwrap();
    assert_eq!(store.get("present").unwrap(), None);
}

#[test]
fn file_store_rejects_path_like_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = FileStore::new(dir.path());
    for key in ["../escape", "a/b", "", ".hidden"] {
        let err = store.set(key, "x").unwrap_err();
        assert!(matches!(err, PnError::Storage { .. }), "key {key:?}");
    }
}
