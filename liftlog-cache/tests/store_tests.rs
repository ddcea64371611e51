use chrono::Utc;
use liftlog_cache::{CacheStore, CachedResponse, RequestKey, GENERATION_PREFIX};
use pretty_assertions::assert_eq;

fn response(body: &str) -> CachedResponse {
    CachedResponse {
        status: 200,
        content_type: Some("application/json".into()),
        body: body.as_bytes().to_vec(),
        stored_at: Utc::now(),
    }
}

// ── Lookup & store ───────────────────────────────────────────────

#[test]
fn lookup_misses_on_empty_store() {
    let store = CacheStore::open_in_memory().unwrap();
    let key = RequestKey::get("https://example.com/app.js");
    assert!(store.lookup("liftlog-static-v1", &key).unwrap().is_none());
}

#[test]
fn store_then_lookup_roundtrip() {
    let store = CacheStore::open_in_memory().unwrap();
    let key = RequestKey::get("https://example.com/app.js");
    let entry = response("console.log('hi')");

    store.store("liftlog-static-v1", &key, &entry).unwrap();
    let found = store.lookup("liftlog-static-v1", &key).unwrap().unwrap();
    assert_eq!(found.status, 200);
    assert_eq!(found.body, entry.body);
    assert_eq!(found.content_type, entry.content_type);
}

#[test]
fn writing_a_key_overwrites_the_existing_entry() {
    let store = CacheStore::open_in_memory().unwrap();
    let key = RequestKey::get("https://example.com/data");

    store.store("liftlog-dynamic-v1", &key, &response("old")).unwrap();
    store.store("liftlog-dynamic-v1", &key, &response("new")).unwrap();

    assert_eq!(store.generation_len("liftlog-dynamic-v1").unwrap(), 1);
    let found = store.lookup("liftlog-dynamic-v1", &key).unwrap().unwrap();
    assert_eq!(found.text(), "new");
}

#[test]
fn generations_are_independent() {
    let store = CacheStore::open_in_memory().unwrap();
    let key = RequestKey::get("https://example.com/data");

    store.store("liftlog-static-v1", &key, &response("static copy")).unwrap();
    assert!(store.lookup("liftlog-dynamic-v1", &key).unwrap().is_none());
}

#[test]
fn keys_distinguish_method() {
    let store = CacheStore::open_in_memory().unwrap();
    let get = RequestKey::get("https://example.com/api");
    let post = RequestKey::new("POST", "https://example.com/api");

    store.store("liftlog-dynamic-v1", &get, &response("read")).unwrap();
    assert!(store.lookup("liftlog-dynamic-v1", &post).unwrap().is_none());
}

// ── Batch writes ─────────────────────────────────────────────────

#[test]
fn store_many_writes_all_entries_at_once() {
    let store = CacheStore::open_in_memory().unwrap();
    let entries: Vec<_> = (0..4)
        .map(|i| {
            (
                RequestKey::get(format!("https://example.com/asset{i}")),
                response(&format!("asset {i}")),
            )
        })
        .collect();

    let written = store.store_many("liftlog-static-v1", &entries).unwrap();
    assert_eq!(written, 4);
    assert_eq!(store.generation_len("liftlog-static-v1").unwrap(), 4);
}

// ── Eviction ─────────────────────────────────────────────────────

#[test]
fn evicts_only_stale_prefixed_generations() {
    let store = CacheStore::open_in_memory().unwrap();
    let key = RequestKey::get("https://example.com/app.js");

    store.store("liftlog-static-v1", &key, &response("old static")).unwrap();
    store.store("liftlog-dynamic-v1", &key, &response("old dynamic")).unwrap();
    store.store("liftlog-static-v2", &key, &response("new static")).unwrap();
    store.store("other-app-static-v1", &key, &response("not ours")).unwrap();

    let removed = store
        .evict_stale_generations(GENERATION_PREFIX, &["liftlog-static-v2", "liftlog-dynamic-v2"])
        .unwrap();
    assert_eq!(removed, 2);

    assert!(store.lookup("liftlog-static-v1", &key).unwrap().is_none());
    assert!(store.lookup("liftlog-dynamic-v1", &key).unwrap().is_none());
    assert!(store.lookup("liftlog-static-v2", &key).unwrap().is_some());
    assert!(store.lookup("other-app-static-v1", &key).unwrap().is_some());
}

// ── Durability ───────────────────────────────────────────────────

#[test]
fn entries_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");
    let key = RequestKey::get("https://example.com/app.js");
    let entry = response("persisted");

    {
        let store = CacheStore::open(&path).unwrap();
        store.store("liftlog-static-v1", &key, &entry).unwrap();
    }

    let reopened = CacheStore::open(&path).unwrap();
    let found = reopened.lookup("liftlog-static-v1", &key).unwrap().unwrap();
    assert_eq!(found.body, entry.body);
}
