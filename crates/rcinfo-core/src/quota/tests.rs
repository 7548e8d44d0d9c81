use super::*;
use std::sync::Arc;

fn memory_store() -> QuotaStore<MemoryBackend> {
    QuotaStore::new(MemoryBackend::new(), QuotaPolicy::default())
}

#[test]
fn unseen_user_gets_default_without_persisting() {
    let store = memory_store();
    let q = store.get_quota("42").unwrap();
    assert_eq!(
        q,
        QuotaRecord {
            searches_used: 0,
            is_premium: false,
            remaining_searches: 5
        }
    );
    assert!(store.backend().is_empty(), "read path must not write");
}

#[test]
fn record_usage_moves_both_counters_by_one() {
    let store = memory_store();
    let q = store.record_usage("42").unwrap();
    assert_eq!(q.searches_used, 1);
    assert_eq!(q.remaining_searches, 4);
    assert!(!q.is_premium);

    let q = store.record_usage("42").unwrap();
    assert_eq!(q.searches_used, 2);
    assert_eq!(q.remaining_searches, 3);
    assert_eq!(store.get_quota("42").unwrap(), q);
}

#[test]
fn record_usage_keeps_premium_flag() {
    let store = memory_store();
    store.grant_premium("7", 50).unwrap();
    let q = store.record_usage("7").unwrap();
    assert_eq!(
        q,
        QuotaRecord {
            searches_used: 1,
            is_premium: true,
            remaining_searches: 49
        }
    );
}

#[test]
fn record_usage_is_not_floored() {
    let store = QuotaStore::new(
        MemoryBackend::new(),
        QuotaPolicy {
            free_searches: 1,
            premium_searches: 50,
        },
    );
    store.record_usage("u").unwrap();
    let q = store.record_usage("u").unwrap();
    assert_eq!(q.remaining_searches, -1);
    assert!(!q.has_remaining());
}

#[test]
fn grant_premium_overwrites_prior_state() {
    let store = memory_store();
    for _ in 0..3 {
        store.record_usage("9").unwrap();
    }
    store.grant_premium("9", 50).unwrap();
    assert_eq!(
        store.get_quota("9").unwrap(),
        QuotaRecord {
            searches_used: 0,
            is_premium: true,
            remaining_searches: 50
        }
    );
}

#[test]
fn grant_default_premium_uses_policy() {
    let store = QuotaStore::new(
        MemoryBackend::new(),
        QuotaPolicy {
            free_searches: 5,
            premium_searches: 20,
        },
    );
    let q = store.grant_default_premium("1").unwrap();
    assert_eq!(q.remaining_searches, 20);
}

#[test]
fn revoke_unknown_user_is_noop() {
    let store = memory_store();
    store.revoke_premium("ghost").unwrap();
    assert!(store.backend().is_empty());
    assert_eq!(store.get_quota("ghost").unwrap(), QuotaRecord::default());
}

#[test]
fn revoke_keeps_usage_count() {
    let store = memory_store();
    store.grant_premium("5", 50).unwrap();
    store.record_usage("5").unwrap();
    store.record_usage("5").unwrap();
    store.revoke_premium("5").unwrap();
    assert_eq!(
        store.get_quota("5").unwrap(),
        QuotaRecord {
            searches_used: 2,
            is_premium: false,
            remaining_searches: 0
        }
    );
}

#[test]
fn ensure_remaining_gates_on_positive_count() {
    let store = memory_store();
    assert_eq!(store.ensure_remaining("9").unwrap().remaining_searches, 5);

    store.grant_premium("9", 1).unwrap();
    store.record_usage("9").unwrap();
    match store.ensure_remaining("9") {
        Err(LookupError::QuotaExhausted { remaining }) => assert_eq!(remaining, 0),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn concurrent_usage_for_one_user_loses_nothing() {
    let store = Arc::new(QuotaStore::new(
        MemoryBackend::new(),
        QuotaPolicy {
            free_searches: 1000,
            premium_searches: 50,
        },
    ));
    std::thread::scope(|s| {
        for _ in 0..8 {
            let store = Arc::clone(&store);
            s.spawn(move || {
                for _ in 0..25 {
                    store.record_usage("same").unwrap();
                }
            });
        }
    });
    let q = store.get_quota("same").unwrap();
    assert_eq!(q.searches_used, 200);
    assert_eq!(q.remaining_searches, 800);
}

#[test]
fn file_backend_round_trips_users_json_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(
        &path,
        r#"{
  "users": {
    "111": { "searches": 3, "isPremium": false, "remainingSearches": 2 },
    "222": { "searches": 0, "isPremium": true, "remainingSearches": 50 }
  }
}"#,
    )
    .unwrap();

    let store = QuotaStore::new(JsonFileBackend::new(&path), QuotaPolicy::default());
    assert_eq!(store.get_quota("111").unwrap().remaining_searches, 2);
    assert!(store.get_quota("222").unwrap().is_premium);

    store.record_usage("111").unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["users"]["111"]["searches"], 4);
    assert_eq!(raw["users"]["111"]["remainingSearches"], 1);
    assert_eq!(raw["users"]["222"]["isPremium"], true);
}

#[test]
fn file_backend_missing_file_reads_default_and_is_created_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("users.json");
    let store = QuotaStore::new(JsonFileBackend::new(&path), QuotaPolicy::default());

    assert_eq!(store.get_quota("1").unwrap(), QuotaRecord::default());
    assert!(!path.exists());

    store.grant_premium("1", 50).unwrap();
    assert!(path.exists());
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains('\n'), "document is pretty-printed");
}

#[test]
fn file_backend_revoke_unknown_does_not_create_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    let store = QuotaStore::new(JsonFileBackend::new(&path), QuotaPolicy::default());
    store.revoke_premium("nobody").unwrap();
    assert!(!path.exists());
}

#[test]
fn file_backend_corrupt_file_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, "{ not json").unwrap();
    let store = QuotaStore::new(JsonFileBackend::new(&path), QuotaPolicy::default());

    assert!(matches!(
        store.get_quota("1"),
        Err(StorageError::Parse { .. })
    ));
    assert!(matches!(
        store.record_usage("1"),
        Err(StorageError::Parse { .. })
    ));
    // The broken file is left as it was.
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn file_backend_different_users_keep_each_others_updates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    let store = Arc::new(QuotaStore::new(
        JsonFileBackend::new(&path),
        QuotaPolicy::default(),
    ));
    std::thread::scope(|s| {
        for user in ["a", "b", "c", "d"] {
            let store = Arc::clone(&store);
            s.spawn(move || {
                for _ in 0..3 {
                    store.record_usage(user).unwrap();
                }
            });
        }
    });
    for user in ["a", "b", "c", "d"] {
        assert_eq!(store.get_quota(user).unwrap().searches_used, 3, "{user}");
    }
}

#[test]
fn separate_file_backends_on_one_path_lose_no_updates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    // Two stores with their own in-process locks, as the bot and the quota
    // command would have.
    let bot = QuotaStore::new(
        JsonFileBackend::new(&path),
        QuotaPolicy {
            free_searches: 100,
            premium_searches: 50,
        },
    );
    let admin = QuotaStore::new(
        JsonFileBackend::new(&path),
        QuotaPolicy {
            free_searches: 100,
            premium_searches: 50,
        },
    );
    std::thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..20 {
                bot.record_usage("shared").unwrap();
                bot.record_usage("bot-only").unwrap();
            }
        });
        s.spawn(|| {
            for i in 0..20 {
                admin.record_usage("shared").unwrap();
                admin.grant_premium(&format!("granted-{i}"), 50).unwrap();
            }
        });
    });

    let shared = bot.get_quota("shared").unwrap();
    assert_eq!(shared.searches_used, 40);
    assert_eq!(shared.remaining_searches, 60);
    assert_eq!(admin.get_quota("bot-only").unwrap().searches_used, 20);
    for i in 0..20 {
        assert!(bot.get_quota(&format!("granted-{i}")).unwrap().is_premium);
    }
}

#[test]
fn file_backend_keeps_lock_sidecar_next_to_data() {
    let dir = tempfile::tempdir().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("users.json"));
    assert_eq!(backend.lock_path(), dir.path().join("users.json.lock"));

    backend.put("1", &QuotaRecord::default()).unwrap();
    assert!(backend.lock_path().exists());
    assert_eq!(backend.get("1").unwrap(), Some(QuotaRecord::default()));
}
