//! Integration tests for the persistent translation store.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

use deepl_scraper::cache::TranslationStore;
use deepl_scraper::types::config::CacheConfig;
use deepl_scraper::types::requests::TranslationRequest;
use deepl_scraper::TranslatorError;

fn temp_db_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("translations.db");
    (temp_dir, db_path)
}

fn cache_config(db_path: &PathBuf, max_size: usize) -> CacheConfig {
    CacheConfig {
        enabled: true,
        max_size,
        storage_path: db_path.clone(),
    }
}

fn request(text: &str) -> TranslationRequest {
    TranslationRequest::new(text, "en", "de")
}

#[test]
fn test_store_creates_database_file() {
    let (_temp_dir, db_path) = temp_db_path();
    let store = TranslationStore::from_config(&cache_config(&db_path, 10)).unwrap();

    assert!(db_path.exists());
    assert!(store.is_empty().unwrap());
}

#[test]
fn test_entries_survive_reopen() {
    let (_temp_dir, db_path) = temp_db_path();
    let config = cache_config(&db_path, 10);

    {
        let store = TranslationStore::from_config(&config).unwrap();
        store.put(&request("hello"), "hallo").unwrap();
    }

    let store = TranslationStore::from_config(&config).unwrap();
    assert_eq!(store.lookup(&request("hello")).unwrap().as_deref(), Some("hallo"));
}

#[test]
fn test_eviction_order_survives_reopen() {
    let (_temp_dir, db_path) = temp_db_path();
    let config = cache_config(&db_path, 2);

    {
        let store = TranslationStore::from_config(&config).unwrap();
        store.put(&request("a"), "A").unwrap();
        store.put(&request("b"), "B").unwrap();
    }

    let store = TranslationStore::from_config(&config).unwrap();
    store.put(&request("c"), "C").unwrap();

    assert_eq!(store.lookup(&request("a")).unwrap(), None);
    assert!(store.lookup(&request("b")).unwrap().is_some());
    assert!(store.lookup(&request("c")).unwrap().is_some());
}

#[test]
fn test_capacity_holds_over_many_puts() {
    let (_temp_dir, db_path) = temp_db_path();
    let store = TranslationStore::from_config(&cache_config(&db_path, 3)).unwrap();

    for i in 0..10 {
        store.put(&request(&format!("text-{}", i)), &format!("t{}", i)).unwrap();
        assert!(store.len().unwrap() <= 3);
    }

    let survivors: Vec<String> = store
        .entries()
        .unwrap()
        .into_iter()
        .map(|e| e.key.text)
        .collect();
    assert_eq!(survivors, vec!["text-7", "text-8", "text-9"]);
}

#[test]
fn test_keys_differ_by_language_pair() {
    let (_temp_dir, db_path) = temp_db_path();
    let store = TranslationStore::from_config(&cache_config(&db_path, 10)).unwrap();

    store.put(&TranslationRequest::new("hi", "en", "de"), "hallo").unwrap();
    store.put(&TranslationRequest::new("hi", "en", "fr"), "salut").unwrap();

    assert_eq!(store.len().unwrap(), 2);
    assert_eq!(
        store
            .lookup(&TranslationRequest::new("hi", "en", "fr"))
            .unwrap()
            .as_deref(),
        Some("salut")
    );
    assert_eq!(
        store.lookup(&TranslationRequest::new("Hi", "en", "de")).unwrap(),
        None
    );
}

#[test]
fn test_disabled_store_never_writes() {
    let (_temp_dir, db_path) = temp_db_path();
    let mut config = cache_config(&db_path, 10);
    config.enabled = false;
    let store = TranslationStore::from_config(&config).unwrap();

    store.put(&request("hello"), "hallo").unwrap();

    assert_eq!(store.lookup(&request("hello")).unwrap(), None);
    assert_eq!(store.len().unwrap(), 0);
}

#[test]
fn test_storage_failure_is_an_error_not_a_miss() {
    let (_temp_dir, db_path) = temp_db_path();
    let store = TranslationStore::from_config(&cache_config(&db_path, 10)).unwrap();

    let other = rusqlite::Connection::open(&db_path).unwrap();
    other.execute_batch("DROP TABLE translations;").unwrap();

    let err = store.lookup(&request("hello")).unwrap_err();
    assert!(matches!(err, TranslatorError::Storage(_)));

    let err = store.put(&request("hello"), "hallo").unwrap_err();
    assert!(matches!(err, TranslatorError::Storage(_)));
}

#[test]
fn test_corrupted_file_fails_to_open() {
    let (_temp_dir, db_path) = temp_db_path();
    std::fs::write(&db_path, vec![b'x'; 4096]).unwrap();

    let result = TranslationStore::from_config(&cache_config(&db_path, 10));
    assert!(matches!(result, Err(TranslatorError::Storage(_))));
}

#[test]
fn test_concurrent_writers_respect_capacity() {
    let (_temp_dir, db_path) = temp_db_path();
    let max_size = 5;
    let store = Arc::new(TranslationStore::from_config(&cache_config(&db_path, max_size)).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..50 {
                    let text = format!("w{}-{}", worker, i);
                    store.put(&request(&text), "x").unwrap();
                    assert!(store.len().unwrap() <= max_size);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("writer thread panicked");
    }

    assert_eq!(store.len().unwrap(), max_size);
}
