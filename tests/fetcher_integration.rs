//! Integration tests for the retrying fetcher.

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use deepl_scraper::cache::TranslationStore;
use deepl_scraper::fetch::{PhraseClassifier, RateLimitClassifier, RetryPolicy, RetryingFetcher};
use deepl_scraper::providers::{MockMode, MockProvider};
use deepl_scraper::types::config::CacheConfig;
use deepl_scraper::types::requests::TranslationRequest;
use deepl_scraper::{ProviderError, TranslatorError};

fn memory_store(max_size: usize) -> Arc<TranslationStore> {
    let config = CacheConfig {
        enabled: true,
        max_size,
        storage_path: ":memory:".into(),
    };
    Arc::new(TranslationStore::from_config(&config).expect("Failed to open store"))
}

fn fetcher(provider: Arc<MockProvider>, policy: RetryPolicy) -> RetryingFetcher {
    RetryingFetcher::new(
        memory_store(100),
        provider,
        Arc::new(PhraseClassifier::default()),
        policy,
    )
}

fn request(text: &str) -> TranslationRequest {
    TranslationRequest::new(text, "en", "de")
}

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn test_hello_to_hallo_then_cache_hit() {
        let provider = Arc::new(MockProvider::with_mapping("hello", "de", "hallo"));
        let fetcher = fetcher(provider.clone(), RetryPolicy::immediate(3));

        assert_eq!(fetcher.fetch(&request("hello")).await.unwrap(), "hallo");
        assert_eq!(provider.calls(), 1);

        assert_eq!(fetcher.fetch(&request("hello")).await.unwrap(), "hallo");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let store = memory_store(10);
        let provider = Arc::new(MockProvider::new(MockMode::Suffix).fail_always("x", "boom"));
        let fetcher = RetryingFetcher::new(
            store.clone(),
            provider,
            Arc::new(PhraseClassifier::default()),
            RetryPolicy::immediate(2),
        );

        assert!(fetcher.fetch(&request("x")).await.is_err());
        assert!(store.is_empty().unwrap());
    }
}

mod retries {
    use super::*;

    #[tokio::test]
    async fn test_rate_limit_does_not_exhaust_retries() {
        let provider = Arc::new(
            MockProvider::new(MockMode::Suffix).fail_times("a", 5, "Too many requests"),
        );
        let fetcher = fetcher(provider.clone(), RetryPolicy::immediate(1));

        let report = fetcher.fetch_report(&request("a")).await.unwrap();

        assert_eq!(report.translation, "a_de");
        assert_eq!(report.state.attempts_made, 0);
        assert_eq!(report.state.rate_limit_waits, 5);
        assert_eq!(provider.calls(), 6);
    }

    #[tokio::test]
    async fn test_exhaustion_after_exactly_max_retries_calls() {
        let provider = Arc::new(
            MockProvider::new(MockMode::Suffix).fail_always("b", "element not visible"),
        );
        let fetcher = fetcher(provider.clone(), RetryPolicy::immediate(3));

        let err = fetcher.fetch(&request("b")).await.unwrap_err();

        match err {
            TranslatorError::RetriesExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_error.message, "element not visible");
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_rate_limits_between_counted_failures() {
        // "c" fails twice with a counted error, then is rate limited three
        // times; the scripted queue is consumed in order.
        let provider = Arc::new(
            MockProvider::new(MockMode::Suffix)
                .fail_times("c", 2, "timeout")
                .fail_times("c", 3, "Service Temporarily Unavailable"),
        );
        let fetcher = fetcher(provider.clone(), RetryPolicy::immediate(3));

        let report = fetcher.fetch_report(&request("c")).await.unwrap();

        assert_eq!(report.state.attempts_made, 2);
        assert_eq!(report.state.rate_limit_waits, 3);
        assert_eq!(provider.calls(), 6);
    }

    #[tokio::test]
    async fn test_custom_classifier() {
        let classifier: Arc<dyn RateLimitClassifier> =
            Arc::new(|e: &ProviderError| e.message.contains("429"));
        let provider = Arc::new(MockProvider::new(MockMode::Suffix).fail_times("d", 4, "HTTP 429"));
        let fetcher = RetryingFetcher::new(
            memory_store(10),
            provider.clone(),
            classifier,
            RetryPolicy::immediate(1),
        );

        let report = fetcher.fetch_report(&request("d")).await.unwrap();
        assert_eq!(report.state.rate_limit_waits, 4);
        assert_eq!(report.state.attempts_made, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_final_attempt() {
        let provider = Arc::new(MockProvider::new(MockMode::Suffix).fail_always("e", "boom"));
        let policy = RetryPolicy::new(2, Duration::from_secs(5), Duration::from_secs(60));
        let fetcher = fetcher(provider.clone(), policy);

        let started = tokio::time::Instant::now();
        let err = fetcher.fetch(&request("e")).await.unwrap_err();

        assert!(matches!(err, TranslatorError::RetriesExhausted { attempts: 2, .. }));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(5));
        assert!(elapsed < Duration::from_secs(10));
    }
}

mod storage {
    use super::*;

    #[tokio::test]
    async fn test_storage_error_propagates_before_provider_call() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("cache.db");
        let config = CacheConfig {
            enabled: true,
            max_size: 10,
            storage_path: db_path.clone(),
        };
        let store = Arc::new(TranslationStore::from_config(&config).unwrap());

        rusqlite::Connection::open(&db_path)
            .unwrap()
            .execute_batch("DROP TABLE translations;")
            .unwrap();

        let provider = Arc::new(MockProvider::new(MockMode::Suffix));
        let fetcher = RetryingFetcher::new(
            store,
            provider.clone(),
            Arc::new(PhraseClassifier::default()),
            RetryPolicy::immediate(3),
        );

        let err = fetcher.fetch(&request("hello")).await.unwrap_err();
        assert!(matches!(err, TranslatorError::Storage(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_calls_provider() {
        let config = CacheConfig {
            enabled: false,
            max_size: 10,
            storage_path: ":memory:".into(),
        };
        let provider = Arc::new(MockProvider::new(MockMode::Suffix));
        let fetcher = RetryingFetcher::new(
            Arc::new(TranslationStore::from_config(&config).unwrap()),
            provider.clone(),
            Arc::new(PhraseClassifier::default()),
            RetryPolicy::immediate(3),
        );

        fetcher.fetch(&request("hello")).await.unwrap();
        fetcher.fetch(&request("hello")).await.unwrap();
        assert_eq!(provider.calls(), 2);
    }
}
