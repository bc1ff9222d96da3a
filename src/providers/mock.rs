//! Mock provider for testing
//!
//! Deterministic, browser-free provider used to exercise the fetch and batch
//! pipeline. Failures can be scripted per text, either for a fixed number of
//! calls or permanently.
//!
//! # Example
//!
//! ```ignore
//! use deepl_scraper::providers::{MockMode, MockProvider};
//!
//! let mock = MockProvider::new(MockMode::Suffix).fail_times("b", 2, "Too many requests");
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::base::TranslationProvider;
use crate::types::errors::ProviderError;
use crate::types::requests::TranslationRequest;

/// How the mock produces translations.
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target language: "hello" → "hello_de"
    Suffix,

    /// Predefined (text, target_lang) → translation; anything else fails
    Mappings(HashMap<(String, String), String>),
}

/// Scripted translation provider.
#[derive(Debug)]
pub struct MockProvider {
    mode: MockMode,
    scripted: Mutex<HashMap<String, VecDeque<ProviderError>>>,
    always_fail: HashMap<String, ProviderError>,
    delay: Duration,
    concurrent: bool,
    calls: AtomicUsize,
    calls_by_text: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockProvider {
    /// Create a mock with the given mode
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            scripted: Mutex::new(HashMap::new()),
            always_fail: HashMap::new(),
            delay: Duration::ZERO,
            concurrent: true,
            calls: AtomicUsize::new(0),
            calls_by_text: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Convenience constructor for a single mapping
    pub fn with_mapping(text: &str, target_lang: &str, translation: &str) -> Self {
        let mut map = HashMap::new();
        map.insert(
            (text.to_string(), target_lang.to_string()),
            translation.to_string(),
        );
        Self::new(MockMode::Mappings(map))
    }

    /// Fail the next `times` calls for `text` with `message`, then behave normally
    #[must_use]
    pub fn fail_times(self, text: &str, times: usize, message: &str) -> Self {
        if let Ok(mut scripted) = self.scripted.lock() {
            let queue = scripted.entry(text.to_string()).or_default();
            queue.extend((0..times).map(|_| ProviderError::new(message)));
        }
        self
    }

    /// Always fail calls for `text` with `message`
    #[must_use]
    pub fn fail_always(mut self, text: &str, message: &str) -> Self {
        self.always_fail
            .insert(text.to_string(), ProviderError::new(message));
        self
    }

    /// Simulated latency per call
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Declare the mock unsafe for concurrent calls
    #[must_use]
    pub fn non_concurrent(mut self) -> Self {
        self.concurrent = false;
        self
    }

    /// Total number of `fetch` calls
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch` calls for one text
    pub fn calls_for(&self, text: &str) -> usize {
        self.calls_by_text
            .lock()
            .map(|calls| calls.get(text).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Highest number of simultaneous `fetch` calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_scripted_failure(&self, text: &str) -> Option<ProviderError> {
        self.scripted
            .lock()
            .ok()
            .and_then(|mut scripted| scripted.get_mut(text).and_then(|q| q.pop_front()))
    }

    fn translate(&self, request: &TranslationRequest) -> Result<String, ProviderError> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", request.text, request.target_lang)),
            MockMode::Mappings(map) => map
                .get(&(request.text.clone(), request.target_lang.clone()))
                .cloned()
                .ok_or_else(|| {
                    ProviderError::new(format!("no mapping for {:?}", request.text))
                }),
        }
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, request: &TranslationRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls_by_text.lock() {
            *calls.entry(request.text.clone()).or_default() += 1;
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = if let Some(err) = self.next_scripted_failure(&request.text) {
            Err(err)
        } else if let Some(err) = self.always_fail.get(&request.text) {
            Err(err.clone())
        } else {
            self.translate(request)
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn supports_concurrent_calls(&self) -> bool {
        self.concurrent
    }
}
