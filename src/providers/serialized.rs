//! Wrapper that serializes calls to a provider.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::base::TranslationProvider;
use crate::types::errors::ProviderError;
use crate::types::requests::TranslationRequest;

/// Lets at most one `fetch` run at a time on the wrapped provider.
///
/// Used by batch execution for providers that report
/// `supports_concurrent_calls() == false`.
pub struct SerializedProvider {
    inner: Arc<dyn TranslationProvider>,
    gate: Mutex<()>,
}

impl SerializedProvider {
    /// Wraps a provider.
    pub fn new(inner: Arc<dyn TranslationProvider>) -> Self {
        Self {
            inner,
            gate: Mutex::new(()),
        }
    }

    /// Wraps `provider` only if it cannot take concurrent calls.
    pub fn guard(provider: Arc<dyn TranslationProvider>) -> Arc<dyn TranslationProvider> {
        if provider.supports_concurrent_calls() {
            provider
        } else {
            tracing::debug!(
                provider = provider.name(),
                "Provider is not concurrency-safe, serializing calls"
            );
            Arc::new(Self::new(provider))
        }
    }
}

#[async_trait]
impl TranslationProvider for SerializedProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, request: &TranslationRequest) -> Result<String, ProviderError> {
        let _permit = self.gate.lock().await;
        self.inner.fetch(request).await
    }

    fn supports_concurrent_calls(&self) -> bool {
        true
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }

    async fn close(&self) -> Result<(), ProviderError> {
        self.inner.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{MockMode, MockProvider};
    use std::time::Duration;

    #[tokio::test]
    async fn test_guard_leaves_concurrent_provider_alone() {
        let provider: Arc<dyn TranslationProvider> = Arc::new(MockProvider::new(MockMode::Suffix));
        let guarded = SerializedProvider::guard(Arc::clone(&provider));
        assert!(Arc::ptr_eq(&provider, &guarded));
    }

    #[tokio::test]
    async fn test_calls_never_overlap() {
        let mock = Arc::new(
            MockProvider::new(MockMode::Suffix)
                .with_delay(Duration::from_millis(10))
                .non_concurrent(),
        );
        let provider = SerializedProvider::guard(mock.clone());

        let mut handles = Vec::new();
        for i in 0..4 {
            let provider = Arc::clone(&provider);
            handles.push(tokio::spawn(async move {
                let request = TranslationRequest::new(format!("t{}", i), "en", "de");
                provider.fetch(&request).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(mock.calls(), 4);
        assert_eq!(mock.max_in_flight(), 1);
    }
}
