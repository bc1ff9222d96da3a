//! Base trait for translation providers.

use async_trait::async_trait;

use crate::types::errors::ProviderError;
use crate::types::requests::TranslationRequest;

/// Something that turns one text into its translation.
///
/// Failures are reported as [`ProviderError`]; rate-limit conditions are
/// only recognizable from the error message.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Returns the provider name.
    fn name(&self) -> &str;

    /// Translates one request.
    ///
    /// Implementations enforce their own bounded wait before failing.
    async fn fetch(&self, request: &TranslationRequest) -> Result<String, ProviderError>;

    /// Whether `fetch` may run concurrently on the same instance.
    ///
    /// When `false`, batch execution serializes provider calls.
    fn supports_concurrent_calls(&self) -> bool {
        true
    }

    /// Checks whether the provider can be used on this system.
    async fn is_available(&self) -> bool {
        true
    }

    /// Releases resources held by the provider.
    async fn close(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
