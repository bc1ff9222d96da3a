//! Cache-first fetcher with rate-limit aware retries.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::TranslationStore;
use crate::providers::TranslationProvider;
use crate::types::config::TranslatorConfig;
use crate::types::errors::ProviderError;
use crate::types::requests::TranslationRequest;
use crate::{TranslatorError, TranslatorResult};

use super::classify::RateLimitClassifier;

/// Retry parameters for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Non rate-limit failures tolerated before giving up.
    pub max_retries: u32,

    /// Wait after a counted failure.
    pub retry_delay: Duration,

    /// Wait after a rate-limit signal. Does not consume an attempt.
    pub rate_limit_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy.
    pub fn new(max_retries: u32, retry_delay: Duration, rate_limit_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
            rate_limit_delay,
        }
    }

    /// Policy described by the `[translator]` section.
    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self::new(
            config.max_retries,
            config.retry_delay(),
            config.rate_limit_delay(),
        )
    }

    /// A policy without any waiting.
    pub fn immediate(max_retries: u32) -> Self {
        Self::new(max_retries, Duration::ZERO, Duration::ZERO)
    }

    /// Rejects a policy that could never call the provider.
    pub fn validate(&self) -> TranslatorResult<()> {
        if self.max_retries == 0 {
            return Err(TranslatorError::validation("max_retries must be at least 1"));
        }
        Ok(())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&TranslatorConfig::default())
    }
}

/// Per-request retry bookkeeping, discarded when the fetch ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Counted (non rate-limit) failures.
    pub attempts_made: u32,

    /// Rate-limit waits, which do not count as attempts.
    pub rate_limit_waits: u32,

    /// Most recent counted failure.
    pub last_error: Option<ProviderError>,
}

/// Successful fetch with its bookkeeping.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// The translation.
    pub translation: String,

    /// Whether it came from the cache.
    pub from_cache: bool,

    /// Retry state at completion.
    pub state: RetryState,
}

/// Produces a translation for one request: cache first, then the provider.
///
/// Rate-limit failures (as decided by the classifier) are waited out for as
/// long as the provider keeps signaling them. Other failures consume the
/// `max_retries` budget and end in [`TranslatorError::RetriesExhausted`].
#[derive(Clone)]
pub struct RetryingFetcher {
    store: Arc<TranslationStore>,
    provider: Arc<dyn TranslationProvider>,
    classifier: Arc<dyn RateLimitClassifier>,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    /// Creates a fetcher.
    pub fn new(
        store: Arc<TranslationStore>,
        provider: Arc<dyn TranslationProvider>,
        classifier: Arc<dyn RateLimitClassifier>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            store,
            provider,
            classifier,
            policy,
        }
    }

    /// Returns the retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches the translation for `request`.
    pub async fn fetch(&self, request: &TranslationRequest) -> TranslatorResult<String> {
        self.fetch_report(request).await.map(|r| r.translation)
    }

    /// Fetches the translation and reports how it was obtained.
    pub async fn fetch_report(&self, request: &TranslationRequest) -> TranslatorResult<FetchReport> {
        self.policy.validate()?;

        if let Some(translation) = self.store.lookup(request)? {
            tracing::debug!(%request, "Translation found in cache");
            return Ok(FetchReport {
                translation,
                from_cache: true,
                state: RetryState::default(),
            });
        }

        let mut state = RetryState::default();

        loop {
            match self.provider.fetch(request).await {
                Ok(translation) => {
                    self.store.put(request, &translation)?;
                    tracing::debug!(
                        %request,
                        attempts = state.attempts_made,
                        rate_limit_waits = state.rate_limit_waits,
                        "Translation fetched"
                    );
                    return Ok(FetchReport {
                        translation,
                        from_cache: false,
                        state,
                    });
                }
                Err(error) if self.classifier.is_rate_limited(&error) => {
                    state.rate_limit_waits += 1;
                    tracing::warn!(
                        provider = self.provider.name(),
                        error = %error,
                        wait_secs = self.policy.rate_limit_delay.as_secs_f64(),
                        "Rate limited, waiting before retrying"
                    );
                    tokio::time::sleep(self.policy.rate_limit_delay).await;
                }
                Err(error) => {
                    state.attempts_made += 1;
                    tracing::error!(
                        %request,
                        attempt = state.attempts_made,
                        max_retries = self.policy.max_retries,
                        error = %error,
                        "Translation attempt failed"
                    );

                    if state.attempts_made >= self.policy.max_retries {
                        return Err(TranslatorError::RetriesExhausted {
                            attempts: state.attempts_made,
                            last_error: error,
                        });
                    }

                    state.last_error = Some(error);
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
            }
        }
    }
}
