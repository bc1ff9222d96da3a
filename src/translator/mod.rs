//! High-level translation entry point.
//!
//! [`Translator`] wires the store, provider and rate-limit classifier from a
//! [`Config`] and accepts either one text or a sequence of texts.
//!
//! ## Example
//!
//! ```rust,ignore
//! use deepl_scraper::{Config, Translator};
//!
//! let translator = Translator::from_config(Config::load_or_default())?;
//! let output = translator.translate("hello".into(), "en", "de").await?;
//! ```

use std::sync::Arc;

use crate::batch::BatchOrchestrator;
use crate::cache::{CacheStats, TranslationStore};
use crate::fetch::{PhraseClassifier, RateLimitClassifier, RetryPolicy};
use crate::providers::{BrowserProvider, TranslationProvider};
use crate::types::config::Config;
use crate::types::requests::{TranslateInput, TranslationRequest};
use crate::types::responses::{BatchResult, TranslateOutput};
use crate::{TranslatorError, TranslatorResult};

/// Language code that would ask for automatic detection.
const AUTO_LANGUAGE: &str = "auto";

/// Cached, retrying translator.
pub struct Translator {
    config: Config,
    store: Arc<TranslationStore>,
    provider: Arc<dyn TranslationProvider>,
    orchestrator: BatchOrchestrator,
}

impl Translator {
    /// Creates a translator backed by the headless browser provider.
    pub fn from_config(config: Config) -> TranslatorResult<Self> {
        let provider = BrowserProvider::from_config(&config.browser)?;
        Self::new(config, Arc::new(provider))
    }

    /// Creates a translator around an explicit provider.
    pub fn new(config: Config, provider: Arc<dyn TranslationProvider>) -> TranslatorResult<Self> {
        let classifier = Arc::new(PhraseClassifier::from_config(&config.translator));
        Self::with_classifier(config, provider, classifier)
    }

    /// Creates a translator with a custom rate-limit classifier.
    pub fn with_classifier(
        config: Config,
        provider: Arc<dyn TranslationProvider>,
        classifier: Arc<dyn RateLimitClassifier>,
    ) -> TranslatorResult<Self> {
        config.validate()?;
        let store = Arc::new(TranslationStore::from_config(&config.cache)?);
        Ok(Self::with_store(config, store, provider, classifier))
    }

    /// Creates a translator over an already opened store.
    pub fn with_store(
        config: Config,
        store: Arc<TranslationStore>,
        provider: Arc<dyn TranslationProvider>,
        classifier: Arc<dyn RateLimitClassifier>,
    ) -> Self {
        let orchestrator = BatchOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&provider),
            classifier,
            config.batch.clone(),
        );

        tracing::debug!(
            provider = provider.name(),
            caching = config.cache.enabled,
            max_cache_size = config.cache.max_size,
            mode = %orchestrator.mode(),
            "Translator ready"
        );

        Self {
            config,
            store,
            provider,
            orchestrator,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The translation store.
    pub fn store(&self) -> &Arc<TranslationStore> {
        &self.store
    }

    /// Retry policy from the configuration.
    pub fn default_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.config.translator)
    }

    /// Translates one text or a batch using the configured retry policy.
    pub async fn translate(
        &self,
        input: TranslateInput,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslatorResult<TranslateOutput> {
        self.translate_with_policy(input, source_lang, target_lang, &self.default_policy())
            .await
    }

    /// Translates one text or a batch with an explicit retry policy.
    pub async fn translate_with_policy(
        &self,
        input: TranslateInput,
        source_lang: &str,
        target_lang: &str,
        policy: &RetryPolicy,
    ) -> TranslatorResult<TranslateOutput> {
        match input {
            TranslateInput::Single(text) => self
                .translate_text_with_policy(&text, source_lang, target_lang, policy)
                .await
                .map(TranslateOutput::Single),
            TranslateInput::Batch(texts) => self
                .translate_batch_with_policy(&texts, source_lang, target_lang, policy)
                .await
                .map(TranslateOutput::Batch),
        }
    }

    /// Translates a single text.
    pub async fn translate_text(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslatorResult<String> {
        self.translate_text_with_policy(text, source_lang, target_lang, &self.default_policy())
            .await
    }

    async fn translate_text_with_policy(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        policy: &RetryPolicy,
    ) -> TranslatorResult<String> {
        validate_languages(source_lang, target_lang)?;
        let request = TranslationRequest::new(text, source_lang, target_lang);
        self.orchestrator.fetcher(*policy).fetch(&request).await
    }

    /// Translates a batch; failures are reported per item.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> TranslatorResult<BatchResult> {
        self.translate_batch_with_policy(texts, source_lang, target_lang, &self.default_policy())
            .await
    }

    async fn translate_batch_with_policy(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
        policy: &RetryPolicy,
    ) -> TranslatorResult<BatchResult> {
        validate_languages(source_lang, target_lang)?;
        self.orchestrator
            .translate_all(texts, source_lang, target_lang, policy)
            .await
    }

    /// Removes every cached translation.
    pub fn clear_cache(&self) -> TranslatorResult<()> {
        self.store.clear()
    }

    /// Cache statistics.
    pub fn cache_stats(&self) -> TranslatorResult<CacheStats> {
        self.store.stats()
    }

    /// Releases the provider.
    pub async fn close(&self) -> TranslatorResult<()> {
        self.provider.close().await?;
        Ok(())
    }
}

fn validate_languages(source_lang: &str, target_lang: &str) -> TranslatorResult<()> {
    if source_lang == AUTO_LANGUAGE {
        tracing::warn!("Language detection is not supported, a source language is required");
        return Err(TranslatorError::validation(
            "language detection is not supported; provide the source language",
        ));
    }
    if source_lang.trim().is_empty() {
        return Err(TranslatorError::validation("source language must not be empty"));
    }
    if target_lang.trim().is_empty() {
        return Err(TranslatorError::validation("target language must not be empty"));
    }
    Ok(())
}
