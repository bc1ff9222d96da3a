//! Rate-limit classification of provider errors.
//!
//! A failure is either rate-limiting (wait and try again, free of charge) or
//! anything else (counts against the retry budget). Providers only expose
//! unstructured messages, so the decision is a swappable predicate.

use crate::types::config::TranslatorConfig;
use crate::types::errors::ProviderError;

/// Decides whether a provider failure is a rate-limit signal.
pub trait RateLimitClassifier: Send + Sync {
    /// Classifier name, for logs.
    fn name(&self) -> &str {
        "custom"
    }

    /// Returns `true` when the error means "wait and retry".
    fn is_rate_limited(&self, error: &ProviderError) -> bool;
}

impl<F> RateLimitClassifier for F
where
    F: Fn(&ProviderError) -> bool + Send + Sync,
{
    fn is_rate_limited(&self, error: &ProviderError) -> bool {
        self(error)
    }
}

/// Matches known rate-limit phrases as substrings of the error message.
///
/// Matching is case-sensitive, like the phrases the service emits.
#[derive(Debug, Clone)]
pub struct PhraseClassifier {
    phrases: Vec<String>,
}

impl PhraseClassifier {
    /// Creates a classifier for the given phrases.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// Creates a classifier from the configured phrase list.
    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self::new(config.rate_limit_phrases.iter().cloned())
    }

    /// The phrases this classifier looks for.
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl Default for PhraseClassifier {
    fn default() -> Self {
        Self::from_config(&TranslatorConfig::default())
    }
}

impl RateLimitClassifier for PhraseClassifier {
    fn name(&self) -> &str {
        "phrases"
    }

    fn is_rate_limited(&self, error: &ProviderError) -> bool {
        self.phrases.iter().any(|p| error.message.contains(p.as_str()))
    }
}
