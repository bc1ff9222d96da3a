//! Request types for deepl-scraper.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{TranslatorError, TranslatorResult};

/// One translation request.
///
/// Equality covers all three fields with exact, case-sensitive comparison.
/// The same triple is the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Text to translate.
    pub text: String,

    /// Source language code.
    pub source_lang: String,

    /// Target language code.
    pub target_lang: String,
}

impl TranslationRequest {
    /// Creates a new translation request.
    pub fn new(
        text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }
}

impl std::fmt::Display for TranslationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}->{}: {:?}",
            self.source_lang, self.target_lang, self.text
        )
    }
}

/// What the caller asked to translate: one text or a sequence of texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateInput {
    Single(String),
    Batch(Vec<String>),
}

impl TranslateInput {
    /// Reads the input from an untyped JSON value.
    ///
    /// Anything other than a string or an array of strings is rejected.
    pub fn from_json(value: Value) -> TranslatorResult<Self> {
        match value {
            Value::String(text) => Ok(Self::Single(text)),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::String(text) => Ok(text),
                    other => Err(TranslatorError::validation(format!(
                        "'text[{}]' must be a string, got {}",
                        i,
                        json_kind(&other)
                    ))),
                })
                .collect::<TranslatorResult<Vec<_>>>()
                .map(Self::Batch),
            other => Err(TranslatorError::validation(format!(
                "'text' must be a string or a list of strings, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Number of texts in the input.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(texts) => texts.len(),
        }
    }

    /// Whether the input holds no text at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for TranslateInput {
    fn from(text: &str) -> Self {
        Self::Single(text.to_string())
    }
}

impl From<String> for TranslateInput {
    fn from(text: String) -> Self {
        Self::Single(text)
    }
}

impl From<Vec<String>> for TranslateInput {
    fn from(texts: Vec<String>) -> Self {
        Self::Batch(texts)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_equality_is_case_sensitive() {
        let a = TranslationRequest::new("Hello", "en", "de");
        let b = TranslationRequest::new("hello", "en", "de");
        let c = TranslationRequest::new("Hello", "en", "DE");

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, TranslationRequest::new("Hello", "en", "de"));
    }

    #[test]
    fn test_input_from_json_string() {
        let input = TranslateInput::from_json(json!("hello")).unwrap();
        assert_eq!(input, TranslateInput::Single("hello".to_string()));
    }

    #[test]
    fn test_input_from_json_list() {
        let input = TranslateInput::from_json(json!(["a", "b"])).unwrap();
        assert_eq!(input.len(), 2);
    }

    #[test]
    fn test_input_from_json_rejects_number() {
        let err = TranslateInput::from_json(json!(42)).unwrap_err();
        assert!(matches!(err, TranslatorError::Validation(_)));
    }

    #[test]
    fn test_input_from_json_rejects_mixed_list() {
        let err = TranslateInput::from_json(json!(["a", 1])).unwrap_err();
        assert!(err.to_string().contains("text[1]"));
    }
}
