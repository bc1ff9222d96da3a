//! Response types for deepl-scraper.

use serde::{Deserialize, Serialize};

use crate::TranslatorError;

/// Result of a `translate` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslateOutput {
    /// Translation of a single text.
    Single(String),
    /// Per-item results of a batch.
    Batch(BatchResult),
}

/// How a batch was executed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Items processed one after another in input order.
    Sequential,
    /// Items dispatched to a bounded worker pool; completion order.
    Concurrent,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Results of a batch, one item per input text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Batch identifier (also used in log spans).
    pub batch_id: String,

    /// Execution mode used.
    pub mode: ExecutionMode,

    /// Per-text results. Input order only in sequential mode.
    pub items: Vec<BatchItem>,
}

impl BatchResult {
    /// Creates an empty result.
    pub fn new(batch_id: impl Into<String>, mode: ExecutionMode) -> Self {
        Self {
            batch_id: batch_id.into(),
            mode,
            items: Vec::new(),
        }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of successfully translated items.
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.is_success()).count()
    }

    /// Number of failed items.
    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Finds the item for a given text.
    pub fn get(&self, text: &str) -> Option<&BatchItem> {
        self.items.iter().find(|i| i.text == text)
    }

    /// Returns the items sorted back into input order.
    pub fn into_input_order(mut self) -> Vec<BatchItem> {
        self.items.sort_by_key(|i| i.index);
        self.items
    }
}

/// Outcome for one text of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// Position of the text in the input.
    pub index: usize,

    /// Originating text.
    pub text: String,

    /// Translation or failure description.
    pub outcome: BatchOutcome,
}

impl BatchItem {
    /// Creates a batch item.
    pub fn new(index: usize, text: impl Into<String>, outcome: BatchOutcome) -> Self {
        Self {
            index,
            text: text.into(),
            outcome,
        }
    }

    /// Whether the text was translated.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Translated(_))
    }

    /// The translation, if any.
    pub fn translation(&self) -> Option<&str> {
        match &self.outcome {
            BatchOutcome::Translated(t) => Some(t),
            BatchOutcome::Failed(_) => None,
        }
    }
}

/// Translation or failure of one batch item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    Translated(String),
    Failed(FailureDescription),
}

impl From<crate::TranslatorResult<String>> for BatchOutcome {
    fn from(result: crate::TranslatorResult<String>) -> Self {
        match result {
            Ok(translation) => BatchOutcome::Translated(translation),
            Err(e) => BatchOutcome::Failed(FailureDescription::from(&e)),
        }
    }
}

/// Why a batch item failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureDescription {
    /// Failure class.
    pub kind: FailureKind,

    /// Human readable message.
    pub message: String,
}

impl FailureDescription {
    /// Creates a failure description.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&TranslatorError> for FailureDescription {
    fn from(err: &TranslatorError) -> Self {
        let kind = match err {
            TranslatorError::RetriesExhausted { .. } | TranslatorError::Provider(_) => {
                FailureKind::RetriesExhausted
            }
            TranslatorError::Storage(_) => FailureKind::Storage,
            TranslatorError::Validation(_) => FailureKind::Validation,
            _ => FailureKind::Internal,
        };
        Self::new(kind, err.to_string())
    }
}

impl std::fmt::Display for FailureDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Failure classes reported per batch item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Provider kept failing until the retry budget ran out.
    RetriesExhausted,
    /// Cache storage failed.
    Storage,
    /// Malformed request.
    Validation,
    /// Worker died or another unexpected failure.
    Internal,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::RetriesExhausted => write!(f, "retries_exhausted"),
            FailureKind::Storage => write!(f, "storage"),
            FailureKind::Validation => write!(f, "validation"),
            FailureKind::Internal => write!(f, "internal"),
        }
    }
}
