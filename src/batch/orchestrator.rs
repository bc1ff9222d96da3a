//! Batch orchestration over the retrying fetcher.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::Instrument;

use crate::cache::TranslationStore;
use crate::fetch::{RateLimitClassifier, RetryPolicy, RetryingFetcher};
use crate::providers::{SerializedProvider, TranslationProvider};
use crate::types::config::BatchConfig;
use crate::types::requests::TranslationRequest;
use crate::types::responses::{
    BatchItem, BatchOutcome, BatchResult, ExecutionMode, FailureDescription, FailureKind,
};
use crate::TranslatorResult;

/// Fans a batch of texts out over [`RetryingFetcher`].
///
/// Every text gets exactly one [`BatchItem`]; a failing text never affects its
/// siblings. Sequential mode keeps input order. Concurrent mode dispatches all
/// texts at once to at most `max_workers` in-flight fetches and collects items
/// as they complete.
pub struct BatchOrchestrator {
    store: Arc<TranslationStore>,
    provider: Arc<dyn TranslationProvider>,
    classifier: Arc<dyn RateLimitClassifier>,
    config: BatchConfig,
}

impl BatchOrchestrator {
    /// Creates an orchestrator.
    ///
    /// Providers that cannot take concurrent calls are wrapped so their calls
    /// are serialized; store access stays concurrent.
    pub fn new(
        store: Arc<TranslationStore>,
        provider: Arc<dyn TranslationProvider>,
        classifier: Arc<dyn RateLimitClassifier>,
        config: BatchConfig,
    ) -> Self {
        Self {
            store,
            provider: SerializedProvider::guard(provider),
            classifier,
            config,
        }
    }

    /// Execution mode selected by configuration.
    pub fn mode(&self) -> ExecutionMode {
        if self.config.concurrent {
            ExecutionMode::Concurrent
        } else {
            ExecutionMode::Sequential
        }
    }

    /// Builds a fetcher for `policy` sharing this orchestrator's collaborators.
    pub fn fetcher(&self, policy: RetryPolicy) -> RetryingFetcher {
        RetryingFetcher::new(
            Arc::clone(&self.store),
            Arc::clone(&self.provider),
            Arc::clone(&self.classifier),
            policy,
        )
    }

    /// Translates every text from `source_lang` to `target_lang`.
    ///
    /// Only whole-batch problems (an invalid policy) fail the call; per-text
    /// failures are reported in the items.
    pub async fn translate_all(
        &self,
        texts: &[String],
        source_lang: &str,
        target_lang: &str,
        policy: &RetryPolicy,
    ) -> TranslatorResult<BatchResult> {
        policy.validate()?;

        let mode = self.mode();
        let mut result = BatchResult::new(uuid::Uuid::new_v4().to_string(), mode);
        if texts.is_empty() {
            return Ok(result);
        }

        let span = tracing::info_span!(
            "batch",
            batch_id = %result.batch_id,
            %mode,
            items = texts.len()
        );

        let fetcher = self.fetcher(*policy);
        let requests: Vec<TranslationRequest> = texts
            .iter()
            .map(|text| TranslationRequest::new(text.as_str(), source_lang, target_lang))
            .collect();

        result.items = match mode {
            ExecutionMode::Sequential => {
                Self::run_sequential(&fetcher, requests)
                    .instrument(span.clone())
                    .await
            }
            ExecutionMode::Concurrent => {
                Self::run_concurrent(fetcher, requests, self.config.max_workers)
                    .instrument(span.clone())
                    .await
            }
        };

        span.in_scope(|| {
            tracing::info!(
                succeeded = result.succeeded(),
                failed = result.failed(),
                "Batch finished"
            );
        });

        Ok(result)
    }

    async fn run_sequential(
        fetcher: &RetryingFetcher,
        requests: Vec<TranslationRequest>,
    ) -> Vec<BatchItem> {
        let mut items = Vec::with_capacity(requests.len());
        for (index, request) in requests.into_iter().enumerate() {
            let outcome = BatchOutcome::from(fetcher.fetch(&request).await);
            items.push(BatchItem::new(index, request.text, outcome));
        }
        items
    }

    async fn run_concurrent(
        fetcher: RetryingFetcher,
        requests: Vec<TranslationRequest>,
        max_workers: usize,
    ) -> Vec<BatchItem> {
        let fetcher = Arc::new(fetcher);
        let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
        let (tx, mut rx) = mpsc::unbounded_channel::<BatchItem>();

        let mut pending: BTreeMap<usize, String> = BTreeMap::new();

        for (index, request) in requests.into_iter().enumerate() {
            pending.insert(index, request.text.clone());

            let fetcher = Arc::clone(&fetcher);
            let semaphore = Arc::clone(&semaphore);
            let tx = tx.clone();

            tokio::spawn(
                async move {
                    let outcome = match semaphore.acquire_owned().await {
                        Ok(_permit) => BatchOutcome::from(fetcher.fetch(&request).await),
                        Err(e) => BatchOutcome::Failed(FailureDescription::new(
                            FailureKind::Internal,
                            format!("worker pool closed: {}", e),
                        )),
                    };
                    // The receiver only goes away once every sender is dropped.
                    let _ = tx.send(BatchItem::new(index, request.text, outcome));
                }
                .in_current_span(),
            );
        }
        drop(tx);

        let mut items = Vec::with_capacity(pending.len());
        while let Some(item) = rx.recv().await {
            pending.remove(&item.index);
            items.push(item);
        }

        // A task that panicked never reports; keep its text in the result.
        for (index, text) in pending {
            tracing::error!(index, text = %text, "Batch worker terminated without a result");
            items.push(BatchItem::new(
                index,
                text,
                BatchOutcome::Failed(FailureDescription::new(
                    FailureKind::Internal,
                    "worker terminated unexpectedly",
                )),
            ));
        }

        items
    }
}
