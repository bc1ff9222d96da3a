//! Batch translation.
//!
//! Texts are translated independently through the retrying fetcher, either
//! one after another or across a bounded pool of tokio tasks. Results carry
//! their originating text and input index so that callers can re-associate
//! them when they arrive out of order.

mod orchestrator;

pub use orchestrator::BatchOrchestrator;
