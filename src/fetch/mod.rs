//! Single-request translation retrieval.
//!
//! ## State machine
//!
//! - **Start**: look the request up in the store; a hit finishes immediately
//! - **Attempting**: call the provider; success is stored and returned
//! - **Rate limited**: wait `rate_limit_delay`, retry without spending an attempt
//! - **Other failure**: spend an attempt, wait `retry_delay`, retry until
//!   `max_retries` attempts are spent, then fail with `RetriesExhausted`

mod classify;
mod fetcher;

pub use classify::{PhraseClassifier, RateLimitClassifier};
pub use fetcher::{FetchReport, RetryPolicy, RetryState, RetryingFetcher};
