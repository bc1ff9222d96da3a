//! # deepl-scraper
//!
//! Cached, rate-limit aware translation retrieval.
//!
//! Translations are fetched from an injected provider (by default a headless
//! browser driving a translation web page), persisted in a bounded SQLite
//! cache with first-in-first-out eviction, and retried with a policy that
//! waits out rate limiting without spending the retry budget. Batches run
//! sequentially or across a bounded worker pool, with failures isolated per
//! item.
//!
//! ## Modules
//!
//! - [`translator`] - High-level facade
//! - [`batch`] - Sequential and bounded-concurrent batch execution
//! - [`fetch`] - Cache-first fetcher with rate-limit aware retries
//! - [`cache`] - Persistent translation store
//! - [`providers`] - Translation providers (browser, mock)
//! - [`web`] - HTTP front-end
//! - [`cli`] - Command line interface
//! - [`types`] - Shared types

pub mod batch;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod fetch;
pub mod providers;
pub mod translator;
pub mod types;
#[cfg(feature = "server")]
pub mod web;

pub use translator::Translator;
pub use types::config::Config;
pub use types::errors::{ProviderError, TranslatorError, TranslatorResult};
