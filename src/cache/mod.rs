//! Persistent translation cache.
//!
//! Translations are kept in a SQLite table keyed by
//! `(text, source language, target language)`. The table is bounded and
//! evicts the oldest inserted entries first, with no promotion on read.

mod store;

pub use store::{CacheEntry, CacheStats, TranslationStore};
