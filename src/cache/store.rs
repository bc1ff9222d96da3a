//! SQLite-backed translation store with FIFO eviction.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::types::config::CacheConfig;
use crate::types::requests::TranslationRequest;
use crate::{TranslatorError, TranslatorResult};

/// A cached translation.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cache key.
    pub key: TranslationRequest,

    /// Cached translation.
    pub value: String,

    /// Monotonic insertion sequence; lower is older.
    pub insertion_order: i64,

    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

/// Cache statistics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Whether caching is enabled.
    pub enabled: bool,

    /// Current number of entries.
    pub size: usize,

    /// Maximum capacity.
    pub capacity: usize,

    /// Number of cache hits.
    pub hits: u64,

    /// Number of cache misses.
    pub misses: u64,
}

impl CacheStats {
    /// Computes the hit rate.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded, persistent map from `(text, source, target)` to a translation.
///
/// Eviction is strictly oldest-inserted first; reads never promote an entry.
/// The connection lives behind a mutex and every `put` runs in a single
/// immediate transaction, so concurrent writers cannot jointly exceed
/// `max_size`.
pub struct TranslationStore {
    conn: Mutex<Connection>,
    enabled: bool,
    max_size: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TranslationStore {
    /// Opens (or creates) the store described by `config`.
    ///
    /// A `storage_path` of `:memory:` yields a memory-only store.
    pub fn from_config(config: &CacheConfig) -> TranslatorResult<Self> {
        if config.is_memory_only() {
            Self::open_in_memory(config)
        } else {
            Self::open(&config.storage_path, config)
        }
    }

    /// Opens (or creates) a store backed by the SQLite file at `path`.
    pub fn open(path: &Path, config: &CacheConfig) -> TranslatorResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "Translation store opened");
        Self::with_connection(conn, config)
    }

    /// Creates a store that lives only as long as the process.
    pub fn open_in_memory(config: &CacheConfig) -> TranslatorResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, config)
    }

    fn with_connection(conn: Connection, config: &CacheConfig) -> TranslatorResult<Self> {
        if config.max_size == 0 {
            return Err(TranslatorError::config("cache.max_size must be at least 1"));
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS translations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_text TEXT NOT NULL,
                source_lang TEXT NOT NULL,
                target_lang TEXT NOT NULL,
                translation TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(source_text, source_lang, target_lang)
            );
        "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            enabled: config.enabled,
            max_size: config.max_size,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    fn conn(&self) -> TranslatorResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| TranslatorError::storage("store lock poisoned by a panicked writer"))
    }

    /// Whether caching is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Looks up a cached translation.
    ///
    /// Returns `None` without touching the database when caching is disabled.
    /// Storage failures are returned as errors, never as a miss.
    pub fn lookup(&self, key: &TranslationRequest) -> TranslatorResult<Option<String>> {
        if !self.enabled {
            return Ok(None);
        }

        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT translation FROM translations
                 WHERE source_text = ? AND source_lang = ? AND target_lang = ?",
                params![key.text, key.source_lang, key.target_lang],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        Ok(found)
    }

    /// Stores a translation, evicting the oldest entries when full.
    ///
    /// A put for an existing key replaces it and gives it a fresh insertion
    /// order. No-op when caching is disabled.
    pub fn put(&self, key: &TranslationRequest, value: &str) -> TranslatorResult<()> {
        if !self.enabled {
            return Ok(());
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "DELETE FROM translations
             WHERE source_text = ? AND source_lang = ? AND target_lang = ?",
            params![key.text, key.source_lang, key.target_lang],
        )?;

        let count: i64 = tx.query_row("SELECT COUNT(*) FROM translations", [], |row| row.get(0))?;
        let count = count as usize;

        if count >= self.max_size {
            let evict = count - self.max_size + 1;
            let evicted = tx.execute(
                "DELETE FROM translations WHERE id IN (
                     SELECT id FROM translations ORDER BY id ASC LIMIT ?
                 )",
                params![evict as i64],
            )?;
            tracing::debug!(evicted, capacity = self.max_size, "Evicted oldest translations");
        }

        tx.execute(
            "INSERT INTO translations (source_text, source_lang, target_lang, translation, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                key.text,
                key.source_lang,
                key.target_lang,
                value,
                Utc::now().to_rfc3339()
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Removes every entry. Settings are unaffected.
    pub fn clear(&self) -> TranslatorResult<()> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM translations", [])?;
        tracing::info!(removed, "Translation cache cleared");
        Ok(())
    }

    /// Number of stored entries.
    pub fn len(&self) -> TranslatorResult<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM translations", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> TranslatorResult<bool> {
        Ok(self.len()? == 0)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> TranslatorResult<Vec<CacheEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, source_text, source_lang, target_lang, translation, created_at
             FROM translations
             ORDER BY id ASC",
        )?;

        let entries = stmt
            .query_map([], |row| {
                Ok(CacheEntry {
                    insertion_order: row.get(0)?,
                    key: TranslationRequest {
                        text: row.get(1)?,
                        source_lang: row.get(2)?,
                        target_lang: row.get(3)?,
                    },
                    value: row.get(4)?,
                    created_at: parse_timestamp(5, row.get(5)?)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> TranslatorResult<CacheStats> {
        Ok(CacheStats {
            enabled: self.enabled,
            size: self.len()?,
            capacity: self.max_size,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        })
    }
}

fn parse_timestamp(column: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}
