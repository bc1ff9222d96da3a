//! Configuration for deepl-scraper.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{TranslatorError, TranslatorResult};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "deepl-scraper.toml";

/// Main configuration for deepl-scraper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Retry and rate-limit settings.
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Translation cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Batch execution settings.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Headless browser provider settings.
    #[serde(default)]
    pub browser: BrowserConfig,

    /// HTTP front-end settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Retry and rate-limit settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Seconds to wait after the provider signals rate-limiting.
    #[serde(default = "default_rate_limit_delay")]
    pub rate_limit_delay_secs: u64,

    /// Non rate-limit failures tolerated per request.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Seconds to wait between failed attempts.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Error message fragments that mark a failure as rate-limiting.
    #[serde(default = "default_rate_limit_phrases")]
    pub rate_limit_phrases: Vec<String>,

    /// Source language used when the caller does not pass one.
    #[serde(default = "default_source_lang")]
    pub default_source_lang: String,
}

impl TranslatorConfig {
    /// Delay applied on rate-limit responses.
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_secs(self.rate_limit_delay_secs)
    }

    /// Delay applied between counted failures.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay_secs: default_rate_limit_delay(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
            rate_limit_phrases: default_rate_limit_phrases(),
            default_source_lang: default_source_lang(),
        }
    }
}

fn default_rate_limit_delay() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1
}

fn default_rate_limit_phrases() -> Vec<String> {
    vec![
        "Too many requests".to_string(),
        "Service Temporarily Unavailable".to_string(),
    ]
}

fn default_source_lang() -> String {
    "en".to_string()
}

/// Translation cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of cached translations.
    #[serde(default = "default_max_cache_size")]
    pub max_size: usize,

    /// SQLite database path (`:memory:` keeps the cache in memory only).
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
}

impl CacheConfig {
    /// Whether the cache lives only in memory.
    pub fn is_memory_only(&self) -> bool {
        self.storage_path.as_os_str() == ":memory:"
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        if !self.is_memory_only() && self.storage_path.is_relative() {
            self.storage_path = base.join(&self.storage_path);
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size: default_max_cache_size(),
            storage_path: default_storage_path(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_cache_size() -> usize {
    1000
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("translation_memory.db")
}

/// Batch execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Translate batch items in parallel instead of in input order.
    #[serde(default)]
    pub concurrent: bool,

    /// Upper bound on in-flight requests in concurrent mode.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrent: false,
            max_workers: default_max_workers(),
        }
    }
}

fn default_max_workers() -> usize {
    4
}

/// Headless browser provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Browser executable.
    #[serde(default = "default_browser_command")]
    pub command: String,

    /// Arguments passed before the page URL.
    #[serde(default = "default_browser_args")]
    pub args: Vec<String>,

    /// Translator page; the request is appended as `#source/target/text`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum wait for the translation to become visible (in seconds).
    #[serde(default = "default_browser_timeout")]
    pub timeout_secs: u64,

    /// CSS selector of the element holding the translation.
    #[serde(default = "default_selector")]
    pub selector: String,

    /// User agent override.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            command: default_browser_command(),
            args: default_browser_args(),
            base_url: default_base_url(),
            timeout_secs: default_browser_timeout(),
            selector: default_selector(),
            user_agent: None,
        }
    }
}

fn default_browser_command() -> String {
    "chromium".to_string()
}

fn default_browser_args() -> Vec<String> {
    vec![
        "--headless".to_string(),
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
    ]
}

fn default_base_url() -> String {
    "https://www.deepl.com/translator".to_string()
}

fn default_browser_timeout() -> u64 {
    10
}

fn default_selector() -> String {
    "span.sentence_highlight".to_string()
}

/// HTTP front-end settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Source language for every request coming through the front-end.
    #[serde(default = "default_source_lang")]
    pub source_lang: String,

    /// Offered target languages (code -> display name).
    #[serde(default = "default_languages")]
    pub languages: BTreeMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            source_lang: default_source_lang(),
            languages: default_languages(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_languages() -> BTreeMap<String, String> {
    [
        ("de", "German"),
        ("fr", "French"),
        ("es", "Spanish"),
        ("pt", "Portuguese"),
        ("it", "Italian"),
        ("nl", "Dutch"),
        ("pl", "Polish"),
        ("ru", "Russian"),
        ("ja", "Japanese"),
        ("zh", "Chinese"),
        ("cs", "Czech"),
        ("ro", "Romanian"),
        ("da", "Danish"),
        ("fi", "Finnish"),
        ("el", "Greek"),
        ("hu", "Hungarian"),
        ("sk", "Slovak"),
        ("sl", "Slovenian"),
        ("sv", "Swedish"),
        ("bg", "Bulgarian"),
        ("et", "Estonian"),
        ("lt", "Lithuanian"),
        ("lv", "Latvian"),
        ("pt-PT", "Portuguese (Portugal)"),
        ("pt-BR", "Portuguese (Brazil)"),
    ]
    .into_iter()
    .map(|(code, name)| (code.to_string(), name.to_string()))
    .collect()
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// A relative `cache.storage_path` is resolved against the directory
    /// holding the file, so the cache does not move with the working
    /// directory.
    pub fn load<P: AsRef<Path>>(path: P) -> TranslatorResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.validate()?;

        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.cache.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> TranslatorResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            translator: TranslatorConfig::default(),
            cache: CacheConfig::default(),
            batch: BatchConfig::default(),
            browser: BrowserConfig::default(),
            server: ServerConfig::default(),
        }
    }

    /// Tries to load configuration from current directory or uses default.
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_FILE).unwrap_or_else(|_| Self::default_config())
    }

    /// Rejects settings the pipeline cannot run with.
    pub fn validate(&self) -> TranslatorResult<()> {
        if self.cache.max_size == 0 {
            return Err(TranslatorError::config("cache.max_size must be at least 1"));
        }
        if self.translator.max_retries == 0 {
            return Err(TranslatorError::config(
                "translator.max_retries must be at least 1",
            ));
        }
        if self.batch.max_workers == 0 {
            return Err(TranslatorError::config("batch.max_workers must be at least 1"));
        }
        if self.browser.timeout_secs == 0 {
            return Err(TranslatorError::config(
                "browser.timeout_secs must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default_config();

        assert_eq!(config.translator.rate_limit_delay_secs, 10);
        assert_eq!(config.translator.max_retries, 3);
        assert_eq!(config.translator.retry_delay_secs, 1);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_size, 1000);
        assert_eq!(
            config.cache.storage_path,
            PathBuf::from("translation_memory.db")
        );
        assert!(!config.batch.concurrent);
        assert_eq!(config.server.languages.len(), 25);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [cache]
            max_size = 5

            [batch]
            concurrent = true
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.max_size, 5);
        assert!(config.cache.enabled);
        assert!(config.batch.concurrent);
        assert_eq!(config.batch.max_workers, 4);
        assert_eq!(config.translator.rate_limit_phrases.len(), 2);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = Config::default_config();
        config.cache.max_size = 0;
        assert!(matches!(config.validate(), Err(TranslatorError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let mut config = Config::default_config();
        config.translator.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let mut config = Config::default_config();
        config.cache.max_size = 42;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.cache.max_size, 42);
    }

    #[test]
    fn test_relative_storage_path_follows_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let mut config = Config::default_config();
        config.cache.storage_path = PathBuf::from("data/x.db");
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.cache.storage_path, dir.path().join("data/x.db"));

        config.cache.storage_path = PathBuf::from(":memory:");
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert!(loaded.cache.is_memory_only());

        let absolute = dir.path().join("abs.db");
        config.cache.storage_path = absolute.clone();
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap().cache.storage_path, absolute);
    }

    #[test]
    fn test_memory_only_storage() {
        let mut cache = CacheConfig::default();
        assert!(!cache.is_memory_only());
        cache.storage_path = PathBuf::from(":memory:");
        assert!(cache.is_memory_only());
    }
}
