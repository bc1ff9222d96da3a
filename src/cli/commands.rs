//! CLI command implementations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cache::TranslationStore;
use crate::providers::{BrowserProvider, TranslationProvider};
use crate::translator::Translator;
use crate::types::config::{Config, DEFAULT_CONFIG_FILE};
use crate::types::responses::BatchOutcome;
use crate::{TranslatorError, TranslatorResult};

/// Data directory created by `init`.
const DATA_DIR: &str = ".deepl-scraper";

/// Writes a default configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> TranslatorResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join(DEFAULT_CONFIG_FILE);

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    let data_dir = target_dir.join(DATA_DIR);
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("{}/ directory created", DATA_DIR);
    }

    update_gitignore(&target_dir)?;

    let mut config = Config::default_config();
    config.cache.storage_path = Path::new(DATA_DIR).join("translation_memory.db");
    config.save(&config_path)?;

    println!("deepl-scraper initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!("Cache database: {}", config.cache.storage_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Check the browser setup: deepl-scraper doctor");
    println!("  2. Translate something: deepl-scraper translate \"hello\" --to de");

    Ok(())
}

/// Updates or creates .gitignore so the cache database stays untracked.
fn update_gitignore(target_dir: &Path) -> TranslatorResult<()> {
    let gitignore_path = target_dir.join(".gitignore");
    let entry = format!("{}/", DATA_DIR);
    let comment = "# deepl-scraper - local translation cache";

    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)?;

        if content
            .lines()
            .any(|line| line.trim() == entry || line.trim() == DATA_DIR)
        {
            tracing::debug!(".gitignore already contains {}", entry);
            return Ok(());
        }

        let mut new_content = content.trim_end().to_string();
        if !new_content.is_empty() {
            new_content.push_str("\n\n");
        }
        new_content.push_str(comment);
        new_content.push('\n');
        new_content.push_str(&entry);
        new_content.push('\n');

        std::fs::write(&gitignore_path, new_content)?;
        println!(".gitignore updated with {}", entry);
    } else {
        std::fs::write(&gitignore_path, format!("{}\n{}\n", comment, entry))?;
        println!(".gitignore created with {}", entry);
    }

    Ok(())
}

/// Translates one text, or several as a batch.
pub async fn translate(
    texts: Vec<String>,
    from: Option<String>,
    to: &str,
    concurrent: bool,
    json: bool,
    config: &Config,
) -> TranslatorResult<()> {
    let mut config = config.clone();
    if concurrent {
        config.batch.concurrent = true;
    }
    let source_lang = from.unwrap_or_else(|| config.translator.default_source_lang.clone());

    let translator = Translator::from_config(config)?;
    let spinner = spinner(json, texts.len());

    let result = if let [text] = texts.as_slice() {
        let translation = translator.translate_text(text, &source_lang, to).await;
        spinner.finish_and_clear();
        let translation = translation?;
        if json {
            println!("{}", serde_json::json!({ "translation": translation }));
        } else {
            println!("{}", translation);
        }
        Ok(())
    } else {
        let batch = translator.translate_batch(&texts, &source_lang, to).await;
        spinner.finish_and_clear();
        let batch = batch?;
        let failed = batch.failed();
        let total = batch.len();

        if json {
            println!("{}", serde_json::to_string_pretty(&batch)?);
        } else {
            for item in batch.into_input_order() {
                match item.outcome {
                    BatchOutcome::Translated(translation) => {
                        println!("✓ {} → {}", item.text, translation)
                    }
                    BatchOutcome::Failed(failure) => println!("✗ {}: {}", item.text, failure),
                }
            }
        }

        if failed > 0 {
            Err(TranslatorError::other(format!(
                "{} of {} texts could not be translated",
                failed, total
            )))
        } else {
            Ok(())
        }
    };

    translator.close().await?;
    result
}

fn spinner(hidden: bool, items: usize) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(if items == 1 {
        "Translating...".to_string()
    } else {
        format!("Translating {} texts...", items)
    });
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Starts the HTTP front-end.
#[cfg(feature = "server")]
pub async fn serve(host: Option<String>, port: Option<u16>, config: &Config) -> TranslatorResult<()> {
    let mut config = config.clone();
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::debug!(
        "Configuration loaded: source_lang={}, languages={}",
        config.server.source_lang,
        config.server.languages.len()
    );

    crate::web::serve(config).await
}

/// Shows cache statistics.
pub async fn cache_stats(config: &Config) -> TranslatorResult<()> {
    let store = TranslationStore::from_config(&config.cache)?;
    let stats = store.stats()?;

    println!("Translation cache\n");
    println!("  Location: {}", config.cache.storage_path.display());
    println!(
        "  Enabled:  {}",
        if stats.enabled { "yes" } else { "no" }
    );
    println!("  Entries:  {}/{}", stats.size, stats.capacity);

    Ok(())
}

/// Lists cached translations, oldest first.
pub async fn cache_list(limit: usize, config: &Config) -> TranslatorResult<()> {
    let store = TranslationStore::from_config(&config.cache)?;
    let entries = store.entries()?;

    if entries.is_empty() {
        println!("The translation cache is empty.");
        return Ok(());
    }

    for entry in entries.iter().take(limit) {
        println!(
            "  {}. [{} → {}] {} => {} ({})",
            entry.insertion_order,
            entry.key.source_lang,
            entry.key.target_lang,
            entry.key.text,
            entry.value,
            entry.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    if entries.len() > limit {
        println!("  ... {} more", entries.len() - limit);
    }

    Ok(())
}

/// Removes every cached translation.
pub async fn cache_clear(config: &Config) -> TranslatorResult<()> {
    let store = TranslationStore::from_config(&config.cache)?;
    let removed = store.len()?;
    store.clear()?;

    println!("Removed {} cached translations.", removed);
    Ok(())
}

/// Diagnoses configuration problems.
pub async fn doctor(config: &Config) -> TranslatorResult<()> {
    println!("Diagnosing deepl-scraper configuration...\n");

    let mut issues: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    match config.validate() {
        Ok(()) => println!("✓ Configuration is valid"),
        Err(e) => issues.push(e.to_string()),
    }

    match BrowserProvider::from_config(&config.browser) {
        Ok(provider) => {
            println!("✓ Selector '{}' is valid CSS", config.browser.selector);
            if provider.is_available().await {
                println!(
                    "✓ Browser is available (command: {})",
                    provider.command()
                );
            } else {
                issues.push(format!(
                    "Browser not found (expected command: {})",
                    provider.command()
                ));
            }
        }
        Err(e) => issues.push(e.to_string()),
    }

    if !config.cache.enabled {
        warnings.push("Caching is disabled; every request reaches the provider".to_string());
    } else {
        match TranslationStore::from_config(&config.cache) {
            Ok(store) => {
                let size = store.len().unwrap_or(0);
                println!(
                    "✓ Cache is usable ({} entries at {})",
                    size,
                    config.cache.storage_path.display()
                );
            }
            Err(e) => issues.push(format!("Cache cannot be opened: {}", e)),
        }
    }

    println!();
    if issues.is_empty() && warnings.is_empty() {
        println!("✓ All good! deepl-scraper is ready to use.");
    } else {
        if !warnings.is_empty() {
            println!("Warnings:");
            for warning in warnings {
                println!("  ⚠ {}", warning);
            }
        }
        if !issues.is_empty() {
            println!("Problems:");
            for issue in issues {
                println!("  ✗ {}", issue);
            }
        }
    }

    Ok(())
}

/// Shows version.
pub fn version() {
    println!("deepl-scraper {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Cached, rate-limit aware translation retrieval");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> Config {
        let mut config = Config::default_config();
        config.cache.storage_path = ":memory:".into();
        config
    }

    #[tokio::test]
    async fn test_version() {
        version();
    }

    #[tokio::test]
    async fn test_doctor() {
        let mut config = memory_config();
        config.browser.command = "definitely-not-a-browser-xyz".to_string();
        let result = doctor(&config).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_init_writes_config_and_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        init(Some(dir.path().to_path_buf())).await.unwrap();

        let config = Config::load(dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(
            config.cache.storage_path,
            dir.path().join(DATA_DIR).join("translation_memory.db")
        );

        let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert!(gitignore.contains(".deepl-scraper/"));
    }

    #[test]
    fn test_gitignore_not_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "target/\n.deepl-scraper/\n").unwrap();

        update_gitignore(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content.matches(".deepl-scraper").count(), 1);
    }

    #[tokio::test]
    async fn test_cache_commands_on_memory_store() {
        let config = memory_config();
        assert!(cache_stats(&config).await.is_ok());
        assert!(cache_list(5, &config).await.is_ok());
        assert!(cache_clear(&config).await.is_ok());
    }
}
