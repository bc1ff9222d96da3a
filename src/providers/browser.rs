//! Provider backed by a headless browser.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::time::Duration;
use tokio::process::Command;

use super::base::TranslationProvider;
use super::extract::{extract_translation, validate_selector};
use crate::types::config::BrowserConfig;
use crate::types::errors::ProviderError;
use crate::types::requests::TranslationRequest;
use crate::TranslatorResult;

/// Extra time granted to the browser process beyond the render budget.
const PROCESS_GRACE: Duration = Duration::from_secs(5);

/// Renders the translator page in a headless Chromium-family browser and
/// extracts the translation from the dumped DOM.
///
/// Each call spawns its own browser process, so concurrent calls are safe.
pub struct BrowserProvider {
    command_name: String,
    args: Vec<String>,
    base_url: String,
    selector: String,
    user_agent: Option<String>,
    timeout: Duration,
}

impl BrowserProvider {
    /// Creates a provider with default settings.
    pub fn new() -> Self {
        Self::from_settings(&BrowserConfig::default())
    }

    /// Creates a provider from the TOML configuration.
    ///
    /// Fails when the configured selector is not valid CSS.
    pub fn from_config(config: &BrowserConfig) -> TranslatorResult<Self> {
        validate_selector(&config.selector)?;
        Ok(Self::from_settings(config))
    }

    fn from_settings(config: &BrowserConfig) -> Self {
        Self {
            command_name: config.command.clone(),
            args: config.args.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            selector: config.selector.clone(),
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Sets the render timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured browser command.
    pub fn command(&self) -> &str {
        &self.command_name
    }

    /// Builds the page URL for a request.
    pub fn page_url(&self, request: &TranslationRequest) -> String {
        format!(
            "{}#{}/{}/{}",
            self.base_url,
            request.source_lang,
            request.target_lang,
            utf8_percent_encode(&request.text, NON_ALPHANUMERIC)
        )
    }

    fn build_command(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.command_name);
        for arg in &self.args {
            cmd.arg(arg);
        }
        if let Some(ua) = &self.user_agent {
            cmd.arg(format!("--user-agent={}", ua));
        }
        cmd.arg(format!("--virtual-time-budget={}", self.timeout.as_millis()))
            .arg("--dump-dom")
            .arg(url)
            .kill_on_drop(true);
        cmd
    }
}

impl Default for BrowserProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationProvider for BrowserProvider {
    fn name(&self) -> &str {
        "browser"
    }

    async fn fetch(&self, request: &TranslationRequest) -> Result<String, ProviderError> {
        let url = self.page_url(request);
        tracing::debug!(command = %self.command_name, %url, "Rendering translator page");

        let result =
            tokio::time::timeout(self.timeout + PROCESS_GRACE, self.build_command(&url).output())
                .await;

        match result {
            Ok(Ok(output)) => {
                if output.status.success() {
                    let html = String::from_utf8_lossy(&output.stdout);
                    extract_translation(&html, &self.selector)
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(ProviderError::new(format!(
                        "{} exited with {}: {}",
                        self.command_name,
                        output.status,
                        stderr.trim()
                    )))
                }
            }
            Ok(Err(e)) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Err(ProviderError::new(format!(
                        "browser command '{}' not found",
                        self.command_name
                    )))
                } else {
                    Err(ProviderError::new(format!(
                        "failed to run '{}': {}",
                        self.command_name, e
                    )))
                }
            }
            Err(_) => Err(ProviderError::new(format!(
                "translation not visible after {}s",
                self.timeout.as_secs()
            ))),
        }
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.command_name)
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}
