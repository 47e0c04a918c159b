//! Configuration loading and validation for moodsheet.
//!
//! The configuration is a TOML file with four sections: `[llm]` (also
//! accepted as `[openai]`), `[prompt]`, `[excel]` and `[logging]`. It is
//! loaded and validated once at startup; afterwards the only change allowed
//! is the command-line log level override.

use anyhow::{Context, Result};
use moodsheet_logging::{LogLevel, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main moodsheet configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodsheetConfig {
    #[serde(alias = "openai")]
    pub llm: LlmConfig,
    pub prompt: PromptConfig,
    pub excel: ExcelConfig,
    pub logging: LoggingConfig,
}

/// Chat-completion endpoint and request parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// API root, e.g. "https://api.openai.com/v1"
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Total attempts per row, including the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Seconds to wait between attempts
    #[serde(default = "default_retry_interval")]
    pub retry_interval: f64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_interval() -> f64 {
    1.0
}

impl LlmConfig {
    /// `base_url` joined with the chat completions path.
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptConfig {
    /// Sent as the `system` message.
    pub system_prompt: String,
    /// Prefix of the `user` message, before the numbered contents.
    pub static_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExcelConfig {
    /// Columns fed to the model, in prompt order.
    pub content_columns: Vec<String>,
    /// Header of the column receiving the labels.
    #[serde(default = "default_output_column")]
    pub output_column: String,
}

fn default_output_column() -> String {
    "sentiment".to_string()
}

impl MoodsheetConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: MoodsheetConfig = toml::from_str(contents).context("parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() {
            anyhow::bail!("llm.api_key is empty; set it in the config file");
        }
        if self.llm.model.trim().is_empty() {
            anyhow::bail!("llm.model is empty");
        }
        if self.llm.max_retries < 1 {
            anyhow::bail!("llm.max_retries must be at least 1");
        }
        if !self.llm.retry_interval.is_finite() || self.llm.retry_interval < 0.0 {
            anyhow::bail!(
                "llm.retry_interval must be a non-negative number of seconds, got {}",
                self.llm.retry_interval
            );
        }
        Duration::try_from_secs_f64(self.llm.retry_interval).with_context(|| {
            format!(
                "llm.retry_interval of {} seconds is too large",
                self.llm.retry_interval
            )
        })?;
        if self.llm.timeout == 0 {
            anyhow::bail!("llm.timeout must be greater than zero");
        }
        if self.excel.content_columns.is_empty() {
            anyhow::bail!("excel.content_columns must name at least one column");
        }
        if self.excel.output_column.trim().is_empty() {
            anyhow::bail!("excel.output_column is empty");
        }
        Ok(())
    }

    /// The single permitted override: log verbosity from the command line.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.logging = self.logging.with_level(level);
        self
    }
}

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<MoodsheetConfig> {
    let path = path.as_ref();
    if !path.exists() {
        anyhow::bail!("config file {} does not exist", path.display());
    }
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("read config {path:?}"))?;
    MoodsheetConfig::from_toml_str(&contents)
        .with_context(|| format!("load config {}", path.display()))
}
