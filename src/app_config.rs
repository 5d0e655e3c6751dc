use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::language_utils::TargetLanguage;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language the subtitles are translated into
    #[serde(default)]
    pub target_language: TargetLanguage,

    /// Number of subtitle entries sent in one request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// API credential for the generative-language service
///
/// The value is never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for placing in a request header
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True when no usable key is present
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_blank() {
            f.write_str("ApiKey(<empty>)")
        } else {
            f.write_str("ApiKey(<redacted>)")
        }
    }
}

/// What the pipeline does when a batch fails after the client's own retries
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the run and report the error
    #[default]
    Abort,
    /// Keep retrying the stuck batch until it succeeds or the run is cancelled
    RetryUntilCancelled,
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the generative-language API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key; usually supplied through the command line or environment instead
    #[serde(default)]
    pub api_key: ApiKey,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Request pacing and retry settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Delay in milliseconds before every request attempt
    #[serde(default = "default_throttle_delay_ms")]
    pub throttle_delay_ms: u64,

    /// Delay in milliseconds before retrying a rate-limited request
    #[serde(default = "default_rate_limit_backoff_ms")]
    pub rate_limit_backoff_ms: u64,

    /// Retry count for rate-limited requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Temperature parameter for text generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Behaviour when a batch fails for good
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Delay in milliseconds before the pipeline re-tries a stuck batch
    #[serde(default = "default_stuck_batch_delay_ms")]
    pub stuck_batch_delay_ms: u64,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            throttle_delay_ms: default_throttle_delay_ms(),
            rate_limit_backoff_ms: default_rate_limit_backoff_ms(),
            retry_count: default_retry_count(),
            temperature: default_temperature(),
            failure_policy: FailurePolicy::default(),
            stuck_batch_delay_ms: default_stuck_batch_delay_ms(),
        }
    }
}

impl TranslationCommonConfig {
    /// Settings with every delay set to zero, for tests and dry runs
    pub fn without_delays() -> Self {
        Self {
            throttle_delay_ms: 0,
            rate_limit_backoff_ms: 0,
            stuck_batch_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn throttle_delay(&self) -> Duration {
        Duration::from_millis(self.throttle_delay_ms)
    }

    pub fn rate_limit_backoff(&self) -> Duration {
        Duration::from_millis(self.rate_limit_backoff_ms)
    }

    pub fn stuck_batch_delay(&self) -> Duration {
        Duration::from_millis(self.stuck_batch_delay_ms)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_batch_size() -> usize {
    10
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_throttle_delay_ms() -> u64 {
    2000
}

fn default_rate_limit_backoff_ms() -> u64 {
    5000
}

fn default_retry_count() -> u32 {
    3
}

fn default_temperature() -> f32 {
    0.3
}

fn default_stuck_batch_delay_ms() -> u64 {
    5000
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            api_key: ApiKey::default(),
            timeout_secs: default_timeout_secs(),
            common: TranslationCommonConfig::default(),
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: TargetLanguage::default(),
            batch_size: default_batch_size(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load a configuration file, or write the defaults there if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            log::warn!("Config file not found at '{}', creating default config.", path.display());
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    ///
    /// A missing API key is not checked here: the pipeline rejects it when a
    /// run starts.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(anyhow!("Batch size must be at least 1"));
        }

        if self.translation.model.trim().is_empty() {
            return Err(anyhow!("Model name cannot be empty"));
        }

        Url::parse(&self.translation.endpoint)
            .with_context(|| format!("Invalid API endpoint: {}", self.translation.endpoint))?;

        let temperature = self.translation.common.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(anyhow!("Temperature must be between 0.0 and 2.0, got {}", temperature));
        }

        Ok(())
    }
}
