/*!
 * Tests for configuration loading, defaults and validation
 */

use anyhow::Result;
use std::time::Duration;

use gemsrt::app_config::{ApiKey, Config, FailurePolicy, LogLevel, TranslationCommonConfig};
use gemsrt::language_utils::TargetLanguage;
use gemsrt::translation::{PipelineOptions, RetryPolicy};

use crate::common::{create_temp_dir, create_test_file};

#[test]
fn test_default_config_shouldMatchDocumentedValues() {
    let config = Config::default();

    assert_eq!(config.target_language, TargetLanguage::Indonesian);
    assert_eq!(config.batch_size, 10);
    assert_eq!(config.translation.model, "gemini-3-flash-preview");
    assert_eq!(config.translation.timeout_secs, 120);
    assert!(config.translation.api_key.is_blank());
    assert_eq!(config.log_level, LogLevel::Info);

    let common = &config.translation.common;
    assert_eq!(common.throttle_delay(), Duration::from_secs(2));
    assert_eq!(common.rate_limit_backoff(), Duration::from_secs(5));
    assert_eq!(common.retry_count, 3);
    assert_eq!(common.failure_policy, FailurePolicy::Abort);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.batch_size, 10);
    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.translation.endpoint, config.translation.endpoint);
    Ok(())
}

#[test]
fn test_load_or_create_withPartialFile_shouldFillDefaults() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "target_language": "ja",
            "batch_size": 15,
            "translation": { "common": { "failure_policy": "retry_until_cancelled" } },
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.target_language, TargetLanguage::Japanese);
    assert_eq!(config.batch_size, 15);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.translation.common.failure_policy, FailurePolicy::RetryUntilCancelled);
    assert_eq!(config.translation.common.retry_count, 3);
    assert_eq!(config.translation.model, "gemini-3-flash-preview");
    Ok(())
}

#[test]
fn test_load_or_create_withUnknownLanguage_shouldFail() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = create_test_file(dir.path(), "conf.json", r#"{ "target_language": "Klingon" }"#)?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

#[test]
fn test_save_shouldWriteLanguageAsDisplayName() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = dir.path().join("conf.json");
    let mut config = Config::default();
    config.target_language = TargetLanguage::Korean;

    config.save(&path)?;

    let written = std::fs::read_to_string(&path)?;
    assert!(written.contains("\"target_language\": \"Korean\""));
    Ok(())
}

#[test]
fn test_validate_withInvalidValues_shouldFail() {
    let mut config = Config::default();
    config.batch_size = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.model = " ".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.common.temperature = 3.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withoutApiKey_shouldStillPass() {
    let mut config = Config::default();
    config.translation.api_key = ApiKey::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_without_delays_shouldZeroEveryDelay() {
    let common = TranslationCommonConfig::without_delays();
    let policy = RetryPolicy::from_config(&common);

    assert_eq!(policy.throttle_delay, Duration::ZERO);
    assert_eq!(policy.retry_delay, Duration::ZERO);
    assert_eq!(policy.max_attempts(), 4);
    assert_eq!(common.stuck_batch_delay(), Duration::ZERO);
}

#[test]
fn test_pipeline_options_from_config_shouldCopyBatchSettings() {
    let mut config = Config::default();
    config.batch_size = 15;
    config.translation.common.failure_policy = FailurePolicy::RetryUntilCancelled;

    let options = PipelineOptions::from_config(&config);

    assert_eq!(options.batch_size, 15);
    assert_eq!(options.failure_policy, FailurePolicy::RetryUntilCancelled);
    assert_eq!(options.stuck_batch_delay, Duration::from_secs(5));
}

#[test]
fn test_config_debug_shouldNotLeakApiKey() {
    let mut config = Config::default();
    config.translation.api_key = ApiKey::new("AIzaVerySecret");
    assert!(!format!("{:?}", config).contains("AIzaVerySecret"));
}
