/*!
 * Whole-run scenarios: timed cancellation, retries across batches and re-runs
 */

use std::time::Duration;

use gemsrt::app_config::FailurePolicy;
use gemsrt::language_utils::TargetLanguage;
use gemsrt::providers::mock::{MockOutcome, MockProvider};
use gemsrt::subtitle_processor::{parse_srt, serialize_srt};
use gemsrt::translation::{CancellationToken, PipelineStatus};
use gemsrt::ApiKey;

use crate::common::mock_providers::instant_pipeline;
use crate::common::{sample_entries, sample_srt};

#[tokio::test(start_paused = true)]
async fn test_cancel_after_shouldLetInFlightBatchFinish() {
    let provider = MockProvider::slow(1000);
    let mut pipeline = instant_pipeline(provider.clone(), 2, FailurePolicy::Abort);
    let cancel = CancellationToken::new();
    let timer = cancel.cancel_after(Duration::from_millis(1500));

    let status = pipeline
        .run(&sample_entries(6), TargetLanguage::French, &ApiKey::new("k"), &cancel, |_| {})
        .await
        .unwrap();
    timer.abort();

    assert_eq!(status, PipelineStatus::Stopped);
    assert_eq!(provider.request_count(), 2);
    assert_eq!(pipeline.results().len(), 4);
    assert_eq!(pipeline.state().progress_percent, 67);
}

#[tokio::test]
async fn test_rate_limits_inLaterBatch_shouldNotReorderResults() {
    let provider = MockProvider::working().with_script([
        MockOutcome::Translate,
        MockOutcome::RateLimited,
        MockOutcome::RateLimited,
        MockOutcome::Translate,
    ]);
    let mut pipeline = instant_pipeline(provider.clone(), 3, FailurePolicy::Abort);
    let entries = parse_srt(&sample_srt(7));

    let status = pipeline
        .run(&entries, TargetLanguage::Spanish, &ApiKey::new("k"), &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(status, PipelineStatus::Completed);
    assert_eq!(provider.request_count(), 5);
    let ids: Vec<&str> = pipeline.results().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6", "7"]);
    assert_eq!(parse_srt(&pipeline.to_srt()), pipeline.results());
}

#[tokio::test]
async fn test_exhausted_rate_limit_withAbort_shouldFailRun() {
    let mut pipeline = instant_pipeline(MockProvider::rate_limited(), 5, FailurePolicy::Abort);

    let result = pipeline
        .run(&sample_entries(5), TargetLanguage::German, &ApiKey::new("k"), &CancellationToken::new(), |_| {})
        .await;

    assert!(result.is_err());
    let state = pipeline.state();
    assert_eq!(pipeline.status(), PipelineStatus::Failed);
    assert!(state.last_error.as_deref().unwrap().contains("Gave up after 4 attempts"));
}

#[tokio::test]
async fn test_rerun_afterStop_shouldTranslateEverythingAgain() {
    let provider = MockProvider::working();
    let mut pipeline = instant_pipeline(provider.clone(), 2, FailurePolicy::Abort);
    let entries = sample_entries(4);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let first = pipeline
        .run(&entries, TargetLanguage::English, &ApiKey::new("k"), &cancel, |_| {})
        .await
        .unwrap();
    assert_eq!(first, PipelineStatus::Stopped);

    let second = pipeline
        .run(&entries, TargetLanguage::English, &ApiKey::new("k"), &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(second, PipelineStatus::Completed);
    assert_eq!(serialize_srt(pipeline.results()).matches("[English]").count(), 4);
    assert_eq!(provider.request_count(), 2);
}
