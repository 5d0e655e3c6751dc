/*!
 * Tests for single-batch translation through the mock provider
 */

use std::time::Duration;

use gemsrt::errors::{ProviderError, TranslationError};
use gemsrt::providers::mock::{MockOutcome, MockProvider};
use gemsrt::subtitle_processor::SubtitleEntry;
use gemsrt::translation::core::apply_translations;
use gemsrt::translation::{CancellationToken, RetryPolicy, TranslationService};
use gemsrt::ApiKey;

use crate::common::mock_providers::instant_service;
use crate::common::sample_entries;

fn key() -> ApiKey {
    ApiKey::new("test-key")
}

fn two_entries() -> Vec<SubtitleEntry> {
    vec![
        SubtitleEntry::new("1", "00:00:01,000 --> 00:00:02,000", "a"),
        SubtitleEntry::new("2", "00:00:03,000 --> 00:00:04,000", "b"),
    ]
}

#[tokio::test]
async fn test_translate_batch_withMockedReply_shouldMapPositionally() {
    let provider = MockProvider::working().with_script([MockOutcome::Reply(r#"["A","B"]"#.to_string())]);
    let service = instant_service(provider);
    let batch = two_entries();

    let texts = service.translate_batch(&batch, "French", &key(), &CancellationToken::new()).await.unwrap();
    let translated = apply_translations(&batch, texts);

    assert_eq!(translated[0], batch[0].with_text("A"));
    assert_eq!(translated[1], batch[1].with_text("B"));
}

#[tokio::test]
async fn test_translate_batch_withShortReply_shouldFallBackToSourceText() {
    let service = instant_service(MockProvider::short());
    let batch = sample_entries(3);

    let texts = service.translate_batch(&batch, "German", &key(), &CancellationToken::new()).await.unwrap();

    assert_eq!(texts, vec!["[German] line 1", "[German] line 2", "line 3"]);
}

#[tokio::test]
async fn test_translate_batch_withFencedReply_shouldStripFences() {
    let service = instant_service(MockProvider::fenced());
    let texts = service
        .translate_batch(&sample_entries(2), "Korean", &key(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(texts, vec!["[Korean] line 1", "[Korean] line 2"]);
}

#[tokio::test]
async fn test_translate_batch_withTwoRateLimits_shouldSucceedOnThirdCall() {
    let provider = MockProvider::rate_limited_then_working(2);
    let service = instant_service(provider.clone());

    let texts = service
        .translate_batch(&two_entries(), "Japanese", &key(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(texts, vec!["[Japanese] a", "[Japanese] b"]);
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_translate_batch_withPermanentRateLimit_shouldGiveUpAfterFourAttempts() {
    let provider = MockProvider::rate_limited();
    let service = instant_service(provider.clone());

    let err = service
        .translate_batch(&two_entries(), "Japanese", &key(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TranslationError::RetriesExhausted { attempts: 4, last_error: ProviderError::RateLimitExceeded(_) }
    ));
    assert_eq!(provider.request_count(), 4);
}

#[tokio::test]
async fn test_translate_batch_withAuthFailure_shouldNotRetry() {
    let provider = MockProvider::working().with_script([MockOutcome::AuthFailure]);
    let service = instant_service(provider.clone());

    let err = service
        .translate_batch(&two_entries(), "Spanish", &key(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_authentication());
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_batch_withMalformedReply_shouldFailWithoutRetry() {
    let provider = MockProvider::working().with_script([MockOutcome::Reply("Sorry, I cannot help.".to_string())]);
    let service = instant_service(provider.clone());

    let err = service
        .translate_batch(&two_entries(), "Spanish", &key(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TranslationError::Provider(ProviderError::ParseError(_))));
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_batch_withServerError_shouldNotRetry() {
    let provider = MockProvider::failing();
    let service = instant_service(provider.clone());

    let err = service
        .translate_batch(&two_entries(), "Spanish", &key(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TranslationError::Provider(ProviderError::ApiError { status_code: 500, .. })));
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_batch_withCancelledToken_shouldNotCallProvider() {
    let provider = MockProvider::working();
    let service = instant_service(provider.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = service.translate_batch(&two_entries(), "Arabic", &key(), &cancel).await.unwrap_err();

    assert!(matches!(err, TranslationError::Cancelled));
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_translate_batch_shouldThrottleBeforeEveryAttempt() {
    let provider = MockProvider::rate_limited_then_working(1);
    let policy = RetryPolicy::new(3, Duration::from_secs(2), Duration::from_secs(5));
    let service = TranslationService::new(provider.clone(), policy);
    let started = tokio::time::Instant::now();

    service
        .translate_batch(&two_entries(), "French", &key(), &CancellationToken::new())
        .await
        .unwrap();

    // 2s throttle, 5s backoff, 2s throttle
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(9), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(10), "elapsed {:?}", elapsed);
    assert_eq!(provider.request_count(), 2);
}

#[test]
fn test_translate_batch_fromBlockingContext_shouldWork() {
    let service = instant_service(MockProvider::working());

    let texts = tokio_test::assert_ok!(tokio_test::block_on(service.translate_batch(
        &two_entries(),
        "English",
        &key(),
        &CancellationToken::new(),
    )));

    assert_eq!(texts, vec!["[English] a", "[English] b"]);
}
