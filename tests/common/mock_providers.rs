/*!
 * Builders wiring the in-process mock provider into services and pipelines
 */

use std::time::Duration;

use gemsrt::app_config::{Config, FailurePolicy};
use gemsrt::app_controller::Controller;
use gemsrt::providers::mock::MockProvider;
use gemsrt::translation::{PipelineOptions, RetryPolicy, TranslationPipeline, TranslationService};
use gemsrt::ApiKey;

/// Retry policy with the production budget and no waiting
pub fn instant_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::ZERO, Duration::ZERO)
}

/// Translation service around `provider` that never sleeps
pub fn instant_service(provider: MockProvider) -> TranslationService<MockProvider> {
    TranslationService::new(provider, instant_retry())
}

/// Pipeline options with no stuck-batch delay
pub fn instant_options(batch_size: usize, failure_policy: FailurePolicy) -> PipelineOptions {
    PipelineOptions {
        batch_size,
        failure_policy,
        stuck_batch_delay: Duration::ZERO,
    }
}

/// Pipeline around `provider` that never sleeps
pub fn instant_pipeline(
    provider: MockProvider,
    batch_size: usize,
    failure_policy: FailurePolicy,
) -> TranslationPipeline<MockProvider> {
    TranslationPipeline::new(instant_service(provider), instant_options(batch_size, failure_policy))
}

/// Config carrying a test key, suitable for a controller
pub fn test_config(batch_size: usize) -> Config {
    let mut config = Config::default();
    config.batch_size = batch_size;
    config.translation.api_key = ApiKey::new("test-key");
    config
}

/// Controller translating through `provider`
pub fn mock_controller(provider: MockProvider, batch_size: usize) -> Controller<MockProvider> {
    let config = test_config(batch_size);
    let pipeline = instant_pipeline(provider, batch_size, FailurePolicy::Abort);
    Controller::with_pipeline(config, pipeline)
}
