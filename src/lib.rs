/*!
 * # gemsrt - batch SRT subtitle translation
 *
 * A Rust library for translating SRT subtitle files with the Gemini
 * generative-language API.
 *
 * ## Features
 *
 * - Parse and serialize SRT subtitles
 * - Translate subtitle text in fixed-size batches, one request per batch
 * - Self-throttling and bounded retry when the service rate limits
 * - Progress reporting, cooperative cancellation and manual corrections
 * - Fixed list of target languages backed by ISO 639 codes
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing and serialization
 * - `translation`: Batch translation:
 *   - `translation::batch`: Splitting entries into batches
 *   - `translation::core`: Translation of a single batch
 *   - `translation::retry`: Fixed-delay retry policy
 *   - `translation::pipeline`: Sequential run over all batches
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: Target language list
 * - `providers`: Client implementations for the remote API:
 *   - `providers::gemini`: Gemini API client
 *   - `providers::mock`: In-process provider for tests
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
// Test names use camelCase segments
#![cfg_attr(test, allow(non_snake_case))]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod translation;
pub mod app_controller;
pub mod language_utils;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::{ApiKey, Config, FailurePolicy};
pub use subtitle_processor::{parse_srt, serialize_srt, SubtitleCollection, SubtitleEntry};
pub use translation::{
    CancellationToken, PipelineOptions, PipelineState, PipelineStatus, RetryPolicy,
    TranslationPipeline, TranslationService,
};
pub use language_utils::TargetLanguage;
pub use errors::{AppError, PipelineError, ProviderError, TranslationError};
