/*!
 * Batch translation of subtitle entries.
 *
 * This module is split into several submodules:
 *
 * - `batch`: Splitting entries into fixed-size batches
 * - `prompts`: System instruction and request content
 * - `response`: Cleaning and aligning model replies
 * - `retry`: Fixed-delay bounded retry for rate-limited calls
 * - `cancel`: Cooperative cancellation token
 * - `core`: Translation service for a single batch
 * - `pipeline`: Sequential run over all batches with progress and stop support
 */

// Re-export main types for easier usage
pub use self::cancel::CancellationToken;
pub use self::core::TranslationService;
pub use self::pipeline::{PipelineOptions, PipelineState, PipelineStatus, TranslationPipeline};
pub use self::prompts::TranslationPrompt;
pub use self::retry::RetryPolicy;

// Submodules
pub mod batch;
pub mod cancel;
pub mod core;
pub mod pipeline;
pub mod prompts;
pub mod response;
pub mod retry;
