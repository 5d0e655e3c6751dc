/*!
 * Provider implementations for the translation backend.
 *
 * - Gemini: the generative-language `generateContent` endpoint
 * - Mock: scriptable in-process provider used by tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::app_config::ApiKey;
use crate::errors::ProviderError;
use crate::translation::prompts::TranslationPrompt;

/// Common trait for all LLM providers
///
/// This trait defines the interface that provider implementations must follow,
/// allowing the translation service to stay agnostic of the wire format.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Encode a translation prompt as a provider request
    fn build_request(&self, prompt: &TranslationPrompt) -> Self::Request;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    /// * `api_key` - Credential for this call; providers must not log it
    async fn complete(&self, request: Self::Request, api_key: &ApiKey) -> Result<Self::Response, ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

pub mod gemini;
pub mod mock;
