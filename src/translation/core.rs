/*!
 * Core translation service implementation.
 *
 * This module contains the `TranslationService`, which turns one batch of
 * subtitle entries into one provider request and returns the translations
 * positionally aligned with the batch.
 */

use std::time::Instant;

use log::{debug, info};

use crate::app_config::{ApiKey, TranslationConfig};
use crate::errors::{ProviderError, TranslationError};
use crate::providers::Provider;
use crate::providers::gemini::Gemini;
use crate::subtitle_processor::SubtitleEntry;
use super::cancel::CancellationToken;
use super::prompts::TranslationPrompt;
use super::response::{align_translations, parse_translations};
use super::retry::RetryPolicy;

/// Translation client for a single provider
#[derive(Debug)]
pub struct TranslationService<P: Provider> {
    /// Provider implementation
    provider: P,

    /// Pacing and retry rules applied to every request
    retry: RetryPolicy,
}

impl TranslationService<Gemini> {
    /// Create a Gemini-backed service from the translation config
    pub fn from_config(config: &TranslationConfig) -> Result<Self, ProviderError> {
        Ok(Self::new(Gemini::from_config(config)?, RetryPolicy::from_config(&config.common)))
    }
}

impl<P: Provider> TranslationService<P> {
    pub fn new(provider: P, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Translate the text of every entry in `batch`
    ///
    /// Only the `text` of each entry is sent. The result has exactly one
    /// string per entry, in batch order; positions the service left out or
    /// blank keep their source text.
    ///
    /// # Arguments
    /// * `batch` - Entries to translate
    /// * `target_language` - Display name of the target language, e.g. "Japanese"
    /// * `api_key` - Credential for the remote service
    /// * `cancel` - Checked after every wait
    pub async fn translate_batch(
        &self,
        batch: &[SubtitleEntry],
        target_language: &str,
        api_key: &ApiKey,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, TranslationError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let sources: Vec<String> = batch.iter().map(|entry| entry.text.clone()).collect();
        let prompt = TranslationPrompt::new(target_language, sources);
        let started = Instant::now();
        let request_prompt = &prompt;

        let translations = self.retry.run(cancel, |attempt| {
            let request = self.provider.build_request(request_prompt);
            async move {
                debug!("Requesting {} translations (attempt {})", request_prompt.len(), attempt);
                let response = self.provider.complete(request, api_key).await?;
                parse_translations(&P::extract_text(&response))
            }
        }).await?;

        info!(
            "Translated {} lines into {} in {:.1}s",
            prompt.len(),
            target_language,
            started.elapsed().as_secs_f64()
        );

        Ok(align_translations(&prompt.source_texts, translations))
    }

    /// Translate a batch and return copies of its entries carrying the translations
    pub async fn translate_entries(
        &self,
        batch: &[SubtitleEntry],
        target_language: &str,
        api_key: &ApiKey,
        cancel: &CancellationToken,
    ) -> Result<Vec<SubtitleEntry>, TranslationError> {
        let texts = self.translate_batch(batch, target_language, api_key, cancel).await?;
        Ok(apply_translations(batch, texts))
    }
}

/// Pair entries with their translations, keeping id and timestamp
pub fn apply_translations(batch: &[SubtitleEntry], texts: Vec<String>) -> Vec<SubtitleEntry> {
    batch.iter()
        .zip(texts)
        .map(|(entry, text)| entry.with_text(text))
        .collect()
}
