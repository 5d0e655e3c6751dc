/*!
 * Batch translation pipeline.
 *
 * `TranslationPipeline` owns the state of one translation run: it splits the
 * entries into batches, sends them one after another through the
 * `TranslationService`, accumulates the translated entries and publishes a
 * `PipelineState` snapshot after every change.
 *
 * Batches are strictly sequential. Cancellation is cooperative: the token is
 * checked before each batch and after every wait, and whatever has been
 * translated so far is kept.
 */

use std::fmt;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::app_config::{ApiKey, Config, FailurePolicy};
use crate::errors::{PipelineError, TranslationError};
use crate::language_utils::TargetLanguage;
use crate::providers::Provider;
use crate::subtitle_processor::{normalize_cue_text, serialize_srt, SubtitleEntry};
use super::batch::chunk_entries;
use super::cancel::CancellationToken;
use super::core::TranslationService;

/// Message recorded when a run is cancelled
pub const STOPPED_BY_USER: &str = "Translation stopped by user";

/// Observable state of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineState {
    /// A run is in progress
    pub running: bool,
    /// 0..=100
    pub progress_percent: u8,
    /// Number of batches of the current run
    pub total_batches: usize,
    /// Number of batches translated so far
    pub current_batch_index: usize,
    /// Last failure, or the stop message
    pub last_error: Option<String>,
    /// The result is final and ready for export
    pub completed: bool,
}

/// Lifecycle stage derived from a `PipelineState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Idle,
    Running,
    Completed,
    Failed,
    Stopped,
}

impl PipelineState {
    pub fn status(&self) -> PipelineStatus {
        match (self.running, self.completed, self.last_error.is_some()) {
            (true, _, _) => PipelineStatus::Running,
            (false, true, false) => PipelineStatus::Completed,
            (false, true, true) => PipelineStatus::Stopped,
            (false, false, true) => PipelineStatus::Failed,
            (false, false, false) => PipelineStatus::Idle,
        }
    }

    /// Whether the last run has ended, one way or another
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status(),
            PipelineStatus::Completed | PipelineStatus::Failed | PipelineStatus::Stopped
        )
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStatus::Idle => "idle",
            PipelineStatus::Running => "running",
            PipelineStatus::Completed => "completed",
            PipelineStatus::Failed => "failed",
            PipelineStatus::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Per-run settings of the pipeline
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Entries per batch, must be positive
    pub batch_size: usize,
    /// What to do when a batch fails for good
    pub failure_policy: FailurePolicy,
    /// Wait before re-trying a stuck batch under `RetryUntilCancelled`
    pub stuck_batch_delay: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.batch_size,
            failure_policy: config.translation.common.failure_policy,
            stuck_batch_delay: config.translation.common.stuck_batch_delay(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }
}

/// Percentage of `done` out of `total`, rounded to the nearest integer
pub fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (done as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Sequential batch translation controller
#[derive(Debug)]
pub struct TranslationPipeline<P: Provider> {
    service: TranslationService<P>,
    options: PipelineOptions,
    state: PipelineState,
    results: Vec<SubtitleEntry>,
}

impl<P: Provider> TranslationPipeline<P> {
    pub fn new(service: TranslationService<P>, options: PipelineOptions) -> Self {
        Self {
            service,
            options,
            state: PipelineState::default(),
            results: Vec::new(),
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn status(&self) -> PipelineStatus {
        self.state.status()
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn service(&self) -> &TranslationService<P> {
        &self.service
    }

    /// Entries translated so far, in input order
    pub fn results(&self) -> &[SubtitleEntry] {
        &self.results
    }

    pub fn into_results(self) -> Vec<SubtitleEntry> {
        self.results
    }

    /// Back to `Idle`, dropping any accumulated result
    pub fn reset(&mut self) {
        self.state = PipelineState::default();
        self.results.clear();
    }

    /// Replace the text of one translated entry
    ///
    /// `index` is the 0-based position in `results()`. The text is cleaned
    /// with `normalize_cue_text`; text that ends up empty is rejected, since an
    /// SRT cue without dialogue does not survive export. The pipeline state is
    /// left as it is and nothing is re-translated.
    pub fn edit_entry(&mut self, index: usize, text: impl AsRef<str>) -> Result<(), PipelineError> {
        let len = self.results.len();
        let entry = self.results
            .get_mut(index)
            .ok_or(PipelineError::EntryOutOfRange { index, len })?;
        let text = normalize_cue_text(text.as_ref());
        if text.is_empty() {
            return Err(PipelineError::EmptyEntryText { index });
        }
        entry.text = text;
        debug!("Entry {} edited manually", index);
        Ok(())
    }

    /// Current result as SRT text
    pub fn to_srt(&self) -> String {
        serialize_srt(&self.results)
    }

    /// Translate `entries` batch by batch
    ///
    /// Returns the terminal status of the run: `Completed` or `Stopped`. A batch
    /// failure that ends the run leaves the pipeline `Failed` and is returned
    /// as `PipelineError::Batch`. Precondition failures are returned before
    /// anything changes.
    ///
    /// `on_progress` receives a snapshot after the run starts, after every
    /// batch, after every recorded failure and when the run ends.
    pub async fn run<F>(
        &mut self,
        entries: &[SubtitleEntry],
        target_language: TargetLanguage,
        api_key: &ApiKey,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<PipelineStatus, PipelineError>
    where
        F: FnMut(&PipelineState),
    {
        if entries.is_empty() {
            return Err(PipelineError::NoEntries);
        }
        if api_key.is_blank() {
            return Err(PipelineError::MissingCredential);
        }
        let batches = chunk_entries(entries, self.options.batch_size)?;
        let total = batches.len();

        self.reset();
        self.state.running = true;
        self.state.total_batches = total;
        info!(
            "Translating {} entries into {} in {} batches of up to {}",
            entries.len(),
            target_language,
            total,
            self.options.batch_size
        );
        on_progress(&self.state);

        for (index, batch) in batches.iter().enumerate() {
            if cancel.is_cancelled() {
                self.finish_stopped();
                on_progress(&self.state);
                return Ok(PipelineStatus::Stopped);
            }

            debug!("Batch {}/{} ({} entries)", index + 1, total, batch.len());

            let translated = loop {
                let outcome = self.service
                    .translate_entries(batch, target_language.display_name(), api_key, cancel)
                    .await;

                match outcome {
                    Ok(translated) => break translated,
                    Err(TranslationError::Cancelled) => {
                        self.finish_stopped();
                        on_progress(&self.state);
                        return Ok(PipelineStatus::Stopped);
                    }
                    Err(e) => {
                        error!("Batch {}/{} failed: {}", index + 1, total, e);
                        self.state.last_error = Some(e.to_string());

                        if self.options.failure_policy == FailurePolicy::Abort || e.is_authentication() {
                            self.state.running = false;
                            self.state.completed = false;
                            on_progress(&self.state);
                            return Err(PipelineError::Batch { batch: index + 1, source: e });
                        }

                        on_progress(&self.state);
                        warn!(
                            "Retrying batch {}/{} in {:?}",
                            index + 1,
                            total,
                            self.options.stuck_batch_delay
                        );
                        if cancel.sleep(self.options.stuck_batch_delay).await {
                            self.finish_stopped();
                            on_progress(&self.state);
                            return Ok(PipelineStatus::Stopped);
                        }
                    }
                }
            };

            self.results.extend(translated);
            self.state.current_batch_index = index + 1;
            self.state.progress_percent = progress_percent(index + 1, total);
            self.state.last_error = None;
            on_progress(&self.state);
        }

        self.state.running = false;
        self.state.completed = true;
        self.state.progress_percent = 100;
        self.state.last_error = None;
        info!("Translation completed: {} entries", self.results.len());
        on_progress(&self.state);

        Ok(PipelineStatus::Completed)
    }

    fn finish_stopped(&mut self) {
        info!(
            "Translation stopped after {}/{} batches",
            self.state.current_batch_index,
            self.state.total_batches
        );
        self.state.running = false;
        self.state.completed = true;
        self.state.last_error = Some(STOPPED_BY_USER.to_string());
    }
}
