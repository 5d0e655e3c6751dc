use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::providers::Provider;
use crate::providers::gemini::Gemini;
use crate::subtitle_processor::SubtitleCollection;
use crate::translation::{
    CancellationToken, PipelineOptions, PipelineState, PipelineStatus, TranslationPipeline,
    TranslationService,
};

// @module: Application controller for subtitle processing

/// Manual correction applied to the translated result before export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    // @field: 1-based subtitle position in the file
    pub position: usize,
    // @field: Replacement text
    pub text: String,
}

impl FromStr for Replacement {
    type Err = String;

    // @parses: `POS=TEXT`, `\n` in TEXT becomes a line break
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (position, text) = s
            .split_once('=')
            .ok_or_else(|| format!("expected POS=TEXT, got '{}'", s))?;
        let position: usize = position
            .trim()
            .parse()
            .map_err(|_| format!("invalid position '{}'", position.trim()))?;
        if position == 0 {
            return Err("positions start at 1".to_string());
        }
        Ok(Self {
            position,
            text: text.replace("\\n", "\n"),
        })
    }
}

/// How a run writes its results
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    // @field: Output file (single input) or directory (folder input)
    pub output: Option<PathBuf>,
    // @field: Print the result instead of writing a file
    pub to_stdout: bool,
    // @field: Overwrite existing outputs
    pub force_overwrite: bool,
    // @field: Manual corrections, single input only
    pub replacements: Vec<Replacement>,
    // @field: Cancel the run after this long
    pub max_duration: Option<Duration>,
}

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Result written to `path`
    Written { path: PathBuf, status: PipelineStatus },
    /// Result printed to stdout
    Printed { status: PipelineStatus },
    /// Output already existed
    Skipped { path: PathBuf },
    /// Stopped before the first batch finished; nothing was exported
    NothingTranslated,
}

impl FileOutcome {
    pub fn status(&self) -> Option<PipelineStatus> {
        match self {
            FileOutcome::Written { status, .. } | FileOutcome::Printed { status } => Some(*status),
            FileOutcome::NothingTranslated => Some(PipelineStatus::Stopped),
            FileOutcome::Skipped { .. } => None,
        }
    }
}

/// Main application controller for subtitle translation
pub struct Controller<P: Provider = Gemini> {
    // @field: App configuration
    config: Config,
    // @field: Pipeline reused for every file
    pipeline: TranslationPipeline<P>,
    // @field: Progress bars
    multi_progress: MultiProgress,
}

impl Controller<Gemini> {
    // @method: Create a controller talking to the configured Gemini endpoint
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let service = TranslationService::from_config(&config.translation)
            .context("Failed to create the Gemini client")?;
        let pipeline = TranslationPipeline::new(service, PipelineOptions::from_config(&config));
        Ok(Self::with_pipeline(config, pipeline))
    }
}

impl<P: Provider> Controller<P> {
    // @method: Create a controller around an existing pipeline
    pub fn with_pipeline(config: Config, pipeline: TranslationPipeline<P>) -> Self {
        Self {
            config,
            pipeline,
            multi_progress: MultiProgress::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pipeline(&self) -> &TranslationPipeline<P> {
        &self.pipeline
    }

    /// Run the main workflow on a subtitle file or a directory of them
    ///
    /// Ctrl-C and `max_duration` stop the run after the current request;
    /// whatever was translated up to then is still exported.
    pub async fn run(&mut self, input: PathBuf, options: RunOptions) -> Result<()> {
        let cancel = CancellationToken::new();

        let interrupt = {
            let token = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, stopping after the current request");
                    token.cancel();
                }
            })
        };
        let timer = options.max_duration.map(|limit| cancel.cancel_after(limit));

        let result = if FileManager::dir_exists(&input) {
            self.run_folder(&input, &options, &cancel).await
        } else {
            self.run_file(&input, &options, &cancel).await.map(|_| ())
        };

        interrupt.abort();
        if let Some(timer) = timer {
            timer.abort();
        }

        result
    }

    /// Translate a single subtitle file
    pub async fn run_file(&mut self, input_file: &Path, options: &RunOptions, cancel: &CancellationToken) -> Result<FileOutcome> {
        let start_time = Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_path = Self::resolve_output_path(input_file, options.output.as_deref());
        if !options.to_stdout && output_path.exists() && !options.force_overwrite {
            warn!("Skipping {:?}, translation already exists (use -f to force overwrite)", input_file);
            return Ok(FileOutcome::Skipped { path: output_path });
        }

        let content = FileManager::read_to_string(input_file)?;
        let subtitles = SubtitleCollection::parse_srt_string(&content);
        if subtitles.is_empty() {
            return Err(anyhow!("No subtitle entries found in {:?}", input_file));
        }
        info!("Loaded {} entries from {:?}", subtitles.len(), input_file);

        let status = self.translate_with_progress(&subtitles, cancel).await
            .with_context(|| format!("Failed to translate {:?}", input_file))?;

        if self.pipeline.results().is_empty() {
            warn!("Stopped before any batch was translated, nothing to export for {:?}", input_file);
            return Ok(FileOutcome::NothingTranslated);
        }

        self.apply_replacements(&options.replacements);

        let translated = self.pipeline.to_srt();
        let outcome = if options.to_stdout {
            println!("{}", translated);
            FileOutcome::Printed { status }
        } else {
            FileManager::write_atomically(&output_path, &translated)?;
            info!("Success: {}", output_path.display());
            FileOutcome::Written { path: output_path, status }
        };

        info!(
            "{} in {} ({} entries)",
            status,
            Self::format_duration(start_time.elapsed()),
            self.pipeline.results().len()
        );

        Ok(outcome)
    }

    /// Translate every subtitle file below a directory
    ///
    /// A failed file is reported and the next one is attempted; a cancelled
    /// run exports the file in progress and stops.
    pub async fn run_folder(&mut self, input_dir: &Path, options: &RunOptions, cancel: &CancellationToken) -> Result<()> {
        let start_time = Instant::now();

        let files = FileManager::find_subtitle_files(input_dir)?;
        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }
        if !options.replacements.is_empty() {
            warn!("Manual replacements are ignored in folder mode");
        }

        let folder_pb = self.multi_progress.add(ProgressBar::new(files.len() as u64));
        folder_pb.set_style(Self::bar_style("files"));
        folder_pb.set_message("Processing files");

        let mut success_count = 0;
        let mut error_count = 0;
        let mut skip_count = 0;

        for file in &files {
            let file_name = file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let file_options = RunOptions {
                output: options.output.as_ref().map(|dir| Self::mirrored_dir(input_dir, file, dir)),
                replacements: Vec::new(),
                ..options.clone()
            };

            match self.run_file(file, &file_options, cancel).await {
                Ok(FileOutcome::Skipped { .. }) => skip_count += 1,
                Ok(outcome) => {
                    success_count += 1;
                    if outcome.status() == Some(PipelineStatus::Stopped) {
                        folder_pb.abandon_with_message("Stopped");
                        warn!("Folder run stopped at {}", file_name);
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to process {}: {:#}", file_name, e);
                    error_count += 1;
                }
            }
            folder_pb.inc(1);
        }

        folder_pb.finish_and_clear();
        info!(
            "Processed {} files in {}: {} translated, {} skipped, {} failed",
            files.len(),
            Self::format_duration(start_time.elapsed()),
            success_count,
            skip_count,
            error_count
        );

        if error_count > 0 && success_count == 0 {
            return Err(anyhow!("All {} files failed to translate", error_count));
        }
        Ok(())
    }

    // @runs: The pipeline with a batch progress bar
    async fn translate_with_progress(&mut self, subtitles: &SubtitleCollection, cancel: &CancellationToken) -> Result<PipelineStatus, PipelineError> {
        let progress_bar = self.multi_progress.add(ProgressBar::new(0));
        progress_bar.set_style(Self::bar_style("batches"));
        progress_bar.set_message("Translating");

        let target_language = self.config.target_language;
        let api_key = self.config.translation.api_key.clone();
        let pb = progress_bar.clone();

        let result = self.pipeline
            .run(&subtitles.entries, target_language, &api_key, cancel, move |state: &PipelineState| {
                pb.set_length(state.total_batches as u64);
                pb.set_position(state.current_batch_index as u64);
                match &state.last_error {
                    Some(message) if state.running => pb.set_message(format!("Retrying: {}", message)),
                    _ => pb.set_message("Translating"),
                }
            })
            .await;

        progress_bar.finish_and_clear();
        result
    }

    // @applies: Replacements, 1-based positions
    fn apply_replacements(&mut self, replacements: &[Replacement]) {
        for replacement in replacements {
            match self.pipeline.edit_entry(replacement.position - 1, &replacement.text) {
                Ok(()) => debug!("Replaced entry {}", replacement.position),
                Err(e) => warn!("Skipping replacement for entry {}: {}", replacement.position, e),
            }
        }
    }

    // @resolves: Output file for a single input
    fn resolve_output_path(input_file: &Path, output: Option<&Path>) -> PathBuf {
        match output {
            Some(path) if path.is_dir() => FileManager::output_path_for(input_file, Some(path)),
            Some(path) => path.to_path_buf(),
            None => FileManager::output_path_for(input_file, None),
        }
    }

    // @maps: `input_dir/sub/file.srt` to `output_dir/sub/`
    fn mirrored_dir(input_dir: &Path, file: &Path, output_dir: &Path) -> PathBuf {
        let relative_parent = file
            .parent()
            .and_then(|parent| parent.strip_prefix(input_dir).ok())
            .unwrap_or_else(|| Path::new(""));
        let dir = output_dir.join(relative_parent);
        if let Err(e) = FileManager::ensure_dir(&dir) {
            warn!("{:#}", e);
        }
        dir
    }

    fn bar_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
                unit
            ))
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
