// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use gemsrt::app_config::{ApiKey, Config, LogLevel};
use gemsrt::app_controller::{Controller, Replacement, RunOptions};
use gemsrt::language_utils::TargetLanguage;

// @const: Environment variable holding the API key
const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate SRT subtitles (default command)
    Translate(TranslateArgs),

    /// List the supported target languages
    Languages,

    /// Generate shell completions for gemsrt
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct TranslateArgs {
    /// Input .srt file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Target language name or code (e.g. 'Japanese', 'ja')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Number of subtitle entries per request
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// API key for the generative-language service [env: GEMINI_API_KEY]
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Output file, or output directory for folder input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the translated subtitles instead of writing a file
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Replace the translation of one entry before export (1-based POS=TEXT)
    #[arg(long = "replace", value_name = "POS=TEXT")]
    replacements: Vec<Replacement>,

    /// Stop the run after this many seconds, keeping what was translated
    #[arg(long, value_name = "SECS")]
    max_duration: Option<u64>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// gemsrt - batch SRT subtitle translation with Gemini
#[derive(Parser, Debug)]
#[command(name = "gemsrt")]
#[command(version)]
#[command(about = "Batch SRT subtitle translation with Gemini")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "gemsrt sends the lines of an SRT file to the Gemini API in batches and writes the translated file.

EXAMPLES:
    gemsrt movie.srt                            # Translate into the configured language
    gemsrt -t Japanese -b 15 movie.srt          # Japanese, 15 lines per request
    gemsrt --stdout movie.srt > out.srt         # Print instead of writing translated_movie.srt
    gemsrt --replace 12='Sampai jumpa!' movie.srt
    gemsrt -f --log-level debug /subtitles/     # Every .srt below a directory
    gemsrt languages                            # List target languages
    gemsrt completions bash > gemsrt.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. The API key is read from --api-key or the
    GEMINI_API_KEY environment variable.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Everything is let through the logger; the max level does the filtering
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "gemsrt", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Languages) => {
            for language in TargetLanguage::ALL {
                println!(
                    "{:<4} {:<12} {}",
                    language.code(),
                    language.display_name(),
                    language.autonym().unwrap_or("")
                );
            }
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => run_translate(cli.translate).await,
    }
}

// @loads: Config file with command line overrides applied
fn load_config(args: &TranslateArgs) -> Result<Config> {
    let mut config = Config::load_or_create(&args.config_path)?;

    if let Some(target_language) = &args.target_language {
        config.target_language = target_language.parse::<TargetLanguage>()?;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(model) = &args.model {
        config.translation.model = model.clone();
    }
    if let Some(api_key) = args.api_key.clone().or_else(|| std::env::var(API_KEY_ENV).ok()) {
        config.translation.api_key = ApiKey::new(api_key.trim());
    }
    if let Some(log_level) = &args.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let input_path = args.input_path.clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required (see --help)"))?;

    // Command line level applies before the config is read
    if let Some(level) = &args.log_level {
        let level: LogLevel = level.clone().into();
        log::set_max_level(LevelFilter::from(&level));
    }

    let config = load_config(&args)?;
    log::set_max_level(LevelFilter::from(&config.log_level));

    info!(
        "gemsrt: {} into {} ({} lines per request)",
        config.translation.model,
        config.target_language,
        config.batch_size
    );

    let options = RunOptions {
        output: args.output.clone(),
        to_stdout: args.stdout,
        force_overwrite: args.force_overwrite,
        replacements: args.replacements.clone(),
        max_duration: args.max_duration.map(Duration::from_secs),
    };

    if !input_path.exists() {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    let mut controller = Controller::with_config(config)?;
    controller.run(input_path, options).await
}
