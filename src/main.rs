// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;

use seedloc::app_config::{self, Config, TranslationProvider};
use seedloc::app_controller::{Controller, RunOptions};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Gemini,
    Anthropic,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Gemini => TranslationProvider::Gemini,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Localize a SQL seed file into one or more locales
    Translate(TranslateArgs),

    /// Generate shell completions for seedloc
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// JSON schema export describing the tables
    #[arg(long, value_name = "SCHEMA_JSON")]
    schema: PathBuf,

    /// SQL seed file to localize
    #[arg(short, long, value_name = "INPUT_SQL")]
    input: PathBuf,

    /// Directory receiving the localized SQL and reports
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Target locales, comma separated (e.g. 'fr_FR,de_DE')
    #[arg(short = 'L', long, value_delimiter = ',')]
    locales: Vec<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Domain profile: 'auto', a built-in id, or a profile JSON file
    #[arg(long, default_value = "auto")]
    profile: String,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Keep source text, make no translator calls and write no SQL
    #[arg(long)]
    dry_run: bool,

    /// Re-translate titles that came back unchanged
    #[arg(long)]
    enforce_titles: bool,
}

/// seedloc - SQL seed-data localization
///
/// Finds the human-readable text in SQL seed files, translates it with an
/// LLM, and writes one localized seed file per locale.
#[derive(Parser, Debug)]
#[command(name = "seedloc")]
#[command(version)]
#[command(about = "LLM-powered localization of SQL seed data")]
#[command(long_about = "seedloc localizes the text inside SQL INSERT statements, including text nested in JSON values.

EXAMPLES:
    seedloc translate --schema schema.json -i seed.sql -L fr_FR,de_DE
    seedloc translate --schema schema.json -i seed.sql -L ja_JP --profile amazon
    seedloc translate --schema schema.json -i seed.sql --dry-run
    seedloc completions bash > seedloc.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    gemini    - Google Gemini API (GEMINI_API_KEY)
    anthropic - Anthropic Claude API (ANTHROPIC_API_KEY)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color code for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
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
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
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
    // The level is lowered or raised once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "seedloc", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)
        .with_context(|| format!("Failed to load config: {:?}", options.config_path))?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.set_model(model);
    }
    if !options.locales.is_empty() {
        config.locales = options
            .locales
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
    }
    if options.enforce_titles {
        config.enforcement.enabled = true;
    }
    match &options.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    config.validate().context("Configuration validation failed")?;

    if options.dry_run {
        warn!("Dry run: translations are left as source text and no SQL is written");
    } else {
        info!(
            "Using {} ({})",
            config.translation.provider.display_name(),
            config.translation.get_model()
        );
    }

    let controller = Controller::with_config(config)?;
    let run_options = RunOptions::new(&options.schema, &options.input, &options.output_dir)
        .with_profile(options.profile.clone())
        .with_dry_run(options.dry_run);

    let report = controller.run(&run_options).await?;

    for locale in &report.locales {
        info!(
            "{}: {} unique strings, {} cached, {} requested in {} calls, {} degraded, {} validation issues",
            locale.locale,
            locale.unique_sources,
            locale.from_cache,
            locale.requested,
            locale.calls,
            locale.degraded.len(),
            locale.validation_issues
        );
    }
    info!("Success: artifacts written to {:?}", options.output_dir);

    Ok(())
}
