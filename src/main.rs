// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use catalog_translator::app_config::{Config, DatabaseDriver, LogLevel, ProcessEnv};
use catalog_translator::app_controller::{Controller, RunOptions};
use catalog_translator::locale_utils;

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
    /// Translate the catalog (default command)
    #[command(alias = "translate")]
    Run(RunArgs),

    /// Generate shell completions for catalog-translator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: PathBuf,

    /// Source locale (e.g. 'nl', 'pt_BR')
    #[arg(short, long)]
    source_locale: Option<String>,

    /// Comma separated target locales (e.g. 'en,fr,de')
    #[arg(short, long, value_delimiter = ',')]
    target_locales: Option<Vec<String>>,

    /// Database driver
    #[arg(long)]
    driver: Option<DatabaseDriver>,

    /// Translate but only log the writes
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Process at most this many products
    #[arg(long)]
    limit: Option<usize>,

    /// Log every SQL statement
    #[arg(short, long)]
    debug: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Exit with status 2 when any product or write failed
    #[arg(long)]
    fail_on_errors: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

/// catalog-translator - Product catalog translation
///
/// Translates product descriptions from a source locale into target locales
/// and writes them back to the shop database.
#[derive(Parser, Debug)]
#[command(name = "catalog-translator")]
#[command(version)]
#[command(about = "Translate product catalog texts between locales")]
#[command(long_about = "catalog-translator reads every product in the source locale, translates its
description and short description into each target locale with Google Cloud
Translation, and writes the results to the flat table and the attribute-value table.

EXAMPLES:
    catalog-translator                              # Translate using default config
    catalog-translator -t en,fr                     # Only English and French
    catalog-translator --dry-run --limit 10         # Preview the first 10 products
    catalog-translator --debug --log-level debug    # Log every SQL statement
    catalog-translator completions bash > ct.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the config file doesn't
    exist, a default one will be created automatically. DATABASE_USER,
    DATABASE_PASS, DATABASE_HOST, DATABASE_PORT, DATABASE_NAME,
    GOOGLE_PROJECT_ID and GOOGLE_ACCESS_TOKEN override the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
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
        log::set_boxed_logger(Box::new(CustomLogger::new(LevelFilter::Trace)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Info until the config is loaded
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
        return ExitCode::FAILURE;
    }

    let cli = CommandLineOptions::parse();

    let args = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "catalog-translator", &mut std::io::stdout());
            return ExitCode::SUCCESS;
        }
        Some(Commands::Run(args)) => args,
        None => cli.run,
    };

    match run_translate(args.clone()).await {
        Ok(has_failures) if has_failures && args.fail_on_errors => {
            warn!("Run finished with failures");
            ExitCode::from(2)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run one translation pass; returns whether any unit of work failed
async fn run_translate(options: RunArgs) -> Result<bool> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let log_level: LogLevel = cmd_log_level.clone().into();
        log::set_max_level(log_level.to_level_filter());
    }

    let (mut config, created) = Config::load_or_create(&options.config_path)?;
    if created {
        warn!(
            "Config file not found at '{}', created default config.",
            options.config_path.display()
        );
    }

    config.apply_env_overrides(&ProcessEnv)?;

    if let Some(source_locale) = &options.source_locale {
        config.source_locale = source_locale.clone();
    }
    if let Some(target_locales) = &options.target_locales {
        config.target_locales = target_locales
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
    }
    if let Some(driver) = options.driver {
        config.database.driver = driver;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    // SQL statements are logged at debug level
    if options.debug && log::max_level() < LevelFilter::Debug {
        log::set_max_level(LevelFilter::Debug);
    }

    let locale_name = |code: &str| locale_utils::get_locale_name(code).unwrap_or_else(|_| code.to_string());
    info!(
        "Translating {} -> [{}] via {}",
        locale_name(&config.source_locale),
        config
            .target_locales
            .iter()
            .map(|l| locale_name(l))
            .collect::<Vec<_>>()
            .join(", "),
        config.translation.provider
    );

    let controller = Controller::with_config(
        config,
        RunOptions {
            dry_run: options.dry_run,
            limit: options.limit,
            debug: options.debug,
            show_progress: !options.no_progress,
        },
    );

    let report = controller.run().await?;
    Ok(report.has_failures())
}
