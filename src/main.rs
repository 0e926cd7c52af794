use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use errlog::capture::ErrorCaptureHandler;
use errlog::config::{self, Config};
use errlog::logging;
use errlog::runtime;

#[derive(Parser)]
#[command(name = "errlog")]
#[command(about = "Append error records to log files and prune expired logs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how many expired logs the start-up sweep removed
    Sweep,

    /// Append an error record
    Report {
        /// Severity code
        #[arg(long)]
        code: u32,

        /// Source file the error was raised in
        #[arg(long)]
        file: PathBuf,

        /// Line number in the source file
        #[arg(long)]
        line: u32,

        /// Error message
        message: String,
    },

    /// Print the log file errors from a source file are written to
    Target {
        /// Source file path
        source: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Read once; fixed for the rest of the process
    let config = Config::load()?;
    config::ensure_directories(&config)?;

    let handler = Arc::new(ErrorCaptureHandler::from_config(&config));
    logging::init_logging(&config, handler.clone())?;
    let guard = runtime::install(Arc::clone(&handler));

    let deleted = logging::sweep(config.sweep_dir(), &config.retention_policy());
    if deleted > 0 {
        tracing::info!("Cleaned up {} old log files", deleted);
    }

    let result = run(cli.command, &config, &handler, deleted);
    guard.finish();
    result
}

fn run(
    command: Commands,
    config: &Config,
    handler: &ErrorCaptureHandler,
    deleted: usize,
) -> Result<()> {
    match command {
        Commands::Sweep => {
            println!(
                "Deleted {} expired log file(s) ({} mode, {} day window) in {}",
                deleted,
                config.routing_mode.as_str(),
                config.max_log_age_days,
                config.sweep_dir().display()
            );
        }
        Commands::Report {
            code,
            file,
            line,
            message,
        } => {
            if !handler.handle_error(code, &message, &file, line) {
                bail!("Record not written: code, file, line and message must all be non-empty");
            }
            println!("{}", handler.target_for(&file).display());
        }
        Commands::Target { source } => {
            println!("{}", handler.target_for(&source).display());
        }
        Commands::Config => {
            let content =
                toml::to_string_pretty(config).context("Failed to serialize config")?;
            print!("{}", content);
        }
    }
    Ok(())
}
