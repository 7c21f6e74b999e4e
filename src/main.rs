//! freewatch - classified listings watcher
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use freewatch::cli::args::{ConfigAction, ConfigArgs};
use freewatch::cli::{Cli, Commands};
use freewatch::config::{Config, ConfigManager};
use freewatch::error::FreewatchResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> FreewatchResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    // Path and init must work even when the existing file is broken
    let skip_load = matches!(
        cli.command,
        Commands::Config(ConfigArgs {
            action: Some(ConfigAction::Path | ConfigAction::Init { .. }),
        })
    );

    let mut config = if skip_load {
        Config::default()
    } else {
        config_manager.load().await?
    };
    if let Some(state_dir) = cli.state_dir {
        config.general.state_dir = Some(state_dir);
    }

    init_logging(cli.verbose, &config.general.log_format);
    debug!("Loaded config from {}", config_manager.path().display());
    debug!("State directory: {}", config.state_dir().display());

    match cli.command {
        Commands::Run(args) => freewatch::cli::commands::run(args, &config).await,
        Commands::Match(args) => freewatch::cli::commands::matches(args, &config).await,
        Commands::Cache(args) => freewatch::cli::commands::cache(args, &config).await,
        Commands::Config(args) => {
            freewatch::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// Initialize logging: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("freewatch=warn"),
        1 => EnvFilter::new("freewatch=info"),
        _ => EnvFilter::new("freewatch=debug"),
    };

    if format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
