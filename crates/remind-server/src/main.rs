use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use remind_archive::Archive;
use tracing_subscriber::EnvFilter;

use remind_server::commands::{archive, serve};
use remind_server::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    match &cli.command {
        Some(Commands::Serve) => serve::run(&config)?,
        Some(Commands::Archive { json }) => {
            let records = Archive::open(&config.archive_path);
            archive::run(&mut io::stdout().lock(), &records, *json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
