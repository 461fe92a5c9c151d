//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Event reminder service.
///
/// Accepts upcoming events over HTTP, pushes an alert over WebSocket shortly
/// before each one starts, and archives events once they are over.
#[derive(Debug, Parser)]
#[command(name = "remind", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the API, the push channel and the sweep until interrupted.
    Serve,

    /// Print the archive of completed events.
    Archive {
        /// Print the raw JSON array instead of one line per event.
        #[arg(long)]
        json: bool,
    },
}
