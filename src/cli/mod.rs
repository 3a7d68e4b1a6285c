//! CLI interface for Sketchroom

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sketchroom")]
#[command(version)]
#[command(about = "Auth, rooms, chats and drawing elements backend", long_about = None)]
pub struct Cli {
    /// Path to sketchroom.toml (defaults to searching upward from the current directory)
    #[arg(short, long, global = true, env = "SKETCHROOM_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new sketchroom.toml configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides config and HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create the database schema
    Migrate,

    /// Validate the configuration and print a summary
    Check,
}
