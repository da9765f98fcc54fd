//! CLI interface for Clarity

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clarity")]
#[command(version)]
#[command(about = "Expense journaling API with mood tagging", long_about = None)]
pub struct Cli {
    /// Path to clarity.toml (searched upward from the current directory by default)
    #[arg(short, long, global = true, env = "CLARITY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new clarity.toml configuration file
    Init,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate the configuration and show the effective settings
    Check,
}
