//! Command-line interface definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Telegram channel trust auditor
#[derive(Debug, Parser)]
#[command(name = "ca", version, about = "Telegram channel trust auditor")]
pub struct Cli {
    /// Path to a config file (default: .chanaudit.yml, then user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a single channel and print the outcome as JSON
    Analyze {
        /// Channel link (t.me/<name>) or bare channel name
        link: String,
    },

    /// Submit a batch of channels and stream progress until it completes
    Batch {
        /// Channel links or bare names (1 to 20)
        #[arg(required = true)]
        links: Vec<String>,
    },
}
