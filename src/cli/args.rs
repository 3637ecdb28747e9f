//! CLI argument definitions using clap
//!
//! Commands:
//! - pdxsql tables --config <path>
//! - pdxsql query --config <path>
//! - pdxsql explain --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pdxsql - SQL over Paradox-style table files
#[derive(Parser, Debug)]
#[command(name = "pdxsql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the tables of the configured data directory
    Tables {
        /// Path to configuration file
        #[arg(long, default_value = "./pdxsql.json")]
        config: PathBuf,
    },

    /// Run one statement read from stdin and exit
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./pdxsql.json")]
        config: PathBuf,
    },

    /// Explain one statement read from stdin and exit
    Explain {
        /// Path to configuration file
        #[arg(long, default_value = "./pdxsql.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
