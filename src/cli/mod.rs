//! CLI module for pdxsql
//!
//! Provides command-line interface for:
//! - tables: list tables and fields of the data directory
//! - query: run one JSON statement from stdin
//! - explain: explain one JSON statement from stdin

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{explain, query, run, run_command, tables, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_request, read_request, write_error, write_response, QueryRequest};
