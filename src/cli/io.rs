//! JSON I/O handling for CLI
//!
//! - Input: one JSON request object on stdin
//! - Output: one JSON response object on stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde::Deserialize;
use serde_json::Value as Json;

use super::errors::{CliError, CliResult};
use crate::planner::SelectStatement;
use crate::value::Value;

/// A statement with its positional parameters
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub statement: SelectStatement,
    #[serde(default)]
    pub parameters: Vec<Value>,
}

/// Parses a request document
pub fn parse_request(input: &str) -> CliResult<QueryRequest> {
    if input.trim().is_empty() {
        return Err(CliError::invalid_request("Empty input"));
    }
    serde_json::from_str(input).map_err(|e| CliError::invalid_request(format!("Invalid request: {}", e)))
}

/// Reads the whole of stdin as one request
pub fn read_request() -> CliResult<QueryRequest> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_request(&input)
}

pub fn ok_response(data: Json) -> Json {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

pub fn error_response(code: &str, message: &str) -> Json {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

/// Write a success response to stdout
pub fn write_response(data: Json) -> CliResult<()> {
    write_json(&ok_response(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_json(&error_response(code, message))
}

fn write_json(response: &Json) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
