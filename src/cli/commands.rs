//! CLI command implementations
//!
//! Each command loads the config, opens the data directory and answers on
//! stdout with a single JSON response. Statement failures are reported as
//! `{"status":"error",...}` responses and also end the process non-zero.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};

use crate::catalog::Table;
use crate::driver::{Database, DatabaseOptions};
use crate::observability::{log_event_with_fields, Event, Severity};
use crate::storage::Charset;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `<table>.json` descriptors and `.db`/`.mb` files
    pub data_dir: String,

    /// Text encoding of table content (default "windows-1252")
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Row cap per query, 0 for none
    #[serde(default)]
    pub max_rows: usize,

    /// Minimum log severity (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_charset() -> String {
    "windows-1252".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        let path_display = path.display().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("path", &path_display), ("charset", &config.charset)],
        );
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }
        self.charset()?;
        self.log_level()?;
        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn charset(&self) -> CliResult<Charset> {
        Charset::from_name(&self.charset).ok_or_else(|| {
            CliError::config_error(format!(
                "Invalid charset: '{}'. Expected 'windows-1252', 'latin1' or 'utf-8'.",
                self.charset
            ))
        })
    }

    pub fn log_level(&self) -> CliResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            CliError::config_error(format!("Invalid log_level: '{}'", self.log_level))
        })
    }

    /// Driver options equivalent to this config
    pub fn to_options(&self) -> CliResult<DatabaseOptions> {
        Ok(DatabaseOptions::new(self.data_path())
            .charset(self.charset()?)
            .max_rows(self.max_rows)
            .log_level(self.log_level()?))
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Tables { config } => tables(&config),
        Command::Query { config } => query(&config),
        Command::Explain { config } => explain(&config),
    }
}

fn open(config_path: &Path) -> CliResult<Database> {
    let config = Config::load(config_path)?;
    Ok(Database::open(config.to_options()?)?)
}

/// List tables with their fields
pub fn tables(config_path: &Path) -> CliResult<()> {
    let db = open(config_path)?;
    let data: Vec<Json> = db.tables().iter().map(|t| describe_table(t)).collect();
    write_response(Json::Array(data))
}

/// Run one statement read from stdin
pub fn query(config_path: &Path) -> CliResult<()> {
    let db = open(config_path)?;
    let request = read_request()?;

    match db.query(&request.statement, &request.parameters) {
        Ok(result) => write_response(result.to_json()),
        Err(e) => {
            write_error(e.code(), &e.message())?;
            Err(CliError::query_failed(&e))
        }
    }
}

/// Explain one statement read from stdin
///
/// A statement that fails to compile still produces an ok response whose
/// plan is marked rejected.
pub fn explain(config_path: &Path) -> CliResult<()> {
    let db = open(config_path)?;
    let request = read_request()?;

    let plan = db.explain(&request.statement);
    write_response(serde_json::to_value(&plan)?)
}

fn describe_table(table: &Table) -> Json {
    let fields: Vec<Json> = table
        .fields
        .iter()
        .map(|f| {
            json!({
                "name": f.name,
                "type": f.sql_type(),
                "size": f.size,
            })
        })
        .collect();
    let primary_key: Vec<&str> = table.primary_key_fields().map(|f| f.name.as_str()).collect();
    json!({
        "name": table.name,
        "schema": table.schema,
        "fields": fields,
        "primary_key": primary_key,
    })
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use tempfile::TempDir;

    fn write_config(temp_dir: &TempDir, config: Json) -> std::path::PathBuf {
        let config_path = temp_dir.path().join("pdxsql.json");
        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, json!({ "data_dir": "/data" }));

        let config = Config::load(&path).unwrap();
        assert_eq!(config.charset, "windows-1252");
        assert_eq!(config.max_rows, 0);
        assert_eq!(config.log_level, "info");

        let options = config.to_options().unwrap();
        assert_eq!(options.charset, Charset::Windows1252);
        assert_eq!(options.log_level, Severity::Info);
    }

    #[test]
    fn test_config_rejects_unknown_charset() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, json!({ "data_dir": "/data", "charset": "ebcdic" }));

        let err = Config::load(&path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
        assert!(err.message().contains("ebcdic"));
    }

    #[test]
    fn test_config_rejects_empty_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, json!({ "data_dir": " " }));
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_config_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load(&temp_dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_tables_requires_existing_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let path = write_config(&temp_dir, json!({ "data_dir": missing.to_string_lossy() }));
        assert!(tables(&path).is_err());
    }

    #[test]
    fn test_describe_table() {
        let mut catalog = crate::catalog::MemoryCatalog::new("s");
        let table = catalog
            .add_table("t", &[("id", crate::storage::FieldType::Long)], vec![])
            .unwrap();
        let json = describe_table(&table);
        assert_eq!(json["name"], "t");
        assert_eq!(json["fields"][0]["type"], "INTEGER");
    }
}
