//! Config file driven CLI entry points

mod common;

use std::fs;
use std::path::PathBuf;

use common::id_table;
use pdxsql::cli::{self, CliErrorCode, Command, Config};
use pdxsql::{Database, Value};
use serde_json::json;
use tempfile::TempDir;

fn write_config(dir: &TempDir, data_dir: &std::path::Path, extra: serde_json::Value) -> PathBuf {
    let mut config = json!({ "data_dir": data_dir.to_string_lossy() });
    if let (Some(target), Some(fields)) = (config.as_object_mut(), extra.as_object()) {
        for (k, v) in fields {
            target.insert(k.clone(), v.clone());
        }
    }
    let path = dir.path().join("pdxsql.json");
    fs::write(&path, config.to_string()).unwrap();
    path
}

#[test]
fn test_config_opens_database() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    id_table("orders", &[10, 20, 30]).write(&data);

    let path = write_config(&dir, &data, json!({ "max_rows": 2, "charset": "latin1" }));
    let config = Config::load(&path).unwrap();
    let db = Database::open(config.to_options().unwrap()).unwrap();

    let names: Vec<String> = db.tables().iter().map(|t| t.name.clone()).collect();
    assert_eq!(names, vec!["orders".to_string()]);
    assert_eq!(db.tables()[0].schema, "data");

    let statement = pdxsql::planner::SelectStatement::new()
        .from(pdxsql::planner::TableRef::new("orders"))
        .select(pdxsql::planner::SelectItem::wildcard());
    let result = db.query(&statement, &[]).unwrap();
    assert_eq!(result.rows, vec![vec![Value::Int32(10)], vec![Value::Int32(20)]]);
}

#[test]
fn test_tables_command() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    id_table("orders", &[1]).write(&data);

    let config = write_config(&dir, &data, json!({}));
    assert!(cli::run_command(Command::Tables { config }).is_ok());
}

#[test]
fn test_invalid_log_level_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, dir.path(), json!({ "log_level": "loud" }));

    let err = cli::run_command(Command::Tables { config }).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::ConfigError);
}

#[test]
fn test_broken_descriptor_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("orders.json"), "{ not json").unwrap();

    let config = write_config(&dir, &data, json!({}));
    let err = cli::run_command(Command::Tables { config }).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::ConfigError);
}
