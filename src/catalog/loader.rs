//! Directory catalog: loads table descriptors from a data directory
//!
//! Every `<name>.json` descriptor describes the table stored in the sibling
//! `<name>.db` file. Descriptors are read once when the catalog opens; the
//! resulting tables are immutable and shared through `Arc`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::errors::{CatalogError, CatalogResult};
use super::types::{Field, Table, TableDescriptor};
use super::Catalog;
use crate::observability::{log_event_with_fields, Event};
use crate::storage::{Charset, TableFile};
use crate::value::Row;

const DESCRIPTOR_EXTENSION: &str = "json";
const TABLE_EXTENSION: &str = "db";

/// Catalog backed by a directory of table files
#[derive(Debug)]
pub struct DirectoryCatalog {
    data_dir: PathBuf,
    schema: String,
    tables: Vec<Arc<Table>>,
}

impl DirectoryCatalog {
    /// Loads every table descriptor under `data_dir`
    ///
    /// The schema name is the directory name. Tables are ordered by name.
    pub fn open(data_dir: &Path, charset: Charset) -> CatalogResult<Self> {
        let dir_display = data_dir.display().to_string();
        if !data_dir.is_dir() {
            return Err(CatalogError::invalid(
                dir_display,
                "data directory does not exist",
            ));
        }

        let schema = data_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data".to_string());

        let entries = fs::read_dir(data_dir).map_err(|e| {
            CatalogError::invalid(&dir_display, format!("Failed to read data directory: {}", e))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                CatalogError::invalid(&dir_display, format!("Failed to read directory entry: {}", e))
            })?;
            files.push(entry.path());
        }
        files.sort();

        let mut tables = Vec::new();
        let mut seen = HashSet::new();
        for path in files.iter().filter(|p| has_extension(p, DESCRIPTOR_EXTENSION)) {
            let table = load_descriptor(path, &files, &schema, charset)?;
            if !seen.insert(table.name.to_ascii_lowercase()) {
                return Err(CatalogError::invalid(
                    path.display().to_string(),
                    format!("duplicate table name '{}'", table.name),
                ));
            }
            tables.push(Arc::new(table));
        }
        tables.sort_by(|a, b| a.name.to_ascii_lowercase().cmp(&b.name.to_ascii_lowercase()));

        let count = tables.len().to_string();
        log_event_with_fields(
            Event::CatalogLoaded,
            &[("data_dir", &dir_display), ("tables", &count)],
        );

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            schema,
            tables,
        })
    }

    /// Returns the data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the schema name
    pub fn schema(&self) -> &str {
        &self.schema
    }
}

impl Catalog for DirectoryCatalog {
    fn tables(&self) -> Vec<Arc<Table>> {
        self.tables.clone()
    }

    fn load_rows(&self, table: &Table, positions: &[usize]) -> CatalogResult<Vec<Row>> {
        let path = table.file.as_ref().ok_or_else(|| {
            CatalogError::invalid(table.qualified_name(), "table has no data file")
        })?;

        TableFile::open(path)
            .and_then(|file| file.read_rows(&table.field_specs(), positions, table.charset))
            .map_err(|e| CatalogError::load_failed(&table.name, e))
    }
}

fn load_descriptor(
    path: &Path,
    siblings: &[PathBuf],
    schema: &str,
    default_charset: Charset,
) -> CatalogResult<Table> {
    let path_display = path.display().to_string();

    let content = fs::read_to_string(path).map_err(|e| {
        CatalogError::invalid(&path_display, format!("Failed to read file: {}", e))
    })?;
    let descriptor: TableDescriptor = serde_json::from_str(&content)
        .map_err(|e| CatalogError::invalid(&path_display, format!("Invalid JSON: {}", e)))?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = descriptor.name.clone().unwrap_or_else(|| stem.clone());

    let charset = match &descriptor.charset {
        Some(cs) => Charset::from_name(cs).ok_or_else(|| {
            CatalogError::invalid(&path_display, format!("unknown charset '{}'", cs))
        })?,
        None => default_charset,
    };

    if descriptor.fields.is_empty() {
        return Err(CatalogError::invalid(&path_display, "table has no fields"));
    }

    let mut fields = Vec::with_capacity(descriptor.fields.len());
    let mut names = HashSet::new();
    for (position, fd) in descriptor.fields.iter().enumerate() {
        if !names.insert(fd.name.to_ascii_lowercase()) {
            return Err(CatalogError::invalid(
                &path_display,
                format!("duplicate field '{}'", fd.name),
            ));
        }
        let size = fd.resolved_size().ok_or_else(|| {
            CatalogError::invalid(&path_display, format!("field '{}' needs a size", fd.name))
        })?;
        let field = Field {
            name: fd.name.clone(),
            position,
            field_type: fd.field_type,
            size,
            precision: fd.precision,
            scale: fd.scale,
            table: name.clone(),
        };
        field.spec().validate().map_err(|e| {
            CatalogError::invalid(&path_display, format!("field '{}': {}", fd.name, e.message()))
        })?;
        fields.push(field);
    }

    let mut primary_key = Vec::with_capacity(descriptor.primary_key.len());
    for key in &descriptor.primary_key {
        let field = fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(key))
            .ok_or_else(|| {
                CatalogError::invalid(&path_display, format!("unknown primary key field '{}'", key))
            })?;
        primary_key.push(field.position);
    }

    let data_file = siblings
        .iter()
        .find(|p| {
            has_extension(p, TABLE_EXTENSION)
                && p.file_stem()
                    .map(|s| s.to_string_lossy().eq_ignore_ascii_case(&stem))
                    .unwrap_or(false)
        })
        .cloned()
        .ok_or_else(|| CatalogError::invalid(&path_display, format!("no data file for table '{}'", name)))?;

    let table = Table {
        name,
        schema: schema.to_string(),
        fields,
        primary_key,
        file: Some(data_file.clone()),
        charset,
    };

    TableFile::open(&data_file)
        .and_then(|file| file.check_layout(&table.field_specs()))
        .map_err(|e| CatalogError::invalid(data_file.display().to_string(), e.message()))?;

    Ok(table)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}
