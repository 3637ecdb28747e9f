//! In-memory catalog with preset rows

use std::sync::Arc;

use super::errors::{CatalogError, CatalogResult};
use super::types::{Field, Table};
use super::Catalog;
use crate::storage::{Charset, FieldType};
use crate::value::Row;

/// Catalog holding tables and their rows in memory
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    schema: String,
    tables: Vec<(Arc<Table>, Vec<Row>)>,
}

impl MemoryCatalog {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            tables: Vec::new(),
        }
    }

    /// Adds a table; every row must have one value per field
    pub fn add_table(
        &mut self,
        name: &str,
        fields: &[(&str, FieldType)],
        rows: Vec<Row>,
    ) -> CatalogResult<Arc<Table>> {
        if self.tables.iter().any(|(t, _)| t.name.eq_ignore_ascii_case(name)) {
            return Err(CatalogError::invalid(name, format!("duplicate table name '{}'", name)));
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != fields.len()) {
            return Err(CatalogError::invalid(
                name,
                format!("row has {} values, table has {} fields", bad.len(), fields.len()),
            ));
        }

        let fields = fields
            .iter()
            .enumerate()
            .map(|(position, (field_name, field_type))| Field {
                name: field_name.to_string(),
                position,
                field_type: *field_type,
                size: field_type.fixed_width().unwrap_or(0),
                precision: 0,
                scale: 0,
                table: name.to_string(),
            })
            .collect();

        let table = Arc::new(Table {
            name: name.to_string(),
            schema: self.schema.clone(),
            fields,
            primary_key: Vec::new(),
            file: None,
            charset: Charset::default(),
        });
        self.tables.push((Arc::clone(&table), rows));
        Ok(table)
    }

    /// Builder form of `add_table`
    pub fn with_table(
        mut self,
        name: &str,
        fields: &[(&str, FieldType)],
        rows: Vec<Row>,
    ) -> CatalogResult<Self> {
        self.add_table(name, fields, rows)?;
        Ok(self)
    }
}

impl Catalog for MemoryCatalog {
    fn tables(&self) -> Vec<Arc<Table>> {
        self.tables.iter().map(|(t, _)| Arc::clone(t)).collect()
    }

    fn load_rows(&self, table: &Table, positions: &[usize]) -> CatalogResult<Vec<Row>> {
        let (_, rows) = self
            .tables
            .iter()
            .find(|(t, _)| t.name == table.name)
            .ok_or_else(|| CatalogError::table_not_found(&table.name))?;

        if let Some(&bad) = positions.iter().find(|&&p| p >= table.fields.len()) {
            return Err(CatalogError::invalid(
                &table.name,
                format!("field position {} out of range", bad),
            ));
        }

        Ok(rows
            .iter()
            .map(|row| positions.iter().map(|&p| row[p].clone()).collect())
            .collect())
    }
}
