//! Catalog subsystem for pdxsql
//!
//! The catalog owns table and field metadata and is the only way the query
//! engine reaches row data. Tables are immutable once loaded and shared as
//! `Arc<Table>` across queries.

mod errors;
mod loader;
mod memory;
mod types;

use std::sync::Arc;

pub use errors::{CatalogError, CatalogErrorCode, CatalogResult};
pub use loader::DirectoryCatalog;
pub use memory::MemoryCatalog;
pub use types::{Field, FieldDescriptor, Table, TableDescriptor};

use crate::value::{LikePattern, Row};

/// Source of tables and their decoded rows
pub trait Catalog {
    /// All tables, in a stable order
    fn tables(&self) -> Vec<Arc<Table>>;

    /// Decodes every row of `table`, keeping the fields at `positions` in
    /// that order
    fn load_rows(&self, table: &Table, positions: &[usize]) -> CatalogResult<Vec<Row>>;

    /// Tables whose name matches a LIKE-style pattern, case-insensitively
    fn find_tables(&self, pattern: &str) -> CatalogResult<Vec<Arc<Table>>> {
        let like = LikePattern::compile(pattern, None, true)
            .map_err(|e| CatalogError::invalid(pattern, format!("invalid table pattern: {}", e)))?;
        Ok(self
            .tables()
            .into_iter()
            .filter(|t| like.matches(&t.name))
            .collect())
    }

    /// The table named `name`, optionally within `schema`
    fn find_table(&self, schema: Option<&str>, name: &str) -> CatalogResult<Arc<Table>> {
        self.tables()
            .into_iter()
            .find(|t| {
                t.name.eq_ignore_ascii_case(name)
                    && schema.map_or(true, |s| t.schema.eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| match schema {
                Some(s) => CatalogError::table_not_found(format!("{}.{}", s, name)),
                None => CatalogError::table_not_found(name),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FieldType;

    fn catalog() -> MemoryCatalog {
        let mut c = MemoryCatalog::new("sales");
        for name in ["customer", "contacts", "orders"] {
            c.add_table(name, &[("id", FieldType::Long)], vec![]).unwrap();
        }
        c
    }

    #[test]
    fn test_find_tables_pattern() {
        let names: Vec<_> = catalog()
            .find_tables("C%")
            .unwrap()
            .iter()
            .map(|t| t.name.clone())
            .collect();
        assert_eq!(names, vec!["customer", "contacts"]);
    }

    #[test]
    fn test_find_table_with_schema() {
        let c = catalog();
        assert!(c.find_table(Some("SALES"), "orders").is_ok());
        let err = c.find_table(Some("other"), "orders").unwrap_err();
        assert_eq!(err.code(), CatalogErrorCode::PdxTableNotFound);
        assert!(err.message().contains("other.orders"));
    }
}
