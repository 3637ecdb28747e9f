//! Table and field metadata

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::storage::{Charset, FieldSpec, FieldType};

/// A column of a table, immutable after catalog load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    /// Zero-based ordinal within the table
    pub position: usize,
    pub field_type: FieldType,
    /// On-disk width in bytes
    pub size: usize,
    pub precision: u32,
    pub scale: u32,
    /// Name of the owning table
    pub table: String,
}

impl Field {
    /// Physical layout used by the decoders
    pub fn spec(&self) -> FieldSpec {
        FieldSpec {
            field_type: self.field_type,
            size: self.size,
            scale: self.scale,
        }
    }

    /// SQL type name for result metadata
    pub fn sql_type(&self) -> &'static str {
        self.field_type.sql_type()
    }
}

/// A table handle
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub schema: String,
    pub fields: Vec<Field>,
    /// Positions of the primary-key fields
    pub primary_key: Vec<usize>,
    /// Data file, absent for in-memory tables
    pub file: Option<PathBuf>,
    pub charset: Charset,
}

impl Table {
    /// Looks a field up by name, case-insensitively
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Physical layout of every field, in order
    pub fn field_specs(&self) -> Vec<FieldSpec> {
        self.fields.iter().map(Field::spec).collect()
    }

    pub fn primary_key_fields(&self) -> impl Iterator<Item = &Field> {
        self.primary_key.iter().filter_map(|&p| self.fields.get(p))
    }

    /// `schema.name`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// On-disk JSON table descriptor, `<name>.json` next to `<name>.db`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Defaults to the descriptor file stem
    #[serde(default)]
    pub name: Option<String>,
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    /// Overrides the catalog charset for this table
    #[serde(default)]
    pub charset: Option<String>,
}

/// One field of a table descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Required for variable-width types
    #[serde(default)]
    pub size: Option<usize>,
    #[serde(default)]
    pub precision: u32,
    #[serde(default)]
    pub scale: u32,
}

impl FieldDescriptor {
    /// Declared size, falling back to the type's fixed width
    pub fn resolved_size(&self) -> Option<usize> {
        self.size.or_else(|| self.field_type.fixed_width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let field = |name: &str, position, field_type| Field {
            name: name.to_string(),
            position,
            field_type,
            size: 4,
            precision: 0,
            scale: 0,
            table: "customer".to_string(),
        };
        Table {
            name: "customer".into(),
            schema: "data".into(),
            fields: vec![field("Id", 0, FieldType::Long), field("Name", 1, FieldType::Alpha)],
            primary_key: vec![0],
            file: None,
            charset: Charset::default(),
        }
    }

    #[test]
    fn test_field_lookup_is_case_insensitive() {
        let t = table();
        assert_eq!(t.field("NAME").map(|f| f.position), Some(1));
        assert!(t.field("missing").is_none());
    }

    #[test]
    fn test_primary_key_fields() {
        let t = table();
        let names: Vec<_> = t.primary_key_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Id"]);
        assert_eq!(t.qualified_name(), "data.customer");
    }

    #[test]
    fn test_descriptor_defaults() {
        let d: TableDescriptor = serde_json::from_str(
            r#"{"fields":[{"name":"Id","type":"long"},{"name":"Name","type":"alpha","size":20}]}"#,
        )
        .unwrap();
        assert!(d.name.is_none());
        assert_eq!(d.fields[0].resolved_size(), Some(4));
        assert_eq!(d.fields[1].resolved_size(), Some(20));
    }
}
