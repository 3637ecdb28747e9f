//! Result types for query execution

use serde::Serialize;

use crate::value::Row;

/// Metadata of one output column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultColumn {
    /// Alias, field name or function name
    pub name: String,
    pub sql_type: String,
    /// Source table for plain field columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl ResultColumn {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>, table: Option<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            table,
        }
    }
}

/// Fully materialized query result
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<ResultColumn>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    /// Creates an empty result with the given columns
    pub fn empty(columns: Vec<ResultColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Returns true if no rows matched
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns an iterator over the rows
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Index of the column named `name`, case-insensitive
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// JSON form: `{"columns": [...], "rows": [[...], ...]}`
    pub fn to_json(&self) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|row| serde_json::Value::Array(row.iter().map(|v| v.to_json()).collect()))
            .collect();
        serde_json::json!({
            "columns": self.columns,
            "rows": rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_empty_result() {
        let result = ResultSet::empty(vec![ResultColumn::new("id", "INTEGER", None)]);
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
        assert_eq!(result.column_index("ID"), Some(0));
    }

    #[test]
    fn test_to_json() {
        let result = ResultSet {
            columns: vec![
                ResultColumn::new("id", "INTEGER", Some("customer".into())),
                ResultColumn::new("name", "VARCHAR", None),
            ],
            rows: vec![vec![Value::Int32(1), Value::Null]],
        };
        let json = result.to_json();
        assert_eq!(json["columns"][0]["table"], "customer");
        assert!(json["columns"][1].get("table").is_none());
        assert_eq!(json["rows"][0][0], 1);
        assert!(json["rows"][0][1].is_null());
    }
}
