//! Observable events emitted while loading catalogs and running queries.

use std::fmt;

/// Observable events in pdxsql
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Catalog
    /// Table descriptors loaded from a data directory
    CatalogLoaded,
    /// Configuration loaded
    ConfigLoaded,

    // Planning
    /// Plan compiled (pushdown + binding done)
    QueryCompiled,
    /// A WHERE clause was moved into a table join filter
    ConditionPushed,

    // Execution
    /// Rows of one table were decoded
    TableLoaded,
    /// Accumulated rows were combined with one more table
    JoinCompleted,
    /// Query cancelled between table iterations
    QueryCancelled,

    // Storage
    /// Memo/blob value resolved from the companion file
    BlobResolved,

    // Values
    /// A comparator precedence rung was skipped after a failed coercion
    ComparisonFallback,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::CatalogLoaded => "CATALOG_LOADED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::QueryCompiled => "QUERY_COMPILED",
            Event::ConditionPushed => "CONDITION_PUSHED",
            Event::TableLoaded => "TABLE_LOADED",
            Event::JoinCompleted => "JOIN_COMPLETED",
            Event::QueryCancelled => "QUERY_CANCELLED",
            Event::BlobResolved => "BLOB_RESOLVED",
            Event::ComparisonFallback => "COMPARISON_FALLBACK",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
