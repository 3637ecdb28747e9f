//! Planner (compilation) error types
//!
//! Error codes:
//! - PDX_INVALID_COLUMN (column reference resolves to no table field)
//! - PDX_AMBIGUOUS_COLUMN (unqualified column matches more than one table)
//! - PDX_INVALID_TABLE (table reference unknown or alias reused)
//! - PDX_INVALID_GROUP_BY (projection not covered by GROUP BY)
//! - PDX_INVALID_ORDER_BY (ORDER BY item not resolvable to an output column)
//! - PDX_UNKNOWN_FUNCTION (function name or arity not registered)
//! - PDX_INVALID_PARAMETER_COUNT (parameter indexes are not contiguous)
//! - PDX_EMPTY_COLUMN_LIST (nothing to project)
//!
//! Every compilation error is raised before any row is loaded.

use std::fmt;

use super::ast::SourcePosition;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Statement rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    PdxInvalidColumn,
    PdxAmbiguousColumn,
    PdxInvalidTable,
    PdxInvalidGroupBy,
    PdxInvalidOrderBy,
    PdxUnknownFunction,
    PdxInvalidParameterCount,
    PdxEmptyColumnList,
}

impl PlannerErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::PdxInvalidColumn => "PDX_INVALID_COLUMN",
            PlannerErrorCode::PdxAmbiguousColumn => "PDX_AMBIGUOUS_COLUMN",
            PlannerErrorCode::PdxInvalidTable => "PDX_INVALID_TABLE",
            PlannerErrorCode::PdxInvalidGroupBy => "PDX_INVALID_GROUP_BY",
            PlannerErrorCode::PdxInvalidOrderBy => "PDX_INVALID_ORDER_BY",
            PlannerErrorCode::PdxUnknownFunction => "PDX_UNKNOWN_FUNCTION",
            PlannerErrorCode::PdxInvalidParameterCount => "PDX_INVALID_PARAMETER_COUNT",
            PlannerErrorCode::PdxEmptyColumnList => "PDX_EMPTY_COLUMN_LIST",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone)]
pub struct PlannerError {
    code: PlannerErrorCode,
    message: String,
    /// Offending column, table or function name
    column: Option<String>,
    position: Option<SourcePosition>,
}

impl PlannerError {
    fn new(code: PlannerErrorCode, message: String, column: Option<String>) -> Self {
        Self {
            code,
            message,
            column,
            position: None,
        }
    }

    /// Column reference that matches no table field
    pub fn invalid_column(column: impl Into<String>) -> Self {
        let c = column.into();
        Self::new(
            PlannerErrorCode::PdxInvalidColumn,
            format!("Invalid column '{}'", c),
            Some(c),
        )
    }

    /// Unqualified column present in several tables
    pub fn ambiguous_column(column: impl Into<String>, tables: &[String]) -> Self {
        let c = column.into();
        Self::new(
            PlannerErrorCode::PdxAmbiguousColumn,
            format!("Column '{}' is ambiguous: defined in {}", c, tables.join(", ")),
            Some(c),
        )
    }

    /// Join condition of `table` reads a column of a later table
    pub fn column_not_joined(column: impl Into<String>, table: &str) -> Self {
        let c = column.into();
        Self::new(
            PlannerErrorCode::PdxInvalidColumn,
            format!(
                "Column '{}' is not available in the join condition of '{}'",
                c, table
            ),
            Some(c),
        )
    }

    pub fn invalid_table(table: impl Into<String>, reason: impl Into<String>) -> Self {
        let t = table.into();
        Self::new(
            PlannerErrorCode::PdxInvalidTable,
            format!("Invalid table '{}': {}", t, reason.into()),
            Some(t),
        )
    }

    pub fn invalid_group_by(column: impl Into<String>) -> Self {
        let c = column.into();
        Self::new(
            PlannerErrorCode::PdxInvalidGroupBy,
            format!("Column '{}' must appear in GROUP BY or in an aggregate", c),
            Some(c),
        )
    }

    pub fn invalid_order_by(item: impl Into<String>, reason: impl Into<String>) -> Self {
        let i = item.into();
        Self::new(
            PlannerErrorCode::PdxInvalidOrderBy,
            format!("Invalid ORDER BY item '{}': {}", i, reason.into()),
            Some(i),
        )
    }

    pub fn unknown_function(name: impl Into<String>, arity: usize) -> Self {
        let n = name.into();
        Self::new(
            PlannerErrorCode::PdxUnknownFunction,
            format!("Unknown function {}({} arguments)", n, arity),
            Some(n),
        )
    }

    /// Parameter index `missing` is never referenced while a higher one is
    pub fn invalid_parameter_count(missing: usize, count: usize) -> Self {
        Self::new(
            PlannerErrorCode::PdxInvalidParameterCount,
            format!(
                "Parameter {} is not referenced but {} parameters are used",
                missing, count
            ),
            None,
        )
    }

    pub fn empty_column_list() -> Self {
        Self::new(
            PlannerErrorCode::PdxEmptyColumnList,
            "Statement selects no columns".into(),
            None,
        )
    }

    /// Attaches the source position of the offending token
    pub fn at(mut self, position: Option<SourcePosition>) -> Self {
        if position.is_some() {
            self.position = position;
        }
        self
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending name if applicable
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Returns the source position if known
    pub fn position(&self) -> Option<SourcePosition> {
        self.position
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(pos) = self.position {
            write!(f, " (line {}, column {})", pos.line, pos.column)?;
        }
        Ok(())
    }
}

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PlannerErrorCode::PdxInvalidColumn.code(), "PDX_INVALID_COLUMN");
        assert_eq!(PlannerErrorCode::PdxAmbiguousColumn.code(), "PDX_AMBIGUOUS_COLUMN");
        assert_eq!(
            PlannerErrorCode::PdxInvalidParameterCount.code(),
            "PDX_INVALID_PARAMETER_COUNT"
        );
    }

    #[test]
    fn test_display_with_position() {
        let err = PlannerError::invalid_column("c.nam").at(Some(SourcePosition {
            line: 3,
            column: 12,
        }));
        let display = err.to_string();
        assert!(display.contains("PDX_INVALID_COLUMN"));
        assert!(display.contains("c.nam"));
        assert!(display.contains("line 3, column 12"));
        assert_eq!(err.column(), Some("c.nam"));
    }

    #[test]
    fn test_ambiguous_lists_tables() {
        let err = PlannerError::ambiguous_column("id", &["a".into(), "b".into()]);
        assert!(err.message().contains("a, b"));
        assert_eq!(err.position(), None);
    }
}
