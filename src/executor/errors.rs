//! Executor error types
//!
//! Error codes:
//! - PDX_EXECUTION_FAILED (ERROR)
//! - PDX_LOAD_FAILED (ERROR, wraps the catalog/storage failure)
//! - PDX_MISSING_PARAMETER (ERROR)
//! - PDX_FUNCTION_FAILED (ERROR)
//! - PDX_CONVERSION_FAILED (ERROR)
//! - PDX_QUERY_CANCELLED (ERROR)
//!
//! Any executor error aborts the whole query. No partial result set is
//! returned.

use std::fmt;

use crate::catalog::CatalogError;
use crate::value::ConversionError;

/// Severity levels for executor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query failed, the driver is healthy
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Executor-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorErrorCode {
    PdxExecutionFailed,
    PdxLoadFailed,
    PdxMissingParameter,
    PdxFunctionFailed,
    PdxConversionFailed,
    PdxQueryCancelled,
}

impl ExecutorErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorErrorCode::PdxExecutionFailed => "PDX_EXECUTION_FAILED",
            ExecutorErrorCode::PdxLoadFailed => "PDX_LOAD_FAILED",
            ExecutorErrorCode::PdxMissingParameter => "PDX_MISSING_PARAMETER",
            ExecutorErrorCode::PdxFunctionFailed => "PDX_FUNCTION_FAILED",
            ExecutorErrorCode::PdxConversionFailed => "PDX_CONVERSION_FAILED",
            ExecutorErrorCode::PdxQueryCancelled => "PDX_QUERY_CANCELLED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for ExecutorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Executor error type with full context
#[derive(Debug)]
pub struct ExecutorError {
    code: ExecutorErrorCode,
    message: String,
    /// Table being loaded, if applicable
    table: Option<String>,
    source: Option<CatalogError>,
}

impl ExecutorError {
    fn new(code: ExecutorErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            table: None,
            source: None,
        }
    }

    /// General execution failure
    pub fn execution_failed(reason: impl Into<String>) -> Self {
        Self::new(ExecutorErrorCode::PdxExecutionFailed, reason.into())
    }

    /// Row load of `table` failed
    pub fn load_failed(table: &str, source: CatalogError) -> Self {
        Self {
            code: ExecutorErrorCode::PdxLoadFailed,
            message: format!("Failed to load table '{}': {}", table, source.message()),
            table: Some(table.to_string()),
            source: Some(source),
        }
    }

    /// Fewer bound parameters than the statement references
    pub fn missing_parameter(expected: usize, supplied: usize) -> Self {
        Self::new(
            ExecutorErrorCode::PdxMissingParameter,
            format!(
                "Statement uses {} parameters but {} were supplied",
                expected, supplied
            ),
        )
    }

    pub fn function_failed(name: &str, reason: impl Into<String>) -> Self {
        Self::new(
            ExecutorErrorCode::PdxFunctionFailed,
            format!("Function {} failed: {}", name, reason.into()),
        )
    }

    pub fn conversion_failed(source: &ConversionError) -> Self {
        Self::new(ExecutorErrorCode::PdxConversionFailed, source.to_string())
    }

    pub fn cancelled(table: &str) -> Self {
        Self {
            code: ExecutorErrorCode::PdxQueryCancelled,
            message: format!("Query cancelled before loading table '{}'", table),
            table: Some(table.to_string()),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExecutorErrorCode {
        self.code
    }

    /// Stable code of the root cause
    ///
    /// Load failures report the underlying storage code when there is one.
    pub fn stable_code(&self) -> &'static str {
        match &self.source {
            Some(source) => source.stable_code(),
            None => self.code.code(),
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the table being loaded if applicable
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Returns the wrapped catalog error if any
    pub fn catalog_error(&self) -> Option<&CatalogError> {
        self.source.as_ref()
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<ConversionError> for ExecutorError {
    fn from(err: ConversionError) -> Self {
        ExecutorError::conversion_failed(&err)
    }
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn test_error_codes() {
        assert_eq!(ExecutorErrorCode::PdxExecutionFailed.code(), "PDX_EXECUTION_FAILED");
        assert_eq!(ExecutorErrorCode::PdxMissingParameter.code(), "PDX_MISSING_PARAMETER");
        assert_eq!(ExecutorErrorCode::PdxQueryCancelled.code(), "PDX_QUERY_CANCELLED");
    }

    #[test]
    fn test_load_failed_reports_storage_code() {
        let storage = StorageError::blob_file_missing("orders");
        let err = ExecutorError::load_failed("orders", CatalogError::load_failed("orders", storage));
        assert_eq!(err.code(), ExecutorErrorCode::PdxLoadFailed);
        assert_eq!(err.stable_code(), "PDX_BLOB_FILE_MISSING");
        assert_eq!(err.table(), Some("orders"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_display() {
        let err = ExecutorError::missing_parameter(2, 1);
        let display = err.to_string();
        assert!(display.starts_with("[ERROR] PDX_MISSING_PARAMETER"));
        assert_eq!(err.stable_code(), "PDX_MISSING_PARAMETER");
    }
}
