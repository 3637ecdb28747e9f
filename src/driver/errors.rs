//! Unified driver error
//!
//! Every subsystem error converts into `DriverError`, which exposes the
//! inner stable `PDX_*` code and a coarse category for callers.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::executor::{ExecutorError, ExecutorErrorCode};
use crate::planner::PlannerError;
use crate::storage::StorageError;

pub type DriverResult<T> = Result<T, DriverError>;

/// Coarse failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad file contents or missing files
    Decode,
    /// Statement could not be planned
    Compilation,
    /// Failure while running a plan
    Execution,
    /// Bad driver configuration
    Config,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Decode => "DECODE",
            ErrorCategory::Compilation => "COMPILATION",
            ErrorCategory::Execution => "EXECUTION",
            ErrorCategory::Config => "CONFIG",
        }
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("[ERROR] PDX_CONFIG_INVALID: {0}")]
    Config(String),
}

impl DriverError {
    pub fn config(message: impl Into<String>) -> Self {
        DriverError::Config(message.into())
    }

    /// Stable `PDX_*` code of the underlying failure
    pub fn code(&self) -> &'static str {
        match self {
            DriverError::Storage(e) => e.code().code(),
            DriverError::Catalog(e) => e.stable_code(),
            DriverError::Planner(e) => e.code().code(),
            DriverError::Executor(e) => e.stable_code(),
            DriverError::Config(_) => "PDX_CONFIG_INVALID",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DriverError::Storage(_) | DriverError::Catalog(_) => ErrorCategory::Decode,
            DriverError::Planner(_) => ErrorCategory::Compilation,
            // rows that could not be decoded surface through the executor
            DriverError::Executor(e) if e.code() == ExecutorErrorCode::PdxLoadFailed => {
                ErrorCategory::Decode
            }
            DriverError::Executor(_) => ErrorCategory::Execution,
            DriverError::Config(_) => ErrorCategory::Config,
        }
    }

    /// Human-readable message without the code prefix
    pub fn message(&self) -> String {
        match self {
            DriverError::Storage(e) => e.message().to_string(),
            DriverError::Catalog(e) => e.message().to_string(),
            DriverError::Planner(e) => e.message().to_string(),
            DriverError::Executor(e) => e.message().to_string(),
            DriverError::Config(m) => m.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_categories() {
        let err: DriverError = PlannerError::invalid_column("a.b").into();
        assert_eq!(err.code(), "PDX_INVALID_COLUMN");
        assert_eq!(err.category(), ErrorCategory::Compilation);

        let err: DriverError = StorageError::blob_file_missing("orders").into();
        assert_eq!(err.code(), "PDX_BLOB_FILE_MISSING");
        assert_eq!(err.category().as_str(), "DECODE");

        let err: DriverError = ExecutorError::missing_parameter(2, 1).into();
        assert_eq!(err.category(), ErrorCategory::Execution);

        let err = DriverError::config("data_dir is empty");
        assert_eq!(err.code(), "PDX_CONFIG_INVALID");
        assert!(err.to_string().contains("data_dir is empty"));
    }

    #[test]
    fn test_load_failure_reports_storage_code() {
        let storage = StorageError::decode_failed("bad block");
        let err: DriverError =
            ExecutorError::load_failed("orders", CatalogError::load_failed("orders", storage)).into();
        assert_eq!(err.code(), "PDX_DECODE_FAILED");
        assert_eq!(err.category(), ErrorCategory::Decode);
    }
}
