//! Catalog error types
//!
//! Error codes:
//! - PDX_TABLE_NOT_FOUND (no table matches a lookup)
//! - PDX_CATALOG_INVALID (bad descriptor or data directory)
//! - PDX_LOAD_FAILED (row loading failed in storage; the storage code is kept)

use std::fmt;

use crate::storage::StorageError;

/// Catalog-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorCode {
    PdxTableNotFound,
    PdxCatalogInvalid,
    PdxLoadFailed,
}

impl CatalogErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            CatalogErrorCode::PdxTableNotFound => "PDX_TABLE_NOT_FOUND",
            CatalogErrorCode::PdxCatalogInvalid => "PDX_CATALOG_INVALID",
            CatalogErrorCode::PdxLoadFailed => "PDX_LOAD_FAILED",
        }
    }
}

impl fmt::Display for CatalogErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Catalog error with context
#[derive(Debug)]
pub struct CatalogError {
    code: CatalogErrorCode,
    message: String,
    details: Option<String>,
    source: Option<StorageError>,
}

impl CatalogError {
    pub fn table_not_found(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: CatalogErrorCode::PdxTableNotFound,
            message: format!("Table '{}' not found", name),
            details: None,
            source: None,
        }
    }

    /// Malformed descriptor, data directory or table file
    pub fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: CatalogErrorCode::PdxCatalogInvalid,
            message: reason.into(),
            details: Some(format!("path: {}", path.into())),
            source: None,
        }
    }

    /// Storage failure while loading rows of `table`
    pub fn load_failed(table: &str, source: StorageError) -> Self {
        Self {
            code: CatalogErrorCode::PdxLoadFailed,
            message: format!("Failed to load rows of table '{}'", table),
            details: None,
            source: Some(source),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> CatalogErrorCode {
        self.code
    }

    /// Most specific stable code: the storage code when storage failed
    pub fn stable_code(&self) -> &'static str {
        match &self.source {
            Some(storage) => storage.code().code(),
            None => self.code.code(),
        }
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns the underlying storage error, if any
    pub fn storage_error(&self) -> Option<&StorageError> {
        self.source.as_ref()
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " caused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_code_prefers_storage() {
        let err = CatalogError::load_failed("notes", StorageError::blob_file_missing("notes"));
        assert_eq!(err.code(), CatalogErrorCode::PdxLoadFailed);
        assert_eq!(err.stable_code(), "PDX_BLOB_FILE_MISSING");
        assert!(err.to_string().contains("notes"));
    }

    #[test]
    fn test_not_found_display() {
        let err = CatalogError::table_not_found("ghosts");
        assert_eq!(err.stable_code(), "PDX_TABLE_NOT_FOUND");
        assert!(err.to_string().starts_with("[ERROR] PDX_TABLE_NOT_FOUND"));
    }
}
