//! Storage error types
//!
//! Error codes:
//! - PDX_STORAGE_IO_ERROR (file could not be opened or read)
//! - PDX_DECODE_FAILED (malformed table file or field bytes)
//! - PDX_BLOB_FILE_MISSING (no companion blob file)
//! - PDX_BLOB_FILE_AMBIGUOUS (more than one companion blob file)
//! - PDX_BLOB_INVALID_HEADER (unexpected blob block tag)
//! - PDX_UNSUPPORTED_FIELD_TYPE (type tag with no decoder)
//!
//! All storage errors abort the current load. No partially decoded row is
//! ever returned.

use std::fmt;
use std::io;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The load fails, the driver continues
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    PdxStorageIoError,
    PdxDecodeFailed,
    PdxBlobFileMissing,
    PdxBlobFileAmbiguous,
    PdxBlobInvalidHeader,
    PdxUnsupportedFieldType,
}

impl StorageErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::PdxStorageIoError => "PDX_STORAGE_IO_ERROR",
            StorageErrorCode::PdxDecodeFailed => "PDX_DECODE_FAILED",
            StorageErrorCode::PdxBlobFileMissing => "PDX_BLOB_FILE_MISSING",
            StorageErrorCode::PdxBlobFileAmbiguous => "PDX_BLOB_FILE_AMBIGUOUS",
            StorageErrorCode::PdxBlobInvalidHeader => "PDX_BLOB_INVALID_HEADER",
            StorageErrorCode::PdxUnsupportedFieldType => "PDX_UNSUPPORTED_FIELD_TYPE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with context
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StorageError {
    /// File open/read failure
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::PdxStorageIoError,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Malformed on-disk structure
    pub fn decode_failed(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::PdxDecodeFailed,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Malformed structure at a known byte offset
    pub fn decode_failed_at(offset: u64, message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::PdxDecodeFailed,
            message: message.into(),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    pub fn blob_file_missing(table: &str) -> Self {
        Self {
            code: StorageErrorCode::PdxBlobFileMissing,
            message: format!("Blob file not found for table '{}'", table),
            details: None,
            source: None,
        }
    }

    pub fn blob_file_ambiguous(table: &str, count: usize) -> Self {
        Self {
            code: StorageErrorCode::PdxBlobFileAmbiguous,
            message: format!("Many blob files for table '{}'", table),
            details: Some(format!("matches: {}", count)),
            source: None,
        }
    }

    /// Blob block header with a tag that cannot start a value
    pub fn blob_invalid_header(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::PdxBlobInvalidHeader,
            message: reason.into(),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    pub fn unsupported_field_type(tag: u8) -> Self {
        Self {
            code: StorageErrorCode::PdxUnsupportedFieldType,
            message: format!("Unsupported field type 0x{:02X}", tag),
            details: None,
            source: None,
        }
    }

    /// Attaches context details, replacing any existing details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
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

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " caused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
