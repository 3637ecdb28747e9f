//! Value conversion errors
//!
//! Error code:
//! - PDX_CONVERSION_FAILED (non-coercible input)

use thiserror::Error;

/// Result type for value conversions
pub type ConversionResult<T> = Result<T, ConversionError>;

/// A non-null value could not be coerced into the requested type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Source type has no conversion into the target type
    #[error("cannot convert {from} value '{value}' to {target}")]
    Incompatible {
        from: &'static str,
        target: &'static str,
        value: String,
    },

    /// Source text does not parse as the target type
    #[error("cannot parse '{value}' as {target}")]
    Unparsable { target: &'static str, value: String },

    /// Source value does not fit in the target type
    #[error("{target} value '{value}' is out of range")]
    OutOfRange { target: &'static str, value: String },
}

impl ConversionError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        "PDX_CONVERSION_FAILED"
    }
}
