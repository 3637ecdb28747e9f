//! On-disk field type tags

use serde::{Deserialize, Serialize};

use super::errors::{StorageError, StorageResult};

/// Width of the memo/blob locator at the end of a memo-family field
pub const LOCATOR_SIZE: usize = 10;

/// Field type as stored in a table file header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Alpha,
    Date,
    Short,
    Long,
    Currency,
    Number,
    Logical,
    Memo,
    Blob,
    FormattedMemo,
    Ole,
    Graphic,
    Time,
    Timestamp,
    AutoIncrement,
    Bytes,
}

impl FieldType {
    /// Maps a raw type tag; BCD and unknown tags are unsupported
    pub fn from_tag(tag: u8) -> StorageResult<Self> {
        let field_type = match tag {
            0x01 => FieldType::Alpha,
            0x02 => FieldType::Date,
            0x03 => FieldType::Short,
            0x04 => FieldType::Long,
            0x05 => FieldType::Currency,
            0x06 => FieldType::Number,
            0x09 => FieldType::Logical,
            0x0C => FieldType::Memo,
            0x0D => FieldType::Blob,
            0x0E => FieldType::FormattedMemo,
            0x0F => FieldType::Ole,
            0x10 => FieldType::Graphic,
            0x14 => FieldType::Time,
            0x15 => FieldType::Timestamp,
            0x16 => FieldType::AutoIncrement,
            0x18 => FieldType::Bytes,
            other => return Err(StorageError::unsupported_field_type(other)),
        };
        Ok(field_type)
    }

    /// Raw type tag
    pub fn tag(&self) -> u8 {
        match self {
            FieldType::Alpha => 0x01,
            FieldType::Date => 0x02,
            FieldType::Short => 0x03,
            FieldType::Long => 0x04,
            FieldType::Currency => 0x05,
            FieldType::Number => 0x06,
            FieldType::Logical => 0x09,
            FieldType::Memo => 0x0C,
            FieldType::Blob => 0x0D,
            FieldType::FormattedMemo => 0x0E,
            FieldType::Ole => 0x0F,
            FieldType::Graphic => 0x10,
            FieldType::Time => 0x14,
            FieldType::Timestamp => 0x15,
            FieldType::AutoIncrement => 0x16,
            FieldType::Bytes => 0x18,
        }
    }

    /// SQL type name reported in result metadata
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldType::Alpha => "VARCHAR",
            FieldType::Date => "DATE",
            FieldType::Short => "SMALLINT",
            FieldType::Long | FieldType::AutoIncrement => "INTEGER",
            FieldType::Currency => "DECIMAL",
            FieldType::Number => "DOUBLE",
            FieldType::Logical => "BOOLEAN",
            FieldType::Memo | FieldType::FormattedMemo => "CLOB",
            FieldType::Blob | FieldType::Ole | FieldType::Graphic => "BLOB",
            FieldType::Time => "TIME",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::Bytes => "BINARY",
        }
    }

    /// Fixed on-disk width, `None` where the declared size decides
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            FieldType::Logical => Some(1),
            FieldType::Short => Some(2),
            FieldType::Long
            | FieldType::AutoIncrement
            | FieldType::Date
            | FieldType::Time => Some(4),
            FieldType::Number | FieldType::Currency | FieldType::Timestamp => Some(8),
            _ => None,
        }
    }

    /// True for fields resolved through the blob locator
    pub fn is_blob_family(&self) -> bool {
        matches!(
            self,
            FieldType::Memo
                | FieldType::FormattedMemo
                | FieldType::Blob
                | FieldType::Ole
                | FieldType::Graphic
        )
    }

    /// True if the decoded value is text rather than bytes
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldType::Alpha | FieldType::Memo | FieldType::FormattedMemo
        )
    }
}

/// Physical layout of one field inside a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field_type: FieldType,
    pub size: usize,
    pub scale: u32,
}

impl FieldSpec {
    /// Checks the declared size against the type's width rules
    pub fn validate(&self) -> StorageResult<()> {
        if let Some(width) = self.field_type.fixed_width() {
            if self.size != width {
                return Err(StorageError::decode_failed(format!(
                    "{:?} field must be {} bytes, declared {}",
                    self.field_type, width, self.size
                )));
            }
        }
        if self.field_type.is_blob_family() && self.size < LOCATOR_SIZE {
            return Err(StorageError::decode_failed(format!(
                "{:?} field must be at least {} bytes, declared {}",
                self.field_type, LOCATOR_SIZE, self.size
            )));
        }
        if self.size == 0 {
            return Err(StorageError::decode_failed("field size must be positive"));
        }
        Ok(())
    }
}
