//! Storage subsystem for pdxsql
//!
//! Turns raw table-file and blob-file bytes into typed rows.
//!
//! - `TableFile` walks the data block chain of a `.db` file
//! - `FieldDecoder` converts one field's bytes into a `Value`
//! - `BlobResolver` fetches memo/blob content from the companion `.mb` file
//!
//! Record fields are big-endian; memo locators and blob-file headers are
//! little-endian. Storage is read-only.

mod blob;
mod charset;
mod decoder;
mod errors;
mod field_type;
mod table_file;

pub use blob::{find_blob_file, BlobResolver};
pub use charset::Charset;
pub use decoder::{
    decode_alpha, decode_bytes, decode_logical, decode_long, decode_number, decode_short,
    FieldDecoder,
};
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use field_type::{FieldSpec, FieldType, LOCATOR_SIZE};
pub use table_file::{TableFile, TableHeader, MIN_HEADER_SIZE};
