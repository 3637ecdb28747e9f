//! Table data file reader
//!
//! File layout (multi-byte header fields little-endian):
//!
//! | offset | size | field |
//! |--------|------|-------|
//! | 0x00   | 2    | record size |
//! | 0x02   | 2    | header size |
//! | 0x05   | 1    | block size in KiB |
//! | 0x06   | 4    | record count |
//! | 0x0E   | 2    | first data block (1-based, 0 = none) |
//! | 0x21   | 2    | field count |
//!
//! Data block `n` starts at `header_size + (n - 1) * block_size` with a
//! 6-byte header: next block (u16), previous block (u16), and the byte
//! offset of the last record (i16, negative when the block is empty).

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::blob::BlobResolver;
use super::charset::Charset;
use super::decoder::FieldDecoder;
use super::errors::{StorageError, StorageResult};
use super::field_type::FieldSpec;
use crate::value::Row;

/// Minimum header bytes needed to read every header field
pub const MIN_HEADER_SIZE: usize = 0x23;
const BLOCK_HEADER_SIZE: u64 = 6;

/// Parsed table file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHeader {
    pub record_size: usize,
    pub header_size: u64,
    pub block_size: u64,
    pub record_count: u32,
    pub first_block: u16,
    pub field_count: u16,
}

impl TableHeader {
    /// Parses the header from the leading bytes of a table file
    pub fn parse(bytes: &[u8]) -> StorageResult<Self> {
        if bytes.len() < MIN_HEADER_SIZE {
            return Err(StorageError::decode_failed(format!(
                "table header needs {} bytes, found {}",
                MIN_HEADER_SIZE,
                bytes.len()
            )));
        }
        let u16_at = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);

        let header = Self {
            record_size: usize::from(u16_at(0x00)),
            header_size: u64::from(u16_at(0x02)),
            block_size: u64::from(bytes[0x05]) * 1024,
            record_count: u32::from_le_bytes([bytes[0x06], bytes[0x07], bytes[0x08], bytes[0x09]]),
            first_block: u16_at(0x0E),
            field_count: u16_at(0x21),
        };

        if header.record_size == 0 {
            return Err(StorageError::decode_failed_at(0, "record size is zero"));
        }
        if header.block_size <= BLOCK_HEADER_SIZE {
            return Err(StorageError::decode_failed_at(5, "block size is zero"));
        }
        if header.header_size < MIN_HEADER_SIZE as u64 {
            return Err(StorageError::decode_failed_at(2, "header size too small"));
        }
        Ok(header)
    }

    /// Records that fit in one data block
    pub fn records_per_block(&self) -> usize {
        ((self.block_size - BLOCK_HEADER_SIZE) as usize) / self.record_size
    }
}

/// A table data file on disk
#[derive(Debug, Clone)]
pub struct TableFile {
    path: PathBuf,
    header: TableHeader,
}

impl TableFile {
    /// Opens the file and reads its header
    ///
    /// The file handle is released before returning.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let mut file = open_file(path)?;
        let mut bytes = vec![0u8; MIN_HEADER_SIZE];
        file.read_exact(&mut bytes).map_err(|e| {
            StorageError::io_error(format!("Failed to read table header: {}", path.display()), e)
        })?;
        let header = TableHeader::parse(&bytes)?;

        Ok(Self {
            path: path.to_path_buf(),
            header,
        })
    }

    /// Returns the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the parsed header
    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    /// Checks that the header agrees with a field layout
    pub fn check_layout(&self, fields: &[FieldSpec]) -> StorageResult<()> {
        if usize::from(self.header.field_count) != fields.len() {
            return Err(StorageError::decode_failed(format!(
                "header declares {} fields, descriptor has {}",
                self.header.field_count,
                fields.len()
            )));
        }
        let width: usize = fields.iter().map(|f| f.size).sum();
        if width != self.header.record_size {
            return Err(StorageError::decode_failed(format!(
                "header record size {} does not match field widths {}",
                self.header.record_size, width
            )));
        }
        Ok(())
    }

    /// Reads every record, decoding only the fields at `positions`
    ///
    /// Each returned row holds the requested fields in `positions` order.
    /// Both file handles are scoped to this call.
    pub fn read_rows(
        &self,
        fields: &[FieldSpec],
        positions: &[usize],
        charset: Charset,
    ) -> StorageResult<Vec<Row>> {
        self.check_layout(fields)?;

        let mut offsets = Vec::with_capacity(fields.len());
        let mut at = 0usize;
        for field in fields {
            offsets.push(at);
            at += field.size;
        }
        for &pos in positions {
            if pos >= fields.len() {
                return Err(StorageError::decode_failed(format!(
                    "field position {} out of range (table has {} fields)",
                    pos,
                    fields.len()
                )));
            }
        }

        let mut file = open_file(&self.path)?;
        let file_len = file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read table metadata", e))?
            .len();

        let mut blobs = BlobResolver::new(&self.path);
        let mut decoder = FieldDecoder::new(charset, &mut blobs);

        let mut rows = Vec::with_capacity(self.header.record_count as usize);
        let mut visited = HashSet::new();
        let mut block = self.header.first_block;

        while block != 0 {
            if !visited.insert(block) {
                return Err(StorageError::decode_failed(format!(
                    "block chain revisits block {}",
                    block
                )));
            }

            let start = self.header.header_size + u64::from(block - 1) * self.header.block_size;
            if start + BLOCK_HEADER_SIZE > file_len {
                return Err(StorageError::decode_failed_at(
                    start,
                    format!("block {} lies past end of file", block),
                ));
            }

            let mut block_header = [0u8; BLOCK_HEADER_SIZE as usize];
            read_at(&mut file, start, &mut block_header)?;
            let next = u16::from_le_bytes([block_header[0], block_header[1]]);
            let add_data_size = i16::from_le_bytes([block_header[4], block_header[5]]);

            if add_data_size >= 0 {
                let count = add_data_size as usize / self.header.record_size + 1;
                if count > self.header.records_per_block() {
                    return Err(StorageError::decode_failed_at(
                        start,
                        format!("block {} claims {} records", block, count),
                    ));
                }

                let mut data = vec![0u8; count * self.header.record_size];
                read_at(&mut file, start + BLOCK_HEADER_SIZE, &mut data)?;

                for record in data.chunks_exact(self.header.record_size) {
                    let mut row = Vec::with_capacity(positions.len());
                    for &pos in positions {
                        let raw = &record[offsets[pos]..offsets[pos] + fields[pos].size];
                        row.push(decoder.decode(&fields[pos], raw)?);
                    }
                    rows.push(row);
                }
            }

            block = next;
        }

        Ok(rows)
    }
}

fn open_file(path: &Path) -> StorageResult<File> {
    File::open(path).map_err(|e| {
        StorageError::io_error(format!("Failed to open table file: {}", path.display()), e)
    })
}

fn read_at(file: &mut File, position: u64, buf: &mut [u8]) -> StorageResult<()> {
    file.seek(SeekFrom::Start(position))
        .and_then(|_| file.read_exact(buf))
        .map_err(|e| {
            StorageError::io_error("Failed to read table block", e)
                .with_details(format!("byte_offset: {}", position))
        })
}
