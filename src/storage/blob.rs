//! Out-of-line memo/blob resolution
//!
//! A companion `.mb` file holds memo and blob content that does not fit in
//! the field's inline leader. Every block starts with a 3-byte header:
//! a 1-byte type tag and a 2-byte little-endian block length.
//!
//! | tag | meaning |
//! |-----|---------|
//! | 0   | file head block, never a value |
//! | 1   | free block, never a value |
//! | 2   | single block: 6-byte sub-header (i32 length, i16 modifier), then content |
//! | 3   | sub-allocated block: 64 fragment descriptors after the header |
//! | 4   | free marker where data was expected |

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};

const BLOCK_HEAD: u8 = 0x00;
const FREE_LOB_BLOCK: u8 = 0x01;
const SINGLE_BLOCK: u8 = 0x02;
const SUB_BLOCK: u8 = 0x03;
const FREE_BLOCK: u8 = 0x04;

/// Block header plus the remaining single-block sub-header
const HEADER_SIZE: u64 = 9;
const BLOCK_HEADER_SIZE: u64 = 3;
const DESCRIPTOR_COUNT: usize = 64;
const DESCRIPTOR_SIZE: usize = 5;
const BLOB_EXTENSION: &str = "mb";

/// Resolves memo/blob locators of one table against its companion file
///
/// The companion file is located and opened lazily, on the first value that
/// overflows its leader, and closed when the resolver is dropped.
pub struct BlobResolver {
    table_path: PathBuf,
    file: Option<File>,
}

impl BlobResolver {
    /// Creates a resolver for the table stored at `table_path`
    pub fn new(table_path: &Path) -> Self {
        Self {
            table_path: table_path.to_path_buf(),
            file: None,
        }
    }

    /// Reads the content stored at `offset`
    ///
    /// `declared_size` is the total size recorded in the field locator; it
    /// sizes the reassembly buffer of fragmented values.
    pub fn resolve(&mut self, offset: u64, declared_size: usize) -> StorageResult<Vec<u8>> {
        let table = table_name(&self.table_path);
        let file = self.file()?;

        seek(file, offset)?;
        let mut head = [0u8; BLOCK_HEADER_SIZE as usize];
        read_exact(file, &mut head, offset)?;
        let tag = head[0];
        let block_len = u16::from_le_bytes([head[1], head[2]]);

        let content = match tag {
            BLOCK_HEAD => {
                return Err(StorageError::blob_invalid_header(
                    offset,
                    "Trying to read a head lob block",
                ))
            }
            FREE_LOB_BLOCK => {
                return Err(StorageError::blob_invalid_header(
                    offset,
                    "Trying to read a free lob block",
                ))
            }
            FREE_BLOCK => {
                return Err(StorageError::blob_invalid_header(offset, "Invalid MB header"))
            }
            SINGLE_BLOCK => read_single_block(file, offset)?,
            SUB_BLOCK => read_sub_blocks(file, offset, declared_size)?,
            other => {
                return Err(StorageError::blob_invalid_header(
                    offset,
                    format!("Invalid BLOB header type {}", other),
                ))
            }
        };

        if Logger::enabled(Severity::Trace) {
            let offset_str = offset.to_string();
            let len_str = content.len().to_string();
            let block_str = block_len.to_string();
            log_event_with_fields(
                Event::BlobResolved,
                &[
                    ("table", &table),
                    ("offset", &offset_str),
                    ("block_len", &block_str),
                    ("bytes", &len_str),
                ],
            );
        }

        Ok(content)
    }

    fn file(&mut self) -> StorageResult<&mut File> {
        if self.file.is_none() {
            let path = find_blob_file(&self.table_path)?;
            let file = File::open(&path).map_err(|e| {
                StorageError::io_error(format!("Failed to open blob file: {}", path.display()), e)
            })?;
            self.file = Some(file);
        }
        self.file
            .as_mut()
            .ok_or_else(|| StorageError::decode_failed("blob file handle unavailable"))
    }
}

fn read_single_block(file: &mut File, offset: u64) -> StorageResult<Vec<u8>> {
    let mut sub_header = [0u8; (HEADER_SIZE - BLOCK_HEADER_SIZE) as usize];
    read_exact(file, &mut sub_header, offset)?;
    let length = i32::from_le_bytes([sub_header[0], sub_header[1], sub_header[2], sub_header[3]]);
    // bytes 4..6: modifier, unused
    let length = usize::try_from(length)
        .map_err(|_| StorageError::decode_failed_at(offset, "negative single block length"))?;

    let mut content = vec![0u8; length];
    read_exact(file, &mut content, offset)?;
    Ok(content)
}

fn read_sub_blocks(file: &mut File, offset: u64, declared_size: usize) -> StorageResult<Vec<u8>> {
    seek(file, offset + BLOCK_HEADER_SIZE + HEADER_SIZE)?;
    let mut table = [0u8; DESCRIPTOR_COUNT * DESCRIPTOR_SIZE];
    read_exact(file, &mut table, offset)?;

    let mut buffer = vec![0u8; declared_size];
    let mut filled = 0usize;

    for descriptor in table.chunks_exact(DESCRIPTOR_SIZE) {
        let block_offset = u64::from(descriptor[0]) * 16;
        if block_offset == 0 {
            continue;
        }
        let length_units = usize::from(descriptor[1]) * 16;
        // bytes 2..4 reserved
        let remainder = usize::from(descriptor[4]);
        let length = (length_units + remainder).checked_sub(16).ok_or_else(|| {
            StorageError::decode_failed_at(offset, "sub-block fragment with zero length unit")
        })?;

        let mut fragment = vec![0u8; length];
        seek(file, offset + block_offset)?;
        read_exact(file, &mut fragment, offset + block_offset)?;

        let copy = length.min(buffer.len() - filled);
        buffer[filled..filled + copy].copy_from_slice(&fragment[..copy]);
        filled += copy;
    }

    Ok(buffer)
}

/// Finds the single `<table>.mb` sibling, matching case-insensitively
pub fn find_blob_file(table_path: &Path) -> StorageResult<PathBuf> {
    let table = table_name(table_path);
    let dir = table_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let entries = fs::read_dir(dir).map_err(|e| {
        StorageError::io_error(format!("Failed to list directory: {}", dir.display()), e)
    })?;

    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            StorageError::io_error(format!("Failed to list directory: {}", dir.display()), e)
        })?;
        let path = entry.path();
        let stem_matches = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.eq_ignore_ascii_case(&table))
            .unwrap_or(false);
        let ext_matches = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.eq_ignore_ascii_case(BLOB_EXTENSION))
            .unwrap_or(false);
        if stem_matches && ext_matches && path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(StorageError::blob_file_missing(&table)),
        1 => Ok(matches.remove(0)),
        n => Err(StorageError::blob_file_ambiguous(&table, n)),
    }
}

fn table_name(table_path: &Path) -> String {
    table_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn seek(file: &mut File, position: u64) -> StorageResult<()> {
    file.seek(SeekFrom::Start(position))
        .map(|_| ())
        .map_err(|e| {
            StorageError::io_error("Failed to seek blob file", e)
                .with_details(format!("byte_offset: {}", position))
        })
}

fn read_exact(file: &mut File, buf: &mut [u8], offset: u64) -> StorageResult<()> {
    file.read_exact(buf).map_err(|e| {
        StorageError::io_error("Failed to read blob file", e)
            .with_details(format!("byte_offset: {}", offset))
    })
}
