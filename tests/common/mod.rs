//! Fixture builder for table directories
//!
//! Writes `<name>.json` descriptors, `<name>.db` table files (128-byte
//! header, 1 KiB blocks) and optional `<name>.mb` blob files.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use serde_json::json;

const HEADER_SIZE: usize = 0x80;
const BLOCK_SIZE: usize = 1024;
const BLOCK_HEADER: usize = 6;

/// Encoded NULL or value of a 4-byte Long field
pub fn long(v: Option<i32>) -> Vec<u8> {
    match v {
        Some(v) => ((v as u32) ^ 0x8000_0000).to_be_bytes().to_vec(),
        None => vec![0; 4],
    }
}

/// Zero-padded Alpha field
pub fn alpha(s: &str, size: usize) -> Vec<u8> {
    let mut raw = s.as_bytes().to_vec();
    raw.resize(size, 0);
    raw
}

/// Memo field whose content fits in the leader
pub fn memo_inline(text: &str, size: usize) -> Vec<u8> {
    let mut raw = text.as_bytes().to_vec();
    raw.resize(size - 10, 0);
    raw.extend(locator(0, text.len() as i32));
    raw
}

/// Memo field stored in the blob file at `offset` (a multiple of 256)
pub fn memo_external(offset: u32, total: usize, size: usize) -> Vec<u8> {
    let mut raw = vec![0u8; size - 10];
    // Low byte is the block index, ignored by the offset computation.
    raw.extend(locator(offset | 0x01, total as i32));
    raw
}

pub fn memo_null(size: usize) -> Vec<u8> {
    vec![0; size]
}

fn locator(begin_index: u32, size: i32) -> Vec<u8> {
    let mut raw = begin_index.to_le_bytes().to_vec();
    raw.extend(size.to_le_bytes());
    raw.extend(0u16.to_le_bytes());
    raw
}

/// Blob file image built block by block
pub struct BlobFile {
    bytes: Vec<u8>,
}

impl BlobFile {
    /// Starts with a head block at offset 0
    pub fn new() -> Self {
        let mut bytes = vec![0u8; 256];
        bytes[0] = 0x00;
        bytes[1..3].copy_from_slice(&1u16.to_le_bytes());
        Self { bytes }
    }

    fn reserve(&mut self, end: usize) {
        if self.bytes.len() < end {
            self.bytes.resize(end, 0);
        }
    }

    /// Single block (tag 2) at `offset`
    pub fn single(mut self, offset: usize, content: &[u8]) -> Self {
        self.reserve(offset + 9 + content.len());
        self.bytes[offset] = 0x02;
        self.bytes[offset + 1..offset + 3].copy_from_slice(&1u16.to_le_bytes());
        self.bytes[offset + 3..offset + 7].copy_from_slice(&(content.len() as i32).to_le_bytes());
        self.bytes[offset + 9..offset + 9 + content.len()].copy_from_slice(content);
        self
    }

    /// Sub-allocated block (tag 3) at `offset`; fragments are placed at
    /// `offset + 16 * unit` for the given units
    pub fn sub_blocks(mut self, offset: usize, fragments: &[(u8, &[u8])]) -> Self {
        self.reserve(offset + 12 + 64 * 5);
        self.bytes[offset] = 0x03;
        self.bytes[offset + 1..offset + 3].copy_from_slice(&1u16.to_le_bytes());

        for (slot, (unit, content)) in fragments.iter().enumerate() {
            let start = offset + usize::from(*unit) * 16;
            self.reserve(start + content.len());
            self.bytes[start..start + content.len()].copy_from_slice(content);

            // length = length_unit * 16 + remainder - 16
            let encoded = content.len() + 16;
            let descriptor = offset + 12 + slot * 5;
            self.bytes[descriptor] = *unit;
            self.bytes[descriptor + 1] = (encoded / 16) as u8;
            self.bytes[descriptor + 4] = (encoded % 16) as u8;
        }
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// One table of a fixture directory
pub struct TableFixture {
    name: String,
    fields: Vec<(String, String, usize)>,
    primary_key: Vec<String>,
    records: Vec<Vec<u8>>,
    blob: Option<BlobFile>,
}

impl TableFixture {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
            primary_key: Vec::new(),
            records: Vec::new(),
            blob: None,
        }
    }

    /// Adds a field; `field_type` is the descriptor type name
    pub fn field(mut self, name: &str, field_type: &str, size: usize) -> Self {
        self.fields.push((name.to_string(), field_type.to_string(), size));
        self
    }

    pub fn primary_key(mut self, name: &str) -> Self {
        self.primary_key.push(name.to_string());
        self
    }

    /// Adds a record from per-field encodings
    pub fn record(mut self, fields: Vec<Vec<u8>>) -> Self {
        self.records.push(fields.concat());
        self
    }

    pub fn blob(mut self, blob: BlobFile) -> Self {
        self.blob = Some(blob);
        self
    }

    fn record_size(&self) -> usize {
        self.fields.iter().map(|(_, _, size)| size).sum()
    }

    pub fn write(&self, dir: &Path) {
        let fields: Vec<_> = self
            .fields
            .iter()
            .map(|(name, field_type, size)| json!({ "name": name, "type": field_type, "size": size }))
            .collect();
        let descriptor = json!({
            "name": self.name,
            "fields": fields,
            "primary_key": self.primary_key,
        });
        fs::write(dir.join(format!("{}.json", self.name)), descriptor.to_string()).unwrap();
        fs::write(dir.join(format!("{}.db", self.name)), self.table_bytes()).unwrap();
        if let Some(blob) = &self.blob {
            fs::write(dir.join(format!("{}.mb", self.name)), blob.bytes()).unwrap();
        }
    }

    fn table_bytes(&self) -> Vec<u8> {
        let record_size = self.record_size();
        let per_block = (BLOCK_SIZE - BLOCK_HEADER) / record_size;
        let blocks: Vec<&[Vec<u8>]> = self.records.chunks(per_block).collect();

        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[0x00..0x02].copy_from_slice(&(record_size as u16).to_le_bytes());
        bytes[0x02..0x04].copy_from_slice(&(HEADER_SIZE as u16).to_le_bytes());
        bytes[0x05] = (BLOCK_SIZE / 1024) as u8;
        bytes[0x06..0x0A].copy_from_slice(&(self.records.len() as u32).to_le_bytes());
        let first_block: u16 = if blocks.is_empty() { 0 } else { 1 };
        bytes[0x0E..0x10].copy_from_slice(&first_block.to_le_bytes());
        bytes[0x21..0x23].copy_from_slice(&(self.fields.len() as u16).to_le_bytes());

        for (i, records) in blocks.iter().enumerate() {
            let number = i as u16 + 1;
            let next: u16 = if i + 1 < blocks.len() { number + 1 } else { 0 };
            let prev: u16 = number - 1;
            let add_data_size = ((records.len() - 1) * record_size) as i16;

            let mut block = vec![0u8; BLOCK_SIZE];
            block[0..2].copy_from_slice(&next.to_le_bytes());
            block[2..4].copy_from_slice(&prev.to_le_bytes());
            block[4..6].copy_from_slice(&add_data_size.to_le_bytes());
            for (j, record) in records.iter().enumerate() {
                let at = BLOCK_HEADER + j * record_size;
                block[at..at + record_size].copy_from_slice(record);
            }
            bytes.extend(block);
        }
        bytes
    }
}

/// Table with a single Long `id` column
pub fn id_table(name: &str, ids: &[i32]) -> TableFixture {
    ids.iter().fold(
        TableFixture::new(name).field("id", "long", 4),
        |t, &id| t.record(vec![long(Some(id))]),
    )
}
