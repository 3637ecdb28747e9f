//! Field decoders
//!
//! Record bytes are big-endian with the sign bit of numeric fields
//! inverted, so that raw byte order sorts like the values. Memo and blob
//! locators inside a field are little-endian.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::blob::BlobResolver;
use super::charset::Charset;
use super::errors::{StorageError, StorageResult};
use super::field_type::{FieldSpec, FieldType, LOCATOR_SIZE};
use crate::value::Value;

const LOGICAL_TRUE: u8 = 0x81;
const LOGICAL_FALSE: u8 = 0x80;
const MS_PER_DAY: i64 = 86_400_000;
const DEFAULT_CURRENCY_SCALE: u32 = 2;

/// Decodes the fields of one table's records
pub struct FieldDecoder<'a> {
    charset: Charset,
    blobs: &'a mut BlobResolver,
}

impl<'a> FieldDecoder<'a> {
    pub fn new(charset: Charset, blobs: &'a mut BlobResolver) -> Self {
        Self { charset, blobs }
    }

    /// Decodes one field from exactly `spec.size` raw bytes
    pub fn decode(&mut self, spec: &FieldSpec, raw: &[u8]) -> StorageResult<Value> {
        if raw.len() != spec.size {
            return Err(StorageError::decode_failed(format!(
                "expected {} bytes for {:?} field, got {}",
                spec.size,
                spec.field_type,
                raw.len()
            )));
        }

        match spec.field_type {
            FieldType::Alpha => Ok(decode_alpha(raw, self.charset)),
            FieldType::Logical => Ok(decode_logical(fixed::<1>(raw)?[0])),
            FieldType::Short => Ok(decode_short(fixed(raw)?)),
            FieldType::Long | FieldType::AutoIncrement => Ok(decode_long(fixed(raw)?)),
            FieldType::Number => Ok(decode_number(fixed(raw)?)
                .map(Value::Float64)
                .unwrap_or(Value::Null)),
            FieldType::Currency => decode_currency(fixed(raw)?, spec.scale),
            FieldType::Date => decode_date(fixed(raw)?),
            FieldType::Time => decode_time(fixed(raw)?),
            FieldType::Timestamp => decode_timestamp(fixed(raw)?),
            FieldType::Bytes => Ok(decode_bytes(raw)),
            FieldType::Memo | FieldType::FormattedMemo => Ok(self
                .decode_locator(raw)?
                .map(|content| Value::Text(self.charset.decode(&content)))
                .unwrap_or(Value::Null)),
            FieldType::Blob | FieldType::Ole | FieldType::Graphic => Ok(self
                .decode_locator(raw)?
                .map(Value::Bytes)
                .unwrap_or(Value::Null)),
        }
    }

    /// Returns the raw content of a memo-family field, `None` for NULL
    ///
    /// The first `size - 10` bytes are the inline leader, followed by the
    /// locator: begin index (u32), total size (i32), modifier (i16).
    fn decode_locator(&mut self, raw: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let leader = raw
            .len()
            .checked_sub(LOCATOR_SIZE)
            .ok_or_else(|| StorageError::decode_failed("memo field shorter than its locator"))?;
        let locator = &raw[leader..];

        let begin_index = u32::from_le_bytes([locator[0], locator[1], locator[2], locator[3]]);
        let size = i32::from_le_bytes([locator[4], locator[5], locator[6], locator[7]]);
        // locator[8..10]: modifier

        let size = match usize::try_from(size) {
            Ok(0) | Err(_) => return Ok(None),
            Ok(size) => size,
        };
        if size <= leader {
            return Ok(Some(raw[..size].to_vec()));
        }

        let offset = u64::from(begin_index & 0xFFFF_FF00);
        self.blobs.resolve(offset, size).map(Some)
    }
}

fn fixed<const N: usize>(raw: &[u8]) -> StorageResult<[u8; N]> {
    raw.try_into()
        .map_err(|_| StorageError::decode_failed(format!("expected {} byte field", N)))
}

/// 0x81 is TRUE, 0x80 is FALSE, anything else NULL
pub fn decode_logical(byte: u8) -> Value {
    match byte {
        LOGICAL_TRUE => Value::Bool(true),
        LOGICAL_FALSE => Value::Bool(false),
        _ => Value::Null,
    }
}

/// Sign-flipped big-endian i16; -32768 after decoding is NULL
pub fn decode_short(raw: [u8; 2]) -> Value {
    let v = (u16::from_be_bytes(raw) ^ 0x8000) as i16;
    if v == i16::MIN {
        Value::Null
    } else {
        Value::Int32(i32::from(v))
    }
}

/// Sign-flipped big-endian i32; all-zero raw bytes are NULL
pub fn decode_long(raw: [u8; 4]) -> Value {
    match flip_i32(raw) {
        Some(v) => Value::Int32(v),
        None => Value::Null,
    }
}

fn flip_i32(raw: [u8; 4]) -> Option<i32> {
    let bits = u32::from_be_bytes(raw);
    if bits == 0 {
        None
    } else {
        Some((bits ^ 0x8000_0000) as i32)
    }
}

/// Order-preserving f64 encoding; all-zero raw bytes are NULL
pub fn decode_number(raw: [u8; 8]) -> Option<f64> {
    let bits = u64::from_be_bytes(raw);
    if bits == 0 {
        return None;
    }
    let bits = if bits & 0x8000_0000_0000_0000 != 0 {
        bits & 0x7FFF_FFFF_FFFF_FFFF
    } else {
        !bits
    };
    Some(f64::from_bits(bits))
}

fn decode_currency(raw: [u8; 8], scale: u32) -> StorageResult<Value> {
    let Some(v) = decode_number(raw) else {
        return Ok(Value::Null);
    };
    let scale = if scale == 0 { DEFAULT_CURRENCY_SCALE } else { scale };
    Decimal::from_f64(v)
        .map(|d| Value::Decimal(d.round_dp(scale)))
        .ok_or_else(|| StorageError::decode_failed(format!("currency value {} out of range", v)))
}

/// Days counted from 0001-01-01 as day 1
fn decode_date(raw: [u8; 4]) -> StorageResult<Value> {
    let Some(days) = flip_i32(raw) else {
        return Ok(Value::Null);
    };
    NaiveDate::from_num_days_from_ce_opt(days)
        .map(Value::Date)
        .ok_or_else(|| StorageError::decode_failed(format!("date day number {} out of range", days)))
}

/// Milliseconds since midnight
fn decode_time(raw: [u8; 4]) -> StorageResult<Value> {
    let Some(ms) = flip_i32(raw) else {
        return Ok(Value::Null);
    };
    time_from_millis(i64::from(ms))
        .map(Value::Time)
        .ok_or_else(|| StorageError::decode_failed(format!("time {} ms out of range", ms)))
}

/// Milliseconds where day 1 is 0001-01-01
fn decode_timestamp(raw: [u8; 8]) -> StorageResult<Value> {
    let Some(ms) = decode_number(raw) else {
        return Ok(Value::Null);
    };
    let ms = ms as i64;
    let days = ms.div_euclid(MS_PER_DAY);
    let date = i32::try_from(days)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt);
    let time = time_from_millis(ms.rem_euclid(MS_PER_DAY));

    match (date, time) {
        (Some(date), Some(time)) => Ok(Value::Timestamp(NaiveDateTime::new(date, time))),
        _ => Err(StorageError::decode_failed(format!(
            "timestamp {} ms out of range",
            ms
        ))),
    }
}

fn time_from_millis(ms: i64) -> Option<NaiveTime> {
    if !(0..MS_PER_DAY).contains(&ms) {
        return None;
    }
    let secs = u32::try_from(ms / 1000).ok()?;
    let nanos = u32::try_from(ms % 1000).ok()? * 1_000_000;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
}

/// Trailing zero bytes are padding; empty text is NULL
pub fn decode_alpha(raw: &[u8], charset: Charset) -> Value {
    let end = raw.iter().rposition(|&b| b != 0).map(|i| i + 1).unwrap_or(0);
    if end == 0 {
        Value::Null
    } else {
        Value::Text(charset.decode(&raw[..end]))
    }
}

/// All-zero blocks are NULL; otherwise the bytes are kept untrimmed
pub fn decode_bytes(raw: &[u8]) -> Value {
    if raw.iter().all(|&b| b == 0) {
        Value::Null
    } else {
        Value::Bytes(raw.to_vec())
    }
}
