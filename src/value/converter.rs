//! Best-effort coercion of dynamic values into concrete types
//!
//! Every conversion returns `Ok(None)` for NULL only. A non-null value that
//! cannot be coerced is an error for the caller to handle.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use super::errors::{ConversionError, ConversionResult};
use super::types::{Value, DATE_FORMAT, TIMESTAMP_FORMAT, TIME_FORMAT};

/// Target-typed conversions over `Value`
pub struct ValuesConverter;

impl ValuesConverter {
    pub fn to_bool(value: &Value) -> ConversionResult<Option<bool>> {
        let b = match value {
            Value::Null => return Ok(None),
            Value::Bool(b) => *b,
            Value::Int32(v) => *v != 0,
            Value::Int64(v) => *v != 0,
            Value::Float64(v) => *v != 0.0,
            Value::Decimal(d) => !d.is_zero(),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => true,
                "false" | "f" | "0" => false,
                _ => return Err(unparsable("BOOLEAN", value)),
            },
            other => return Err(incompatible(other, "BOOLEAN")),
        };
        Ok(Some(b))
    }

    /// Narrowing from wider numerics truncates
    pub fn to_int32(value: &Value) -> ConversionResult<Option<i32>> {
        let v = match value {
            Value::Null => return Ok(None),
            Value::Int32(v) => *v,
            other => match Self::to_int64(other)? {
                Some(wide) => wide as i32,
                None => return Ok(None),
            },
        };
        Ok(Some(v))
    }

    pub fn to_int64(value: &Value) -> ConversionResult<Option<i64>> {
        let v = match value {
            Value::Null => return Ok(None),
            Value::Bool(b) => i64::from(*b),
            Value::Int32(v) => i64::from(*v),
            Value::Int64(v) => *v,
            Value::Float64(v) => v.trunc() as i64,
            Value::Decimal(d) => d
                .trunc()
                .to_i64()
                .ok_or_else(|| out_of_range("BIGINT", value))?,
            Value::Text(s) => {
                let s = s.trim();
                match s.parse::<i64>() {
                    Ok(v) => v,
                    Err(_) => Decimal::from_str(s)
                        .ok()
                        .and_then(|d| d.trunc().to_i64())
                        .ok_or_else(|| unparsable("BIGINT", value))?,
                }
            }
            other => return Err(incompatible(other, "BIGINT")),
        };
        Ok(Some(v))
    }

    pub fn to_f64(value: &Value) -> ConversionResult<Option<f64>> {
        let v = match value {
            Value::Null => return Ok(None),
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Int32(v) => f64::from(*v),
            Value::Int64(v) => *v as f64,
            Value::Float64(v) => *v,
            Value::Decimal(d) => d.to_f64().ok_or_else(|| out_of_range("DOUBLE", value))?,
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| unparsable("DOUBLE", value))?,
            other => return Err(incompatible(other, "DOUBLE")),
        };
        Ok(Some(v))
    }

    pub fn to_decimal(value: &Value) -> ConversionResult<Option<Decimal>> {
        let v = match value {
            Value::Null => return Ok(None),
            Value::Bool(b) => Decimal::from(u8::from(*b)),
            Value::Int32(v) => Decimal::from(*v),
            Value::Int64(v) => Decimal::from(*v),
            Value::Float64(v) => {
                Decimal::from_f64(*v).ok_or_else(|| out_of_range("DECIMAL", value))?
            }
            Value::Decimal(d) => *d,
            Value::Text(s) => {
                let s = s.trim();
                Decimal::from_str(s)
                    .or_else(|_| Decimal::from_scientific(s))
                    .map_err(|_| unparsable("DECIMAL", value))?
            }
            other => return Err(incompatible(other, "DECIMAL")),
        };
        Ok(Some(v))
    }

    pub fn to_date(value: &Value) -> ConversionResult<Option<NaiveDate>> {
        let v = match value {
            Value::Null => return Ok(None),
            Value::Date(d) => *d,
            Value::Timestamp(ts) => ts.date(),
            Value::Text(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .or_else(|_| {
                    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).map(|ts| ts.date())
                })
                .map_err(|_| unparsable("DATE", value))?,
            other => return Err(incompatible(other, "DATE")),
        };
        Ok(Some(v))
    }

    pub fn to_time(value: &Value) -> ConversionResult<Option<NaiveTime>> {
        let v = match value {
            Value::Null => return Ok(None),
            Value::Time(t) => *t,
            Value::Timestamp(ts) => ts.time(),
            Value::Text(s) => NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
                .map_err(|_| unparsable("TIME", value))?,
            other => return Err(incompatible(other, "TIME")),
        };
        Ok(Some(v))
    }

    /// Dates become midnight timestamps
    pub fn to_timestamp(value: &Value) -> ConversionResult<Option<NaiveDateTime>> {
        let v = match value {
            Value::Null => return Ok(None),
            Value::Timestamp(ts) => *ts,
            Value::Date(d) => d
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| out_of_range("TIMESTAMP", value))?,
            Value::Text(s) => NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
                .or_else(|_| {
                    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                        .map(|d| d.and_time(NaiveTime::MIN))
                })
                .map_err(|_| unparsable("TIMESTAMP", value))?,
            other => return Err(incompatible(other, "TIMESTAMP")),
        };
        Ok(Some(v))
    }

    /// Any non-null value has a textual form
    pub fn to_text(value: &Value) -> ConversionResult<Option<String>> {
        Ok(value.to_text())
    }

    /// Text becomes its UTF-8 bytes
    pub fn to_bytes(value: &Value) -> ConversionResult<Option<Vec<u8>>> {
        let v = match value {
            Value::Null => return Ok(None),
            Value::Bytes(b) => b.clone(),
            Value::Text(s) => s.as_bytes().to_vec(),
            other => return Err(incompatible(other, "BINARY")),
        };
        Ok(Some(v))
    }
}

fn display(value: &Value) -> String {
    value.to_text().unwrap_or_else(|| "NULL".to_string())
}

fn incompatible(value: &Value, target: &'static str) -> ConversionError {
    ConversionError::Incompatible {
        from: value.type_name(),
        target,
        value: display(value),
    }
}

fn unparsable(target: &'static str, value: &Value) -> ConversionError {
    ConversionError::Unparsable {
        target,
        value: display(value),
    }
}

fn out_of_range(target: &'static str, value: &Value) -> ConversionError {
    ConversionError::OutOfRange {
        target,
        value: display(value),
    }
}
