//! Cross-type value comparison
//!
//! One ordering function is shared by predicates, sorting and grouping.
//! Comparison walks a fixed type-precedence ladder; the first rung whose
//! type appears on either side decides, after coercing the other operand
//! from its textual form. A failed coercion skips the rung and the walk
//! continues; it never surfaces as an error.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use super::types::{Value, DATE_FORMAT, TIMESTAMP_FORMAT, TIME_FORMAT};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};

/// Precedence rungs, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rung {
    Bool,
    Int32,
    Int64,
    Decimal,
    Float64,
    Time,
    Timestamp,
    Date,
    Text,
    Bytes,
}

impl Rung {
    const LADDER: [Rung; 10] = [
        Rung::Bool,
        Rung::Int32,
        Rung::Int64,
        Rung::Decimal,
        Rung::Float64,
        Rung::Time,
        Rung::Timestamp,
        Rung::Date,
        Rung::Text,
        Rung::Bytes,
    ];

    fn name(&self) -> &'static str {
        match self {
            Rung::Bool => "BOOLEAN",
            Rung::Int32 => "INTEGER",
            Rung::Int64 => "BIGINT",
            Rung::Decimal => "DECIMAL",
            Rung::Float64 => "DOUBLE",
            Rung::Time => "TIME",
            Rung::Timestamp => "TIMESTAMP",
            Rung::Date => "DATE",
            Rung::Text => "VARCHAR",
            Rung::Bytes => "BINARY",
        }
    }

    fn holds(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Rung::Bool, Value::Bool(_))
                | (Rung::Int32, Value::Int32(_))
                | (Rung::Int64, Value::Int64(_))
                | (Rung::Decimal, Value::Decimal(_))
                | (Rung::Float64, Value::Float64(_))
                | (Rung::Time, Value::Time(_))
                | (Rung::Timestamp, Value::Timestamp(_))
                | (Rung::Date, Value::Date(_))
                | (Rung::Text, Value::Text(_))
                | (Rung::Bytes, Value::Bytes(_))
        )
    }

    /// Compares both operands at this rung, `None` if either fails to coerce
    fn compare(&self, a: &Value, b: &Value) -> Option<Ordering> {
        match self {
            Rung::Bool => Some(as_bool(a).cmp(&as_bool(b))),
            Rung::Int32 => Some(parsed::<i32>(a)?.cmp(&parsed::<i32>(b)?)),
            Rung::Int64 => Some(parsed::<i64>(a)?.cmp(&parsed::<i64>(b)?)),
            Rung::Decimal => Some(parsed::<Decimal>(a)?.cmp(&parsed::<Decimal>(b)?)),
            Rung::Float64 => parsed::<f64>(a)?.partial_cmp(&parsed::<f64>(b)?),
            Rung::Time => Some(as_time(a)?.cmp(&as_time(b)?)),
            Rung::Timestamp => Some(as_timestamp(a)?.cmp(&as_timestamp(b)?)),
            Rung::Date => Some(as_date(a)?.cmp(&as_date(b)?)),
            Rung::Text => Some(a.to_text()?.cmp(&b.to_text()?)),
            Rung::Bytes => {
                if as_bytes(a) == as_bytes(b) {
                    Some(Ordering::Equal)
                } else {
                    Some(Ordering::Less)
                }
            }
        }
    }
}

fn as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        other => other
            .to_text()
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false),
    }
}

fn parsed<T: FromStr>(value: &Value) -> Option<T> {
    value.to_text()?.trim().parse::<T>().ok()
}

fn as_time(value: &Value) -> Option<NaiveTime> {
    match value {
        Value::Time(t) => Some(*t),
        other => NaiveTime::parse_from_str(other.to_text()?.trim(), TIME_FORMAT).ok(),
    }
}

fn as_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Timestamp(ts) => Some(*ts),
        Value::Date(d) => d.and_hms_opt(0, 0, 0),
        other => NaiveDateTime::parse_from_str(other.to_text()?.trim(), TIMESTAMP_FORMAT).ok(),
    }
}

fn as_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        other => NaiveDate::parse_from_str(other.to_text()?.trim(), DATE_FORMAT).ok(),
    }
}

fn as_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::Bytes(b) => b.clone(),
        other => other.to_text().map(String::into_bytes).unwrap_or_default(),
    }
}

/// Total-order comparison over the dynamic value domain
pub struct ValuesComparator;

impl ValuesComparator {
    /// Compares two values
    ///
    /// NULL sorts before every non-null value here; callers that need a
    /// different null placement (sorting, predicates) handle NULL first.
    /// Non-equal byte arrays, and values no rung accepts, compare as `Less`.
    pub fn compare(a: &Value, b: &Value) -> Ordering {
        match (a.is_null(), b.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }

        for rung in Rung::LADDER {
            if !rung.holds(a) && !rung.holds(b) {
                continue;
            }
            match rung.compare(a, b) {
                Some(ordering) => return ordering,
                None => Self::log_fallback(rung, a, b),
            }
        }

        Ordering::Less
    }

    /// Evaluates `predicate` on the ordering of `a` and `b`
    ///
    /// Always false when either side is NULL.
    pub fn compare_with<F>(a: &Value, b: &Value, predicate: F) -> bool
    where
        F: Fn(Ordering) -> bool,
    {
        if a.is_null() || b.is_null() {
            return false;
        }
        predicate(Self::compare(a, b))
    }

    /// SQL equality: false when either side is NULL
    pub fn equals(a: &Value, b: &Value) -> bool {
        Self::compare_with(a, b, |o| o == Ordering::Equal)
    }

    /// Element-wise row equality where two NULLs are considered the same
    pub fn rows_equal(a: &[Value], b: &[Value]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(x, y)| match (x.is_null(), y.is_null()) {
                (true, true) => true,
                (false, false) => Self::compare(x, y) == Ordering::Equal,
                _ => false,
            })
    }

    fn log_fallback(rung: Rung, a: &Value, b: &Value) {
        if !Logger::enabled(Severity::Trace) {
            return;
        }
        let left = a.to_string();
        let right = b.to_string();
        log_event_with_fields(
            Event::ComparisonFallback,
            &[("rung", rung.name()), ("left", &left), ("right", &right)],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_rung_outranks_integer() {
        // 5 is not "true", so it coerces to false
        assert_eq!(
            ValuesComparator::compare(&Value::Bool(true), &Value::Int32(5)),
            Ordering::Greater
        );
        assert!(ValuesComparator::equals(
            &Value::Bool(true),
            &Value::Text("TRUE".into())
        ));
    }

    #[test]
    fn test_integer_against_numeric_text() {
        assert_eq!(
            ValuesComparator::compare(&Value::Int32(12), &Value::Text("12".into())),
            Ordering::Equal
        );
        assert_eq!(
            ValuesComparator::compare(&Value::Text("9".into()), &Value::Int32(12)),
            Ordering::Less
        );
    }

    #[test]
    fn test_float_skips_integer_rungs() {
        assert_eq!(
            ValuesComparator::compare(&Value::Float64(5.5), &Value::Int32(3)),
            Ordering::Greater
        );
        assert_eq!(
            ValuesComparator::compare(&Value::Int32(5), &Value::Float64(5.0)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_int64_widens_int32() {
        assert_eq!(
            ValuesComparator::compare(&Value::Int32(7), &Value::Int64(10_000_000_000)),
            Ordering::Less
        );
    }

    #[test]
    fn test_decimal_rung() {
        let price = Value::Decimal(Decimal::new(1050, 2));
        assert_eq!(
            ValuesComparator::compare(&price, &Value::Float64(10.5)),
            Ordering::Equal
        );
        assert_eq!(
            ValuesComparator::compare(&price, &Value::Int32(11)),
            Ordering::Less
        );
    }

    #[test]
    fn test_non_numeric_text_falls_through_to_string() {
        // "abc" fails the integer rung and is compared as text against "5"
        assert_eq!(
            ValuesComparator::compare(&Value::Text("abc".into()), &Value::Int32(5)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_dates_and_timestamps() {
        let d1 = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
        assert_eq!(
            ValuesComparator::compare(&Value::Date(d1), &Value::Date(d2)),
            Ordering::Less
        );
        assert_eq!(
            ValuesComparator::compare(&Value::Date(d1), &Value::Text("2020-01-01".into())),
            Ordering::Equal
        );

        let ts = d1.and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(
            ValuesComparator::compare(&Value::Timestamp(ts), &Value::Date(d1)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_times() {
        let t1 = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        assert_eq!(
            ValuesComparator::compare(&Value::Time(t1), &Value::Text("10:00:00".into())),
            Ordering::Less
        );
    }

    #[test]
    fn test_bytes_are_equality_only() {
        let a = Value::Bytes(vec![1, 2, 3]);
        let b = Value::Bytes(vec![1, 2, 4]);
        assert_eq!(ValuesComparator::compare(&a, &a.clone()), Ordering::Equal);
        assert_eq!(ValuesComparator::compare(&a, &b), Ordering::Less);
        assert_eq!(ValuesComparator::compare(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_null_predicates_are_false() {
        assert!(!ValuesComparator::equals(&Value::Null, &Value::Null));
        assert!(!ValuesComparator::equals(&Value::Null, &Value::Int32(1)));
        assert!(!ValuesComparator::compare_with(
            &Value::Int32(1),
            &Value::Null,
            |o| o != Ordering::Equal
        ));
    }

    #[test]
    fn test_rows_equal_treats_nulls_as_same() {
        let a = vec![Value::Int32(1), Value::Null];
        let b = vec![Value::Int64(1), Value::Null];
        assert!(ValuesComparator::rows_equal(&a, &b));
        assert!(!ValuesComparator::rows_equal(&a, &[Value::Int32(1)]));
    }
}
