//! Result sorting for query execution
//!
//! Sorts projected rows by output columns. NULLs sort last ascending and
//! first descending. The sort is stable.

use std::cmp::Ordering;

use chrono::{NaiveDateTime, NaiveTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::planner::SortKey;
use crate::value::{Row, Value};

/// Sorts result rows
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts `rows` by `keys`, first key most significant
    pub fn sort(rows: &mut [Row], keys: &[SortKey]) {
        if keys.is_empty() {
            return;
        }
        rows.sort_by(|a, b| {
            for key in keys {
                let ordering = Self::compare_values(a.get(key.column), b.get(key.column));
                let ordering = if key.descending {
                    ordering.reverse()
                } else {
                    ordering
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    /// Ascending order of two cells, NULL (or missing) last
    ///
    /// Mixed-type pairs order by type class first (boolean, number,
    /// date/timestamp, time, text, binary) so the order stays total. Inside
    /// a class values compare natively, which matches `ValuesComparator`
    /// for same-type pairs.
    fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        let a = a.filter(|v| !v.is_null());
        let b = b.filter(|v| !v.is_null());

        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => type_class(x)
                .cmp(&type_class(y))
                .then_with(|| compare_in_class(x, y)),
        }
    }
}

fn type_class(value: &Value) -> u8 {
    match value {
        Value::Null | Value::Bool(_) => 0,
        Value::Int32(_) | Value::Int64(_) | Value::Decimal(_) | Value::Float64(_) => 1,
        Value::Date(_) | Value::Timestamp(_) => 2,
        Value::Time(_) => 3,
        Value::Text(_) => 4,
        Value::Bytes(_) => 5,
    }
}

/// Orders two values of the same class
fn compare_in_class(x: &Value, y: &Value) -> Ordering {
    match (x, y) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Time(a), Value::Time(b)) => a.cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
        _ => match (numeric_key(x), numeric_key(y)) {
            (Some(a), Some(b)) => a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)),
            _ => match (instant(x), instant(y)) {
                (Some(a), Some(b)) => a.cmp(&b).then_with(|| x.type_name().cmp(y.type_name())),
                _ => Ordering::Equal,
            },
        },
    }
}

/// Approximate value, refined by the exact decimal when one exists
fn numeric_key(value: &Value) -> Option<(f64, Option<Decimal>)> {
    match value {
        Value::Int32(n) => Some((f64::from(*n), Some(Decimal::from(*n)))),
        Value::Int64(n) => Some((*n as f64, Some(Decimal::from(*n)))),
        Value::Decimal(d) => Some((d.to_f64().unwrap_or(f64::NAN), Some(*d))),
        Value::Float64(f) => Some((*f, Decimal::from_f64(*f))),
        _ => None,
    }
}

fn instant(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Date(d) => Some(d.and_time(NaiveTime::MIN)),
        Value::Timestamp(ts) => Some(*ts),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asc(column: usize) -> SortKey {
        SortKey {
            column,
            descending: false,
        }
    }

    fn desc(column: usize) -> SortKey {
        SortKey {
            column,
            descending: true,
        }
    }

    fn ids(rows: &[Row]) -> Vec<Value> {
        rows.iter().map(|r| r[0].clone()).collect()
    }

    #[test]
    fn test_sort_ascending_nulls_last() {
        let mut rows = vec![
            vec![Value::Int32(3)],
            vec![Value::Null],
            vec![Value::Int32(1)],
        ];
        ResultSorter::sort(&mut rows, &[asc(0)]);
        assert_eq!(ids(&rows), vec![Value::Int32(1), Value::Int32(3), Value::Null]);
    }

    #[test]
    fn test_sort_descending_nulls_first() {
        let mut rows = vec![
            vec![Value::Int32(3)],
            vec![Value::Null],
            vec![Value::Int32(1)],
        ];
        ResultSorter::sort(&mut rows, &[desc(0)]);
        assert_eq!(ids(&rows), vec![Value::Null, Value::Int32(3), Value::Int32(1)]);
    }

    #[test]
    fn test_sort_stable_with_secondary_key() {
        let mut rows = vec![
            vec![Value::Int32(1), Value::from("b")],
            vec![Value::Int32(2), Value::from("a")],
            vec![Value::Int32(3), Value::from("b")],
            vec![Value::Int32(4), Value::from("a")],
        ];
        ResultSorter::sort(&mut rows, &[asc(1)]);
        assert_eq!(
            ids(&rows),
            vec![Value::Int32(2), Value::Int32(4), Value::Int32(1), Value::Int32(3)]
        );

        ResultSorter::sort(&mut rows, &[asc(1), desc(0)]);
        assert_eq!(
            ids(&rows),
            vec![Value::Int32(4), Value::Int32(2), Value::Int32(3), Value::Int32(1)]
        );
    }

    #[test]
    fn test_sort_mixed_numeric_types() {
        let mut rows = vec![
            vec![Value::Float64(2.5)],
            vec![Value::Int64(10)],
            vec![Value::Int32(2)],
        ];
        ResultSorter::sort(&mut rows, &[asc(0)]);
        assert_eq!(
            ids(&rows),
            vec![Value::Int32(2), Value::Float64(2.5), Value::Int64(10)]
        );
    }

    #[test]
    fn test_sort_mixed_text_and_numbers_is_consistent() {
        let expected = vec![Value::Int32(9), Value::from("10"), Value::from("9")];

        let mut rows = vec![
            vec![Value::from("10")],
            vec![Value::from("9")],
            vec![Value::Int32(9)],
        ];
        ResultSorter::sort(&mut rows, &[asc(0)]);
        assert_eq!(ids(&rows), expected);

        let mut rows = vec![
            vec![Value::Int32(9)],
            vec![Value::from("9")],
            vec![Value::from("10")],
        ];
        ResultSorter::sort(&mut rows, &[asc(0)]);
        assert_eq!(ids(&rows), expected);

        ResultSorter::sort(&mut rows, &[desc(0)]);
        assert_eq!(ids(&rows), expected.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_compare_values_is_transitive() {
        let values = vec![
            Value::from("10"),
            Value::from("9"),
            Value::from("abc"),
            Value::Int32(9),
            Value::Int64(10),
            Value::Float64(9.5),
            Value::Decimal(Decimal::new(95, 1)),
            Value::Bool(true),
            Value::Bytes(vec![1]),
            Value::Date(chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
            Value::Null,
        ];
        let cmp = |a: &Value, b: &Value| ResultSorter::compare_values(Some(a), Some(b));
        for a in &values {
            for b in &values {
                assert_eq!(cmp(a, b), cmp(b, a).reverse());
                for c in &values {
                    if cmp(a, b) != Ordering::Greater && cmp(b, c) != Ordering::Greater {
                        assert_ne!(cmp(a, c), Ordering::Greater);
                    }
                }
            }
        }
    }

    #[test]
    fn test_sort_bytes() {
        let mut rows = vec![vec![Value::Bytes(vec![2])], vec![Value::Bytes(vec![1, 9])]];
        ResultSorter::sort(&mut rows, &[asc(0)]);
        assert_eq!(rows[0][0], Value::Bytes(vec![1, 9]));
    }
}
