//! GROUP BY and aggregate evaluation
//!
//! Groups are kept in first-seen order and looked up linearly with
//! NULL-equal row comparison, so NULL keys form a single group.

use rust_decimal::Decimal;

use super::errors::{ExecutorError, ExecutorResult};
use crate::planner::{AggregateFunc, BoundAggregate, Grouping, Projection};
use crate::value::{Row, Value, ValuesComparator, ValuesConverter};

/// Running SUM, widened as needed
#[derive(Debug, Clone, Copy, PartialEq)]
enum Sum {
    Empty,
    Int(i64),
    Decimal(Decimal),
    Float(f64),
}

impl Sum {
    fn add(self, value: &Value) -> ExecutorResult<Sum> {
        let overflow = || ExecutorError::execution_failed("numeric overflow in SUM/AVG");
        Ok(match value {
            Value::Int32(_) | Value::Int64(_) => {
                let n = match value {
                    Value::Int32(n) => i64::from(*n),
                    Value::Int64(n) => *n,
                    _ => 0,
                };
                match self {
                    Sum::Empty => Sum::Int(n),
                    Sum::Int(acc) => Sum::Int(acc.checked_add(n).ok_or_else(overflow)?),
                    Sum::Decimal(acc) => {
                        Sum::Decimal(acc.checked_add(Decimal::from(n)).ok_or_else(overflow)?)
                    }
                    Sum::Float(acc) => Sum::Float(acc + n as f64),
                }
            }
            Value::Decimal(d) => match self {
                Sum::Empty => Sum::Decimal(*d),
                Sum::Int(acc) => Sum::Decimal(Decimal::from(acc).checked_add(*d).ok_or_else(overflow)?),
                Sum::Decimal(acc) => Sum::Decimal(acc.checked_add(*d).ok_or_else(overflow)?),
                Sum::Float(acc) => Sum::Float(acc + as_f64(value)?),
            },
            other => {
                let f = as_f64(other)?;
                match self {
                    Sum::Empty => Sum::Float(f),
                    Sum::Int(acc) => Sum::Float(acc as f64 + f),
                    Sum::Decimal(acc) => Sum::Float(as_f64(&Value::Decimal(acc))? + f),
                    Sum::Float(acc) => Sum::Float(acc + f),
                }
            }
        })
    }

    fn total(self) -> Value {
        match self {
            Sum::Empty => Value::Null,
            Sum::Int(n) => Value::Int64(n),
            Sum::Decimal(d) => Value::Decimal(d),
            Sum::Float(f) => Value::Float64(f),
        }
    }

    fn average(self, count: i64) -> ExecutorResult<Value> {
        if count == 0 {
            return Ok(Value::Null);
        }
        Ok(match self {
            Sum::Empty => Value::Null,
            Sum::Int(n) => Value::Float64(n as f64 / count as f64),
            Sum::Decimal(d) => Value::Decimal(
                d.checked_div(Decimal::from(count))
                    .ok_or_else(|| ExecutorError::execution_failed("numeric overflow in AVG"))?,
            ),
            Sum::Float(f) => Value::Float64(f / count as f64),
        })
    }
}

fn as_f64(value: &Value) -> ExecutorResult<f64> {
    ValuesConverter::to_f64(value)?
        .ok_or_else(|| ExecutorError::execution_failed("cannot aggregate NULL"))
}

/// State of one aggregate within one group
#[derive(Debug, Clone)]
enum Accumulator {
    Count(i64),
    Sum(Sum),
    Avg(Sum, i64),
    Min(Option<Value>),
    Max(Option<Value>),
}

impl Accumulator {
    fn new(aggregate: &BoundAggregate) -> Self {
        match aggregate.func {
            AggregateFunc::Count => Accumulator::Count(0),
            AggregateFunc::Sum => Accumulator::Sum(Sum::Empty),
            AggregateFunc::Avg => Accumulator::Avg(Sum::Empty, 0),
            AggregateFunc::Min => Accumulator::Min(None),
            AggregateFunc::Max => Accumulator::Max(None),
        }
    }

    fn update(&mut self, aggregate: &BoundAggregate, row: &[Value], params: &[Value]) -> ExecutorResult<()> {
        let Some(arg) = &aggregate.arg else {
            // COUNT(*)
            if let Accumulator::Count(n) = self {
                *n += 1;
            }
            return Ok(());
        };
        let value = arg.evaluate(row, params)?;
        if value.is_null() {
            return Ok(());
        }

        match self {
            Accumulator::Count(n) => *n += 1,
            Accumulator::Sum(sum) => *sum = sum.add(&value)?,
            Accumulator::Avg(sum, n) => {
                *sum = sum.add(&value)?;
                *n += 1;
            }
            Accumulator::Min(current) => {
                if current
                    .as_ref()
                    .map_or(true, |c| ValuesComparator::compare(&value, c).is_lt())
                {
                    *current = Some(value.into_owned());
                }
            }
            Accumulator::Max(current) => {
                if current
                    .as_ref()
                    .map_or(true, |c| ValuesComparator::compare(&value, c).is_gt())
                {
                    *current = Some(value.into_owned());
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> ExecutorResult<Value> {
        Ok(match self {
            Accumulator::Count(n) => Value::Int64(n),
            Accumulator::Sum(sum) => sum.total(),
            Accumulator::Avg(sum, n) => sum.average(n)?,
            Accumulator::Min(v) | Accumulator::Max(v) => v.unwrap_or(Value::Null),
        })
    }
}

struct Group {
    key: Row,
    first: Row,
    accumulators: Vec<Accumulator>,
}

/// Groups `rows` and produces one projected row per group
///
/// Without GROUP BY keys every row falls into one group, which exists even
/// when there are no rows (`COUNT(*)` of an empty table is 0).
pub fn aggregate(
    rows: Vec<Row>,
    grouping: &Grouping,
    projection: &[Projection],
    params: &[Value],
    row_width: usize,
) -> ExecutorResult<Vec<Row>> {
    let fresh = || grouping.aggregates.iter().map(Accumulator::new).collect::<Vec<_>>();
    let mut groups: Vec<Group> = Vec::new();

    for row in rows {
        let key = grouping
            .keys
            .iter()
            .map(|k| k.evaluate(&row, params).map(|v| v.into_owned()))
            .collect::<ExecutorResult<Row>>()?;
        let index = match groups
            .iter()
            .position(|g| ValuesComparator::rows_equal(&g.key, &key))
        {
            Some(i) => i,
            None => {
                groups.push(Group {
                    key,
                    first: row.clone(),
                    accumulators: fresh(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        for (acc, agg) in group.accumulators.iter_mut().zip(&grouping.aggregates) {
            acc.update(agg, &row, params)?;
        }
    }

    if groups.is_empty() && grouping.keys.is_empty() {
        groups.push(Group {
            key: Vec::new(),
            first: vec![Value::Null; row_width],
            accumulators: fresh(),
        });
    }

    let mut out = Vec::with_capacity(groups.len());
    for group in groups {
        let values = group
            .accumulators
            .into_iter()
            .map(Accumulator::finish)
            .collect::<ExecutorResult<Vec<_>>>()?;
        let mut projected = Vec::with_capacity(projection.len());
        for p in projection {
            projected.push(match p {
                Projection::Value(operand) => operand.evaluate(&group.first, params)?.into_owned(),
                Projection::Aggregate(i) => values.get(*i).cloned().unwrap_or(Value::Null),
            });
        }
        out.push(projected);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::BoundOperand;

    fn agg(func: AggregateFunc, slot: Option<usize>) -> BoundAggregate {
        BoundAggregate {
            func,
            arg: slot.map(BoundOperand::Slot),
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            vec![Value::from("a"), Value::Int32(1)],
            vec![Value::from("b"), Value::Int32(5)],
            vec![Value::from("a"), Value::Null],
            vec![Value::Null, Value::Int32(2)],
            vec![Value::from("a"), Value::Int32(3)],
        ]
    }

    #[test]
    fn test_group_by_with_aggregates() {
        let grouping = Grouping {
            keys: vec![BoundOperand::Slot(0)],
            key_names: vec!["k".into()],
            aggregates: vec![
                agg(AggregateFunc::Count, None),
                agg(AggregateFunc::Count, Some(1)),
                agg(AggregateFunc::Sum, Some(1)),
                agg(AggregateFunc::Max, Some(1)),
            ],
        };
        let projection = vec![
            Projection::Value(BoundOperand::Slot(0)),
            Projection::Aggregate(0),
            Projection::Aggregate(1),
            Projection::Aggregate(2),
            Projection::Aggregate(3),
        ];
        let out = aggregate(rows(), &grouping, &projection, &[], 2).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(
            out[0],
            vec![
                Value::from("a"),
                Value::Int64(3),
                Value::Int64(2),
                Value::Int64(4),
                Value::Int32(3)
            ]
        );
        assert_eq!(out[2][0], Value::Null);
        assert_eq!(out[2][3], Value::Int64(2));
    }

    #[test]
    fn test_empty_input_without_keys() {
        let grouping = Grouping {
            keys: vec![],
            key_names: vec![],
            aggregates: vec![agg(AggregateFunc::Count, None), agg(AggregateFunc::Min, Some(1))],
        };
        let projection = vec![Projection::Aggregate(0), Projection::Aggregate(1)];
        let out = aggregate(Vec::new(), &grouping, &projection, &[], 2).unwrap();
        assert_eq!(out, vec![vec![Value::Int64(0), Value::Null]]);
    }

    #[test]
    fn test_empty_input_with_keys() {
        let grouping = Grouping {
            keys: vec![BoundOperand::Slot(0)],
            key_names: vec!["k".into()],
            aggregates: vec![agg(AggregateFunc::Count, None)],
        };
        let out = aggregate(Vec::new(), &grouping, &[Projection::Aggregate(0)], &[], 2).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_avg_and_decimal_sum() {
        let grouping = Grouping {
            keys: vec![],
            key_names: vec![],
            aggregates: vec![agg(AggregateFunc::Avg, Some(0)), agg(AggregateFunc::Sum, Some(1))],
        };
        let input = vec![
            vec![Value::Int32(1), Value::Decimal(Decimal::new(150, 2))],
            vec![Value::Int32(2), Value::Decimal(Decimal::new(250, 2))],
        ];
        let projection = vec![Projection::Aggregate(0), Projection::Aggregate(1)];
        let out = aggregate(input, &grouping, &projection, &[], 2).unwrap();
        assert_eq!(out[0][0], Value::Float64(1.5));
        assert_eq!(out[0][1], Value::Decimal(Decimal::new(400, 2)));
    }

    #[test]
    fn test_sum_overflow_fails() {
        let grouping = Grouping {
            keys: vec![],
            key_names: vec![],
            aggregates: vec![agg(AggregateFunc::Sum, Some(0))],
        };
        let input = vec![vec![Value::Int64(i64::MAX)], vec![Value::Int64(1)]];
        assert!(aggregate(input, &grouping, &[Projection::Aggregate(0)], &[], 1).is_err());
    }
}
