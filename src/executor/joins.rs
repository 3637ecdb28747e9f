//! Nested-loop joins
//!
//! Every join combines the accumulated rows (left) with one newly loaded
//! table (right). Combined rows are always `left ++ right`, whatever the
//! join type, so bound slots stay valid. The table's join filter is
//! evaluated on the combined row. Cost is O(left x right) per table.

use super::errors::ExecutorResult;
use crate::planner::{BoundCondition, JoinType};
use crate::value::{Row, Value};

/// Shape of one join step
pub struct JoinStep<'a> {
    pub join: JoinType,
    pub filter: Option<&'a BoundCondition>,
    pub params: &'a [Value],
    /// Width of the accumulated rows
    pub left_width: usize,
    /// Width of the new table's rows
    pub right_width: usize,
}

impl JoinStep<'_> {
    /// Combines `left` with `right` according to the join type
    pub fn apply(&self, left: Vec<Row>, right: &[Row]) -> ExecutorResult<Vec<Row>> {
        match self.join {
            JoinType::Cross | JoinType::Inner => self.inner(&left, right),
            JoinType::Left => self.left(&left, right),
            JoinType::Right => self.right(&left, right),
            JoinType::Full => self.full(&left, right),
        }
    }

    /// Keeps the rows of a single table that pass its filter
    pub fn filter_rows(&self, rows: Vec<Row>) -> ExecutorResult<Vec<Row>> {
        let Some(filter) = self.filter else {
            return Ok(rows);
        };
        let mut kept = Vec::with_capacity(rows.len());
        for row in rows {
            if filter.evaluate(&row, self.params)? {
                kept.push(row);
            }
        }
        Ok(kept)
    }

    fn passes(&self, row: &[Value]) -> ExecutorResult<bool> {
        match self.filter {
            Some(filter) => filter.evaluate(row, self.params),
            None => Ok(true),
        }
    }

    fn inner(&self, left: &[Row], right: &[Row]) -> ExecutorResult<Vec<Row>> {
        let mut out = Vec::new();
        for l in left {
            for r in right {
                let row = combine(l, r);
                if self.passes(&row)? {
                    out.push(row);
                }
            }
        }
        Ok(out)
    }

    fn left(&self, left: &[Row], right: &[Row]) -> ExecutorResult<Vec<Row>> {
        let nulls = null_row(self.right_width);
        let mut out = Vec::new();
        for l in left {
            let mut matched = false;
            for r in right {
                let row = combine(l, r);
                if self.passes(&row)? {
                    out.push(row);
                    matched = true;
                }
            }
            if !matched {
                out.push(combine(l, &nulls));
            }
        }
        Ok(out)
    }

    fn right(&self, left: &[Row], right: &[Row]) -> ExecutorResult<Vec<Row>> {
        let nulls = null_row(self.left_width);
        let mut out = Vec::new();
        for r in right {
            let mut matched = false;
            for l in left {
                let row = combine(l, r);
                if self.passes(&row)? {
                    out.push(row);
                    matched = true;
                }
            }
            if !matched {
                out.push(combine(&nulls, r));
            }
        }
        Ok(out)
    }

    /// LEFT join plus one NULL-extended row per never-matched right row
    fn full(&self, left: &[Row], right: &[Row]) -> ExecutorResult<Vec<Row>> {
        let right_nulls = null_row(self.right_width);
        let mut matched_right = vec![false; right.len()];
        let mut out = Vec::new();
        for l in left {
            let mut matched = false;
            for (j, r) in right.iter().enumerate() {
                let row = combine(l, r);
                if self.passes(&row)? {
                    out.push(row);
                    matched = true;
                    matched_right[j] = true;
                }
            }
            if !matched {
                out.push(combine(l, &right_nulls));
            }
        }

        let left_nulls = null_row(self.left_width);
        for (r, _) in right.iter().zip(&matched_right).filter(|(_, &m)| !m) {
            out.push(combine(&left_nulls, r));
        }
        Ok(out)
    }
}

fn combine(left: &[Value], right: &[Value]) -> Row {
    let mut row = Vec::with_capacity(left.len() + right.len());
    row.extend_from_slice(left);
    row.extend_from_slice(right);
    row
}

fn null_row(width: usize) -> Row {
    vec![Value::Null; width]
}
