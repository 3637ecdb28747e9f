//! Query executor for pdxsql
//!
//! Runs a `CompiledPlan` against a catalog.
//!
//! Execution flow (strict order):
//! 1. Check the supplied parameters against the plan
//! 2. Per table in FROM order: load the planned fields, then filter (first
//!    table) or join (later tables) with the table's pushed filter
//! 3. Apply the residual condition to the joined rows
//! 4. Group and aggregate, or project
//! 5. Sort
//! 6. DISTINCT, OFFSET and the effective row limit
//!
//! Plans without grouping or sorting stream: rows are projected as they
//! pass the residual and production stops once the limit is reached.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::observability::{log_event_with_fields, Event};
use crate::planner::{CompiledPlan, Projection};
use crate::value::{Row, Value, ValuesComparator};

use super::errors::{ExecutorError, ExecutorResult};
use super::grouping;
use super::joins::JoinStep;
use super::result::ResultSet;
use super::sorter::ResultSorter;

/// Caller-side execution settings
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    /// Row cap applied on top of the statement's LIMIT; 0 is unlimited
    pub max_rows: usize,
    /// Checked before each table is loaded
    pub cancel: Option<Arc<AtomicBool>>,
}

impl ExecutionOptions {
    pub fn with_max_rows(max_rows: usize) -> Self {
        Self {
            max_rows,
            cancel: None,
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }
}

impl CompiledPlan {
    /// Executes the plan; `max_rows` 0 means no caller-side cap
    ///
    /// Deterministic: the same plan over the same data yields the same rows.
    pub fn execute(&self, catalog: &dyn Catalog, params: &[Value], max_rows: usize) -> ExecutorResult<ResultSet> {
        self.execute_with(catalog, params, &ExecutionOptions::with_max_rows(max_rows))
    }

    /// Executes the plan with explicit options
    pub fn execute_with(
        &self,
        catalog: &dyn Catalog,
        params: &[Value],
        options: &ExecutionOptions,
    ) -> ExecutorResult<ResultSet> {
        if params.len() < self.parameter_count {
            return Err(ExecutorError::missing_parameter(self.parameter_count, params.len()));
        }

        let rows = self.join_tables(catalog, params, options)?;
        let limit = effective_limit(self.limit, options.max_rows);

        let rows = if self.is_streaming() {
            self.stream(rows, params, limit)?
        } else {
            self.materialize(rows, params, limit)?
        };

        Ok(ResultSet {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Loads every table and combines it with the rows accumulated so far
    fn join_tables(
        &self,
        catalog: &dyn Catalog,
        params: &[Value],
        options: &ExecutionOptions,
    ) -> ExecutorResult<Vec<Row>> {
        // Zero tables: a single empty row feeds literal-only projections.
        let mut rows: Vec<Row> = vec![Vec::new()];

        for (i, table) in self.tables.iter().enumerate() {
            if options.cancelled() {
                log_event_with_fields(Event::QueryCancelled, &[("table", &table.label)]);
                return Err(ExecutorError::cancelled(&table.label));
            }

            let loaded = catalog
                .load_rows(&table.table, &table.load)
                .map_err(|e| ExecutorError::load_failed(&table.table.name, e))?;
            let loaded_count = loaded.len().to_string();
            log_event_with_fields(
                Event::TableLoaded,
                &[("table", &table.table.name), ("rows", &loaded_count)],
            );

            let step = JoinStep {
                join: table.join,
                filter: table.filter.as_ref(),
                params,
                left_width: table.offset,
                right_width: table.load.len(),
            };
            rows = if i == 0 {
                step.filter_rows(loaded)?
            } else {
                let joined = step.apply(rows, &loaded)?;
                let joined_count = joined.len().to_string();
                log_event_with_fields(
                    Event::JoinCompleted,
                    &[
                        ("table", &table.label),
                        ("join", table.join.as_str()),
                        ("rows", &joined_count),
                    ],
                );
                joined
            };
        }
        Ok(rows)
    }

    fn passes_residual(&self, row: &[Value], params: &[Value]) -> ExecutorResult<bool> {
        match &self.residual {
            Some(residual) => residual.evaluate(row, params),
            None => Ok(true),
        }
    }

    fn project(&self, row: &[Value], params: &[Value]) -> ExecutorResult<Row> {
        self.projection
            .iter()
            .map(|p| match p {
                Projection::Value(operand) => operand.evaluate(row, params).map(|v| v.into_owned()),
                // Ungrouped plans have no aggregates
                Projection::Aggregate(_) => Ok(Value::Null),
            })
            .collect()
    }

    /// Residual, projection, DISTINCT, then stop at OFFSET + limit
    fn stream(&self, rows: Vec<Row>, params: &[Value], limit: Option<usize>) -> ExecutorResult<Vec<Row>> {
        let stop = limit.map(|l| l.saturating_add(self.offset));
        let mut out: Vec<Row> = Vec::new();

        for row in rows {
            if stop.map_or(false, |s| out.len() >= s) {
                break;
            }
            if !self.passes_residual(&row, params)? {
                continue;
            }
            let projected = self.project(&row, params)?;
            if self.distinct && out.iter().any(|seen| ValuesComparator::rows_equal(seen, &projected)) {
                continue;
            }
            out.push(projected);
        }

        out.drain(..self.offset.min(out.len()));
        Ok(out)
    }

    fn materialize(&self, rows: Vec<Row>, params: &[Value], limit: Option<usize>) -> ExecutorResult<Vec<Row>> {
        let mut filtered = Vec::with_capacity(rows.len());
        for row in rows {
            if self.passes_residual(&row, params)? {
                filtered.push(row);
            }
        }

        let mut out = match &self.grouping {
            Some(grouping) => {
                grouping::aggregate(filtered, grouping, &self.projection, params, self.row_width)?
            }
            None => filtered
                .iter()
                .map(|row| self.project(row, params))
                .collect::<ExecutorResult<Vec<_>>>()?,
        };

        ResultSorter::sort(&mut out, &self.sort_keys);

        if self.distinct {
            let mut unique: Vec<Row> = Vec::with_capacity(out.len());
            for row in out {
                if !unique.iter().any(|seen| ValuesComparator::rows_equal(seen, &row)) {
                    unique.push(row);
                }
            }
            out = unique;
        }

        out.drain(..self.offset.min(out.len()));
        if let Some(limit) = limit {
            out.truncate(limit);
        }
        Ok(out)
    }
}

/// Smaller of the statement limit and the caller cap (0 = none)
fn effective_limit(statement: Option<usize>, max_rows: usize) -> Option<usize> {
    let cap = (max_rows > 0).then_some(max_rows);
    match (statement, cap) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
