//! Query executor subsystem for pdxsql
//!
//! Consumes compiled plans and produces deterministic result sets.
//!
//! # Execution Flow (strict order)
//!
//! 1. Load each table's planned fields through the catalog
//! 2. Filter the first table, join every later one (nested loops)
//! 3. Apply the residual condition
//! 4. Group/aggregate or project
//! 5. Sort, then DISTINCT, OFFSET and the row limit
//!
//! Any load, decode or evaluation failure aborts the query; no partial
//! result is returned.

mod errors;
mod evaluator;
mod executor;
mod functions;
mod grouping;
mod joins;
mod result;
mod sorter;

pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult};
pub use executor::ExecutionOptions;
pub use functions::{FunctionOutcome, FunctionRegistry, ReturnType, ScalarFunction};
pub use joins::JoinStep;
pub use result::{ResultColumn, ResultSet};
pub use sorter::ResultSorter;
