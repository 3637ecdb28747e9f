//! pdxsql - a read-only SQL driver over Paradox-style desktop database files
//!
//! Decodes table, memo and blob files into typed rows and runs typed
//! SELECT statements over them: join-condition pushdown, nested-loop
//! joins, grouping, sorting and DISTINCT.

pub mod catalog;
pub mod cli;
pub mod driver;
pub mod executor;
pub mod observability;
pub mod planner;
pub mod storage;
pub mod value;

pub use driver::{Database, DatabaseOptions, DriverError, DriverResult};
pub use value::{Row, Value};
