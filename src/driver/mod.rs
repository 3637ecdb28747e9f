//! Driver facade for pdxsql
//!
//! `Database` is the entry point for library users: open a table directory
//! (or wrap any `Catalog`), then prepare, query or explain statements.
//! Every failure surfaces as one `DriverError` carrying the stable code of
//! the subsystem that failed.

mod database;
mod errors;

pub use database::{Database, DatabaseOptions};
pub use errors::{DriverError, DriverResult, ErrorCategory};
