//! Database facade
//!
//! Ties a catalog, the scalar function registry and the caller's limits
//! together. One `Database` may run any number of queries; each query
//! compiles and executes to completion before returning.

use std::path::PathBuf;
use std::sync::Arc;

use super::errors::{DriverError, DriverResult};
use crate::catalog::{Catalog, DirectoryCatalog, Table};
use crate::executor::{ExecutionOptions, FunctionRegistry, ResultSet};
use crate::observability::{Logger, ObservationScope, Severity};
use crate::planner::{CompiledPlan, ExplainPlan, PlanContext, SelectPlan, SelectStatement};
use crate::storage::Charset;
use crate::value::Value;

/// Programmatic driver settings
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub data_dir: PathBuf,
    pub charset: Charset,
    /// 0 is unlimited
    pub max_rows: usize,
    pub log_level: Severity,
}

impl DatabaseOptions {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            charset: Charset::Windows1252,
            max_rows: 0,
            log_level: Severity::Info,
        }
    }

    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn log_level(mut self, level: Severity) -> Self {
        self.log_level = level;
        self
    }
}

pub struct Database {
    catalog: Box<dyn Catalog>,
    functions: FunctionRegistry,
    max_rows: usize,
}

impl Database {
    /// Opens the table directory described by `options`
    pub fn open(options: DatabaseOptions) -> DriverResult<Self> {
        if options.data_dir.as_os_str().is_empty() {
            return Err(DriverError::config("data_dir must not be empty"));
        }
        Logger::set_min_severity(options.log_level);

        let catalog = DirectoryCatalog::open(&options.data_dir, options.charset)?;
        Ok(Self {
            catalog: Box::new(catalog),
            functions: FunctionRegistry::with_builtins(),
            max_rows: options.max_rows,
        })
    }

    /// Wraps any catalog, with the built-in functions and no row cap
    pub fn with_catalog(catalog: impl Catalog + 'static) -> Self {
        Self {
            catalog: Box::new(catalog),
            functions: FunctionRegistry::with_builtins(),
            max_rows: 0,
        }
    }

    pub fn set_max_rows(&mut self, max_rows: usize) {
        self.max_rows = max_rows;
    }

    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    /// Registry used when binding function calls; register custom
    /// functions here before preparing statements
    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    pub fn tables(&self) -> Vec<Arc<Table>> {
        self.catalog.tables()
    }

    /// Tables matching a LIKE-style name pattern
    pub fn find_tables(&self, pattern: &str) -> DriverResult<Vec<Arc<Table>>> {
        Ok(self.catalog.find_tables(pattern)?)
    }

    /// Compiles `statement` into a reusable plan
    pub fn prepare(&self, statement: &SelectStatement) -> DriverResult<CompiledPlan> {
        let ctx = PlanContext {
            catalog: self.catalog.as_ref(),
            functions: &self.functions,
        };
        Ok(SelectPlan::build(statement, &ctx)?.compile()?)
    }

    /// Compiles and runs `statement`
    pub fn query(&self, statement: &SelectStatement, params: &[Value]) -> DriverResult<ResultSet> {
        self.query_with(
            statement,
            params,
            &ExecutionOptions::with_max_rows(self.max_rows),
        )
    }

    /// Compiles and runs `statement` with explicit execution options
    pub fn query_with(
        &self,
        statement: &SelectStatement,
        params: &[Value],
        options: &ExecutionOptions,
    ) -> DriverResult<ResultSet> {
        let table_count = statement.tables.len().to_string();
        let scope = ObservationScope::with_fields("QUERY", &[("tables", &table_count)]);

        let outcome = self
            .prepare(statement)
            .and_then(|plan| {
                plan.execute_with(self.catalog.as_ref(), params, options)
                    .map_err(DriverError::from)
            });

        match &outcome {
            Ok(result) => scope.complete_with_fields(&[("rows", &result.len().to_string())]),
            Err(e) => scope.fail_with_fields(
                e.code(),
                &e.message(),
                &[("category", e.category().as_str())],
            ),
        }
        outcome
    }

    /// Explains `statement`; compilation failures become a rejected plan
    pub fn explain(&self, statement: &SelectStatement) -> ExplainPlan {
        let ctx = PlanContext {
            catalog: self.catalog.as_ref(),
            functions: &self.functions,
        };
        match SelectPlan::build(statement, &ctx).and_then(SelectPlan::compile) {
            Ok(plan) => ExplainPlan::from_plan(&plan),
            Err(e) => ExplainPlan::from_error(&e),
        }
    }
}
