//! Explain plan output
//!
//! Produces deterministic, human-readable explain output, also available as
//! JSON through serde.

use std::fmt;

use serde::Serialize;

use super::errors::PlannerError;
use super::plan::CompiledPlan;

/// One table of an explained plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplainTable {
    pub name: String,
    /// Alias, or the table name
    pub label: String,
    pub join: String,
    /// Pushed join filter
    pub filter: Option<String>,
    /// Fields loaded for this table
    pub load: Vec<String>,
}

/// Explain plan output
#[derive(Debug, Clone, Serialize)]
pub struct ExplainPlan {
    /// Whether compilation succeeded
    pub accepted: bool,
    pub tables: Vec<ExplainTable>,
    /// Condition left for the fully joined row
    pub residual: Option<String>,
    pub columns: Vec<String>,
    pub group_by: Vec<String>,
    /// Output column names with direction
    pub order_by: Vec<String>,
    pub distinct: bool,
    pub limit: Option<usize>,
    pub offset: usize,
    pub parameters: usize,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a compiled plan
    pub fn from_plan(plan: &CompiledPlan) -> Self {
        let tables = plan
            .tables()
            .iter()
            .map(|t| ExplainTable {
                name: t.table.name.clone(),
                label: t.label.clone(),
                join: t.join.as_str().to_string(),
                filter: t.filter_text.clone(),
                load: t
                    .load
                    .iter()
                    .filter_map(|&p| t.table.fields.get(p).map(|f| f.name.clone()))
                    .collect(),
            })
            .collect();

        let columns = plan.columns();
        let order_by = plan
            .sort_keys()
            .iter()
            .filter_map(|k| {
                columns.get(k.column).map(|c| {
                    format!("{} {}", c.name, if k.descending { "DESC" } else { "ASC" })
                })
            })
            .collect();

        Self {
            accepted: true,
            tables,
            residual: plan.residual_text().map(str::to_string),
            columns: columns.iter().map(|c| c.name.clone()).collect(),
            group_by: plan
                .grouping
                .as_ref()
                .map(|g| g.key_names.clone())
                .unwrap_or_default(),
            order_by,
            distinct: plan.is_distinct(),
            limit: plan.limit(),
            offset: plan.offset(),
            parameters: plan.parameter_count(),
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Creates an explain plan from a compilation error
    pub fn from_error(err: &PlannerError) -> Self {
        Self {
            accepted: false,
            tables: Vec::new(),
            residual: None,
            columns: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            distinct: false,
            limit: None,
            offset: 0,
            parameters: 0,
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;

        if !self.accepted {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
            return Ok(());
        }

        writeln!(f, "Status: ACCEPTED")?;
        writeln!(f, "Tables:")?;
        for (i, t) in self.tables.iter().enumerate() {
            if i == 0 {
                write!(f, "  {}", t.name)?;
            } else {
                write!(f, "  {} JOIN {}", t.join, t.name)?;
            }
            if t.label != t.name {
                write!(f, " AS {}", t.label)?;
            }
            writeln!(f)?;
            writeln!(f, "    Load: {}", t.load.join(", "))?;
            if let Some(filter) = &t.filter {
                writeln!(f, "    Filter: {}", filter)?;
            }
        }
        if let Some(residual) = &self.residual {
            writeln!(f, "Residual: {}", residual)?;
        }
        writeln!(f, "Columns: {}", self.columns.join(", "))?;
        if !self.group_by.is_empty() {
            writeln!(f, "Group By: {}", self.group_by.join(", "))?;
        }
        if !self.order_by.is_empty() {
            writeln!(f, "Order By: {}", self.order_by.join(", "))?;
        }
        if self.distinct {
            writeln!(f, "Distinct: yes")?;
        }
        if let Some(limit) = self.limit {
            writeln!(f, "Limit: {}", limit)?;
        }
        if self.offset > 0 {
            writeln!(f, "Offset: {}", self.offset)?;
        }
        if self.parameters > 0 {
            writeln!(f, "Parameters: {}", self.parameters)?;
        }

        Ok(())
    }
}
