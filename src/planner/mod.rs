//! Query planner subsystem for pdxsql
//!
//! Turns a typed `SelectStatement` into an immutable `CompiledPlan`.
//!
//! # Lifecycle
//!
//! 1. `SelectPlan::build` resolves tables, wildcards and field references
//!    (state Built)
//! 2. `SelectPlan::compile` pushes WHERE predicates into join filters,
//!    computes per-table load sets and binds fields to row slots
//!    (state Compiled)
//! 3. `CompiledPlan::execute` in the executor runs the plan
//!
//! Unresolvable or ambiguous references fail here, before any row is loaded.

mod ast;
mod bound;
mod condition;
mod errors;
mod explain;
mod plan;
mod pushdown;

pub use ast::{
    AggregateFunc, Condition, Expr, FieldRef, JoinType, OrderItem, SelectItem, SelectStatement,
    SourcePosition, TableRef,
};
pub use bound::{BoundCondition, BoundOperand};
pub use condition::{ColumnRef, CompareOp, ConditionArena, ConditionNode, NodeId, Operand};
pub use errors::{PlannerError, PlannerErrorCode, PlannerResult};
pub use explain::{ExplainPlan, ExplainTable};
pub use plan::{
    BoundAggregate, CompiledPlan, CompiledTable, Grouping, PlanContext, Projection, SelectPlan,
    SortKey,
};
pub use pushdown::{push_down, Pushdown};
