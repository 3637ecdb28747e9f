//! Slot-bound conditions and operands
//!
//! Binding replaces every resolved field with its slot in the cumulative
//! loaded-row layout. It runs once per compilation and produces immutable
//! trees; the arena and the AST are left as they were.

use std::collections::HashMap;
use std::sync::Arc;

use super::condition::{ColumnRef, CompareOp, ConditionArena, ConditionNode, NodeId, Operand};
use super::errors::{PlannerError, PlannerResult};
use crate::executor::ScalarFunction;
use crate::value::{LikePattern, Value};

/// Operand with fields replaced by row slots
#[derive(Debug, Clone)]
pub enum BoundOperand {
    Slot(usize),
    Literal(Value),
    Parameter(usize),
    Function {
        function: Arc<ScalarFunction>,
        args: Vec<BoundOperand>,
    },
}

/// Condition ready for per-row evaluation
#[derive(Debug, Clone)]
pub enum BoundCondition {
    And(Vec<BoundCondition>),
    Or(Vec<BoundCondition>),
    Not(Box<BoundCondition>),
    Compare {
        op: CompareOp,
        left: BoundOperand,
        right: BoundOperand,
    },
    Between {
        expr: BoundOperand,
        low: BoundOperand,
        high: BoundOperand,
    },
    Like {
        expr: BoundOperand,
        pattern: BoundOperand,
        /// Precompiled when the pattern is a text literal
        compiled: Option<LikePattern>,
        escape: Option<char>,
        case_insensitive: bool,
    },
    IsNull {
        expr: BoundOperand,
        negated: bool,
    },
}

/// Maps resolved fields to slots of the loaded-row layout
pub struct Binder<'a> {
    slots: &'a HashMap<ColumnRef, usize>,
    column_name: &'a dyn Fn(ColumnRef) -> String,
}

impl<'a> Binder<'a> {
    pub fn new(
        slots: &'a HashMap<ColumnRef, usize>,
        column_name: &'a dyn Fn(ColumnRef) -> String,
    ) -> Self {
        Self { slots, column_name }
    }

    pub fn bind_operand(&self, operand: &Operand) -> PlannerResult<BoundOperand> {
        Ok(match operand {
            Operand::Column(c) => match self.slots.get(c) {
                Some(&slot) => BoundOperand::Slot(slot),
                None => return Err(PlannerError::invalid_column((self.column_name)(*c))),
            },
            Operand::Literal(v) => BoundOperand::Literal(v.clone()),
            Operand::Parameter(i) => BoundOperand::Parameter(*i),
            Operand::Function { function, args } => BoundOperand::Function {
                function: Arc::clone(function),
                args: args
                    .iter()
                    .map(|a| self.bind_operand(a))
                    .collect::<PlannerResult<_>>()?,
            },
        })
    }

    pub fn bind_condition(&self, arena: &ConditionArena, id: NodeId) -> PlannerResult<BoundCondition> {
        let bind_all = |ids: &[NodeId]| {
            ids.iter()
                .map(|&c| self.bind_condition(arena, c))
                .collect::<PlannerResult<Vec<_>>>()
        };

        Ok(match arena.get(id) {
            ConditionNode::And(children) => BoundCondition::And(bind_all(children)?),
            ConditionNode::Or(children) => BoundCondition::Or(bind_all(children)?),
            ConditionNode::Not(child) => {
                BoundCondition::Not(Box::new(self.bind_condition(arena, *child)?))
            }
            ConditionNode::Compare { op, left, right } => BoundCondition::Compare {
                op: *op,
                left: self.bind_operand(left)?,
                right: self.bind_operand(right)?,
            },
            ConditionNode::Between { expr, low, high } => BoundCondition::Between {
                expr: self.bind_operand(expr)?,
                low: self.bind_operand(low)?,
                high: self.bind_operand(high)?,
            },
            ConditionNode::Like {
                expr,
                pattern,
                escape,
                case_insensitive,
            } => {
                let compiled = match pattern {
                    Operand::Literal(Value::Text(text)) => {
                        LikePattern::compile(text, *escape, *case_insensitive).ok()
                    }
                    _ => None,
                };
                BoundCondition::Like {
                    expr: self.bind_operand(expr)?,
                    pattern: self.bind_operand(pattern)?,
                    compiled,
                    escape: *escape,
                    case_insensitive: *case_insensitive,
                }
            }
            ConditionNode::IsNull { expr, negated } => BoundCondition::IsNull {
                expr: self.bind_operand(expr)?,
                negated: *negated,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlannerErrorCode;

    #[test]
    fn test_bind_replaces_columns_with_slots() {
        let mut arena = ConditionArena::new();
        let id = arena.push(ConditionNode::Like {
            expr: Operand::Column(ColumnRef { table: 1, field: 3 }),
            pattern: Operand::Literal(Value::from("A%")),
            escape: None,
            case_insensitive: false,
        });
        let mut slots = HashMap::new();
        slots.insert(ColumnRef { table: 1, field: 3 }, 4);
        let names = |c: ColumnRef| format!("{}.{}", c.table, c.field);
        let binder = Binder::new(&slots, &names);

        match binder.bind_condition(&arena, id).unwrap() {
            BoundCondition::Like {
                expr: BoundOperand::Slot(4),
                compiled: Some(_),
                ..
            } => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unloaded_column_is_rejected() {
        let slots = HashMap::new();
        let names = |c: ColumnRef| format!("{}.{}", c.table, c.field);
        let binder = Binder::new(&slots, &names);
        let err = binder
            .bind_operand(&Operand::Column(ColumnRef { table: 0, field: 1 }))
            .unwrap_err();
        assert_eq!(err.code(), PlannerErrorCode::PdxInvalidColumn);
        assert_eq!(err.column(), Some("0.1"));
    }
}
