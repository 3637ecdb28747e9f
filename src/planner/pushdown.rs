//! Join-condition pushdown
//!
//! Moves WHERE predicates into per-table join filters so they are evaluated
//! while tables are combined instead of on the fully joined row.
//!
//! Rules:
//! - AND nodes are split; each child is considered on its own.
//! - OR nodes are never pushed.
//! - A predicate reading one table goes to that table's filter, unless the
//!   table is outer-joined.
//! - A predicate reading two tables goes to the later-declared table,
//!   whatever its join type.
//! - Predicates reading no table or more than two stay residual.

use super::ast::JoinType;
use super::condition::{ConditionArena, ConditionNode, NodeId};
use crate::observability::{log_event_with_fields, Event};

/// Outcome of pushdown over one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pushdown {
    /// Condition left for the fully joined row
    pub residual: Option<NodeId>,
    /// Join filter per table, in FROM order
    pub filters: Vec<Option<NodeId>>,
    /// Number of predicates moved into a join filter
    pub pushed: usize,
}

/// Partitions `root` between the residual and the per-table filters
///
/// `tables` holds the label and join type of every table in FROM order and
/// `filters` their initial (ON) filters.
pub fn push_down(
    arena: &mut ConditionArena,
    root: Option<NodeId>,
    tables: &[(&str, JoinType)],
    filters: Vec<Option<NodeId>>,
) -> Pushdown {
    let mut state = Pushdown {
        residual: None,
        filters,
        pushed: 0,
    };
    if let Some(root) = root {
        state.residual = optimize(arena, root, tables, &mut state);
    }
    state
}

/// Returns what remains of `id` after pushing what can be pushed
fn optimize(
    arena: &mut ConditionArena,
    id: NodeId,
    tables: &[(&str, JoinType)],
    state: &mut Pushdown,
) -> Option<NodeId> {
    match arena.get(id) {
        ConditionNode::And(children) => {
            let children = children.clone();
            let remaining: Vec<NodeId> = children
                .iter()
                .filter_map(|&child| optimize(arena, child, tables, state))
                .collect();
            match remaining.len() {
                0 => None,
                1 => Some(remaining[0]),
                _ if remaining == children => Some(id),
                _ => Some(arena.push(ConditionNode::And(remaining))),
            }
        }
        ConditionNode::Or(_) => Some(id),
        _ => match target_table(arena, id, tables) {
            Some(table) => {
                add_and_clause(arena, &mut state.filters[table], id);
                state.pushed += 1;
                let count = arena.clause_fields(id).len().to_string();
                log_event_with_fields(
                    Event::ConditionPushed,
                    &[("table", tables[table].0), ("fields", &count)],
                );
                None
            }
            None => Some(id),
        },
    }
}

fn target_table(arena: &ConditionArena, id: NodeId, tables: &[(&str, JoinType)]) -> Option<usize> {
    let referenced = arena.tables_of(id);
    match referenced.len() {
        // the first table has nothing to join against and filters like CROSS
        1 => referenced
            .iter()
            .next()
            .copied()
            .filter(|&t| t == 0 || tables[t].1.is_inner()),
        // later-declared table, so both sides are loaded when it runs
        2 => referenced.iter().next_back().copied(),
        _ => None,
    }
}

/// Combines `clause` into `filter` with AND, appending a fresh node
fn add_and_clause(arena: &mut ConditionArena, filter: &mut Option<NodeId>, clause: NodeId) {
    *filter = Some(match *filter {
        None => clause,
        Some(existing) => match arena.get(existing) {
            ConditionNode::And(children) => {
                let mut children = children.clone();
                children.push(clause);
                arena.push(ConditionNode::And(children))
            }
            _ => arena.push(ConditionNode::And(vec![existing, clause])),
        },
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::condition::{ColumnRef, CompareOp, Operand};
    use crate::value::Value;

    fn col(table: usize, field: usize) -> Operand {
        Operand::Column(ColumnRef { table, field })
    }

    fn eq(arena: &mut ConditionArena, left: Operand, right: Operand) -> NodeId {
        arena.push(ConditionNode::Compare {
            op: CompareOp::Equals,
            left,
            right,
        })
    }

    fn lit(v: i32) -> Operand {
        Operand::Literal(Value::Int32(v))
    }

    #[test]
    fn test_inner_join_leaves_no_residual() {
        // FROM a INNER JOIN b ON a.x = b.y WHERE a.x = 5
        let mut arena = ConditionArena::new();
        let on = eq(&mut arena, col(0, 0), col(1, 0));
        let filter = eq(&mut arena, col(0, 0), lit(5));
        let tables = [("a", JoinType::Cross), ("b", JoinType::Inner)];

        let result = push_down(&mut arena, Some(filter), &tables, vec![None, Some(on)]);
        assert_eq!(result.residual, None);
        assert_eq!(result.filters, vec![Some(filter), Some(on)]);
        assert_eq!(result.pushed, 1);
    }

    #[test]
    fn test_and_is_split() {
        let mut arena = ConditionArena::new();
        let a = eq(&mut arena, col(0, 0), lit(1));
        let join = eq(&mut arena, col(0, 1), col(1, 1));
        let or_left = eq(&mut arena, col(1, 0), lit(2));
        let or_right = eq(&mut arena, col(1, 0), lit(3));
        let or = arena.push(ConditionNode::Or(vec![or_left, or_right]));
        let root = arena.push(ConditionNode::And(vec![a, join, or]));
        let tables = [("a", JoinType::Cross), ("b", JoinType::Cross)];

        let result = push_down(&mut arena, Some(root), &tables, vec![None, None]);
        assert_eq!(result.residual, Some(or));
        assert_eq!(result.filters, vec![Some(a), Some(join)]);
        assert_eq!(result.pushed, 2);
    }

    #[test]
    fn test_single_table_predicate_skips_outer_join() {
        let mut arena = ConditionArena::new();
        let on = eq(&mut arena, col(0, 0), col(1, 0));
        let filter = eq(&mut arena, col(1, 1), lit(7));
        let tables = [("a", JoinType::Cross), ("b", JoinType::Left)];

        let result = push_down(&mut arena, Some(filter), &tables, vec![None, Some(on)]);
        assert_eq!(result.residual, Some(filter));
        assert_eq!(result.filters, vec![None, Some(on)]);
    }

    #[test]
    fn test_two_table_predicate_goes_into_outer_join() {
        let mut arena = ConditionArena::new();
        let join = eq(&mut arena, col(0, 0), col(1, 0));
        let tables = [("a", JoinType::Cross), ("b", JoinType::Left)];

        let result = push_down(&mut arena, Some(join), &tables, vec![None, None]);
        assert_eq!(result.residual, None);
        assert_eq!(result.filters, vec![None, Some(join)]);
        assert_eq!(result.pushed, 1);
    }

    #[test]
    fn test_first_table_accepts_pushdown_before_right_join() {
        let mut arena = ConditionArena::new();
        let filter = eq(&mut arena, col(0, 1), lit(7));
        // the first table's own join type is ignored
        let tables = [("a", JoinType::Full), ("b", JoinType::Right)];

        let result = push_down(&mut arena, Some(filter), &tables, vec![None, None]);
        assert_eq!(result.residual, None);
        assert_eq!(result.filters, vec![Some(filter), None]);
    }

    #[test]
    fn test_existing_filter_is_combined() {
        let mut arena = ConditionArena::new();
        let on = eq(&mut arena, col(0, 0), col(1, 0));
        let filter = eq(&mut arena, col(1, 1), lit(7));
        let tables = [("a", JoinType::Cross), ("b", JoinType::Inner)];

        let result = push_down(&mut arena, Some(filter), &tables, vec![None, Some(on)]);
        let combined = result.filters[1].unwrap();
        match arena.get(combined) {
            ConditionNode::And(children) => assert_eq!(children, &vec![on, filter]),
            other => panic!("expected AND, got {:?}", other),
        }
        // the ON node itself is untouched
        assert!(matches!(arena.get(on), ConditionNode::Compare { .. }));
    }

    #[test]
    fn test_three_tables_stay_residual() {
        let mut arena = ConditionArena::new();
        let between = arena.push(ConditionNode::Between {
            expr: col(0, 0),
            low: col(1, 0),
            high: col(2, 0),
        });
        let literal_only = eq(&mut arena, lit(1), lit(1));
        let root = arena.push(ConditionNode::And(vec![between, literal_only]));
        let tables = [
            ("a", JoinType::Cross),
            ("b", JoinType::Cross),
            ("c", JoinType::Cross),
        ];

        let result = push_down(&mut arena, Some(root), &tables, vec![None, None, None]);
        assert_eq!(result.residual, Some(root));
        assert_eq!(result.pushed, 0);
    }
}
