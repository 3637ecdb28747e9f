//! Arena-indexed condition trees
//!
//! WHERE and ON conditions are converted into nodes owned by a single
//! `ConditionArena` and referred to by `NodeId`. Pushdown partitions node
//! ids between tables and appends new `And` nodes; existing nodes are never
//! rewritten, so one sub-condition can be considered for several tables
//! without aliasing.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::executor::ScalarFunction;
use crate::value::Value;

/// Index of a node in a `ConditionArena`
pub type NodeId = usize;

/// A resolved field: table index in FROM order and field position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnRef {
    pub table: usize,
    pub field: usize,
}

/// Resolved scalar operand
#[derive(Debug, Clone)]
pub enum Operand {
    Column(ColumnRef),
    Literal(Value),
    Parameter(usize),
    Function {
        function: Arc<ScalarFunction>,
        args: Vec<Operand>,
    },
}

impl Operand {
    /// Adds every column this operand reads to `out`
    pub fn collect_columns(&self, out: &mut BTreeSet<ColumnRef>) {
        match self {
            Operand::Column(c) => {
                out.insert(*c);
            }
            Operand::Function { args, .. } => args.iter().for_each(|a| a.collect_columns(out)),
            Operand::Literal(_) | Operand::Parameter(_) => {}
        }
    }

    /// Adds every parameter index this operand reads to `out`
    pub fn collect_parameters(&self, out: &mut BTreeSet<usize>) {
        match self {
            Operand::Parameter(i) => {
                out.insert(*i);
            }
            Operand::Function { args, .. } => args.iter().for_each(|a| a.collect_parameters(out)),
            Operand::Column(_) | Operand::Literal(_) => {}
        }
    }

    /// Structural equality, functions compared by name
    pub fn same_as(&self, other: &Operand) -> bool {
        match (self, other) {
            (Operand::Column(a), Operand::Column(b)) => a == b,
            (Operand::Literal(a), Operand::Literal(b)) => a == b,
            (Operand::Parameter(a), Operand::Parameter(b)) => a == b,
            (
                Operand::Function { function: f, args: a },
                Operand::Function { function: g, args: b },
            ) => {
                f.name == g.name
                    && a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            _ => false,
        }
    }

    /// SQL text of the operand; `column` renders a resolved field
    pub fn render(&self, column: &dyn Fn(ColumnRef) -> String) -> String {
        match self {
            Operand::Column(c) => column(*c),
            Operand::Literal(v) => v.to_string(),
            Operand::Parameter(i) => format!("?{}", i + 1),
            Operand::Function { function, args } => {
                let args: Vec<String> = args.iter().map(|a| a.render(column)).collect();
                format!("{}({})", function.name, args.join(", "))
            }
        }
    }
}

/// Binary comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equals,
    NotEquals,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Equals => "=",
            CompareOp::NotEquals => "<>",
            CompareOp::LessThan => "<",
            CompareOp::LessOrEqual => "<=",
            CompareOp::GreaterThan => ">",
            CompareOp::GreaterOrEqual => ">=",
        }
    }

    /// Applies the operator to a comparator ordering
    pub fn test(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Equals => ordering == Ordering::Equal,
            CompareOp::NotEquals => ordering != Ordering::Equal,
            CompareOp::LessThan => ordering == Ordering::Less,
            CompareOp::LessOrEqual => ordering != Ordering::Greater,
            CompareOp::GreaterThan => ordering == Ordering::Greater,
            CompareOp::GreaterOrEqual => ordering != Ordering::Less,
        }
    }
}

/// One node of a condition tree
#[derive(Debug, Clone)]
pub enum ConditionNode {
    And(Vec<NodeId>),
    Or(Vec<NodeId>),
    Not(NodeId),
    Compare {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    Between {
        expr: Operand,
        low: Operand,
        high: Operand,
    },
    Like {
        expr: Operand,
        pattern: Operand,
        escape: Option<char>,
        case_insensitive: bool,
    },
    IsNull {
        expr: Operand,
        negated: bool,
    },
}

/// Owner of every condition node of one statement
#[derive(Debug, Default)]
pub struct ConditionArena {
    nodes: Vec<ConditionNode>,
}

impl ConditionArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its id
    pub fn push(&mut self, node: ConditionNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Returns the node for `id`
    ///
    /// Ids are only produced by `push`, so lookups are always in range.
    pub fn get(&self, id: NodeId) -> &ConditionNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Operands of a leaf node, empty for AND/OR/NOT
    fn leaf_operands(&self, id: NodeId) -> Vec<&Operand> {
        match self.get(id) {
            ConditionNode::Compare { left, right, .. } => vec![left, right],
            ConditionNode::Between { expr, low, high } => vec![expr, low, high],
            ConditionNode::Like { expr, pattern, .. } => vec![expr, pattern],
            ConditionNode::IsNull { expr, .. } => vec![expr],
            ConditionNode::And(_) | ConditionNode::Or(_) | ConditionNode::Not(_) => Vec::new(),
        }
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.get(id) {
            ConditionNode::And(c) | ConditionNode::Or(c) => c.clone(),
            ConditionNode::Not(c) => vec![*c],
            _ => Vec::new(),
        }
    }

    /// Every field referenced by the subtree rooted at `id`
    pub fn clause_fields(&self, id: NodeId) -> BTreeSet<ColumnRef> {
        let mut out = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            for operand in self.leaf_operands(node) {
                operand.collect_columns(&mut out);
            }
            stack.extend(self.children(node));
        }
        out
    }

    /// Indexes of the tables the subtree rooted at `id` reads
    pub fn tables_of(&self, id: NodeId) -> BTreeSet<usize> {
        self.clause_fields(id).into_iter().map(|c| c.table).collect()
    }

    /// Every parameter index referenced by any node
    pub fn parameters(&self) -> BTreeSet<usize> {
        let mut out = BTreeSet::new();
        for id in 0..self.nodes.len() {
            for operand in self.leaf_operands(id) {
                operand.collect_parameters(&mut out);
            }
        }
        out
    }

    /// SQL text of the subtree rooted at `id`
    pub fn render(&self, id: NodeId, column: &dyn Fn(ColumnRef) -> String) -> String {
        let join = |ids: &[NodeId], sep: &str| {
            let parts: Vec<String> = ids.iter().map(|&c| self.render(c, column)).collect();
            format!("({})", parts.join(sep))
        };
        match self.get(id) {
            ConditionNode::And(c) => join(c, " AND "),
            ConditionNode::Or(c) => join(c, " OR "),
            ConditionNode::Not(c) => format!("NOT {}", self.render(*c, column)),
            ConditionNode::Compare { op, left, right } => format!(
                "{} {} {}",
                left.render(column),
                op.symbol(),
                right.render(column)
            ),
            ConditionNode::Between { expr, low, high } => format!(
                "{} BETWEEN {} AND {}",
                expr.render(column),
                low.render(column),
                high.render(column)
            ),
            ConditionNode::Like {
                expr,
                pattern,
                escape,
                case_insensitive,
            } => {
                let keyword = if *case_insensitive { "ILIKE" } else { "LIKE" };
                let mut text = format!("{} {} {}", expr.render(column), keyword, pattern.render(column));
                if let Some(e) = escape {
                    text.push_str(&format!(" ESCAPE '{}'", e));
                }
                text
            }
            ConditionNode::IsNull { expr, negated } => {
                let keyword = if *negated { "IS NOT NULL" } else { "IS NULL" };
                format!("{} {}", expr.render(column), keyword)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(table: usize, field: usize) -> Operand {
        Operand::Column(ColumnRef { table, field })
    }

    fn name(c: ColumnRef) -> String {
        format!("t{}.f{}", c.table, c.field)
    }

    #[test]
    fn test_clause_fields_walk_whole_tree() {
        let mut arena = ConditionArena::new();
        let a = arena.push(ConditionNode::Compare {
            op: CompareOp::Equals,
            left: col(0, 1),
            right: Operand::Literal(Value::Int32(5)),
        });
        let b = arena.push(ConditionNode::IsNull {
            expr: col(2, 0),
            negated: false,
        });
        let not = arena.push(ConditionNode::Not(b));
        let or = arena.push(ConditionNode::Or(vec![a, not]));

        let fields = arena.clause_fields(or);
        assert_eq!(fields.len(), 2);
        assert_eq!(arena.tables_of(or).into_iter().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(arena.tables_of(a).len(), 1);
    }

    #[test]
    fn test_render() {
        let mut arena = ConditionArena::new();
        let a = arena.push(ConditionNode::Compare {
            op: CompareOp::GreaterOrEqual,
            left: col(0, 1),
            right: Operand::Parameter(0),
        });
        let b = arena.push(ConditionNode::Like {
            expr: col(1, 0),
            pattern: Operand::Literal(Value::from("a%")),
            escape: Some('!'),
            case_insensitive: true,
        });
        let and = arena.push(ConditionNode::And(vec![a, b]));
        assert_eq!(
            arena.render(and, &name),
            "(t0.f1 >= ?1 AND t1.f0 ILIKE 'a%' ESCAPE '!')"
        );
    }

    #[test]
    fn test_parameters_collected() {
        let mut arena = ConditionArena::new();
        arena.push(ConditionNode::Between {
            expr: col(0, 0),
            low: Operand::Parameter(0),
            high: Operand::Parameter(2),
        });
        assert_eq!(arena.parameters().into_iter().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_compare_op() {
        assert!(CompareOp::LessOrEqual.test(Ordering::Equal));
        assert!(!CompareOp::NotEquals.test(Ordering::Equal));
        assert!(CompareOp::GreaterThan.test(Ordering::Greater));
    }
}
