//! Typed SELECT statement AST
//!
//! This is the contract between the SQL parser and the planner. The AST is
//! serde (de)serializable so statements can arrive as JSON.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Join type of a table reference; the first table's join type is ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinType {
    #[default]
    Cross,
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Cross => "CROSS",
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL",
        }
    }

    /// True for joins whose filter can drop rows of both sides
    pub fn is_inner(&self) -> bool {
        matches!(self, JoinType::Cross | JoinType::Inner)
    }
}

/// Location of a token in the statement text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

/// A column reference as written in the statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRef {
    /// Table name or alias qualifier
    #[serde(default)]
    pub table: Option<String>,
    pub name: String,
    #[serde(default)]
    pub position: Option<SourcePosition>,
}

impl FieldRef {
    /// `table.name` or `name`
    pub fn display_name(&self) -> String {
        match &self.table {
            Some(t) => format!("{}.{}", t, self.name),
            None => self.name.clone(),
        }
    }
}

/// Scalar expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Field(FieldRef),
    Literal { value: Value },
    /// Zero-based bind parameter index
    Parameter { index: usize },
    Function { name: String, args: Vec<Expr> },
}

impl Expr {
    /// Unqualified field reference
    pub fn field(name: &str) -> Self {
        Expr::Field(FieldRef {
            table: None,
            name: name.to_string(),
            position: None,
        })
    }

    /// Qualified field reference
    pub fn qualified(table: &str, name: &str) -> Self {
        Expr::Field(FieldRef {
            table: Some(table.to_string()),
            name: name.to_string(),
            position: None,
        })
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal {
            value: value.into(),
        }
    }

    pub fn parameter(index: usize) -> Self {
        Expr::Parameter { index }
    }

    pub fn function(name: &str, args: Vec<Expr>) -> Self {
        Expr::Function {
            name: name.to_string(),
            args,
        }
    }
}

/// Aggregate function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunc {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunc::Count => "COUNT",
            AggregateFunc::Sum => "SUM",
            AggregateFunc::Avg => "AVG",
            AggregateFunc::Min => "MIN",
            AggregateFunc::Max => "MAX",
        }
    }
}

/// One item of the SELECT list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectItem {
    Expr {
        expr: Expr,
        #[serde(default)]
        alias: Option<String>,
    },
    /// `*` or `table.*`
    Wildcard {
        #[serde(default)]
        table: Option<String>,
    },
    /// `arg` is `None` only for `COUNT(*)`
    Aggregate {
        func: AggregateFunc,
        #[serde(default)]
        arg: Option<Expr>,
        #[serde(default)]
        alias: Option<String>,
    },
}

impl SelectItem {
    pub fn expr(expr: Expr) -> Self {
        SelectItem::Expr { expr, alias: None }
    }

    pub fn aliased(expr: Expr, alias: &str) -> Self {
        SelectItem::Expr {
            expr,
            alias: Some(alias.to_string()),
        }
    }

    pub fn wildcard() -> Self {
        SelectItem::Wildcard { table: None }
    }

    pub fn aggregate(func: AggregateFunc, arg: Option<Expr>) -> Self {
        SelectItem::Aggregate {
            func,
            arg,
            alias: None,
        }
    }
}

/// WHERE / ON condition tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    And { conditions: Vec<Condition> },
    Or { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
    Equals { left: Expr, right: Expr },
    NotEquals { left: Expr, right: Expr },
    LessThan { left: Expr, right: Expr },
    LessOrEqual { left: Expr, right: Expr },
    GreaterThan { left: Expr, right: Expr },
    GreaterOrEqual { left: Expr, right: Expr },
    Between { expr: Expr, low: Expr, high: Expr },
    Like {
        expr: Expr,
        pattern: Expr,
        #[serde(default)]
        escape: Option<char>,
    },
    #[serde(rename = "ilike")]
    ILike {
        expr: Expr,
        pattern: Expr,
        #[serde(default)]
        escape: Option<char>,
    },
    IsNull { expr: Expr },
    IsNotNull { expr: Expr },
}

impl Condition {
    pub fn and(conditions: Vec<Condition>) -> Self {
        Condition::And { conditions }
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Condition::Or { conditions }
    }

    pub fn not(condition: Condition) -> Self {
        Condition::Not {
            condition: Box::new(condition),
        }
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Condition::Equals { left, right }
    }
}

/// ORDER BY item: an output column name/alias, a field, or a 1-based ordinal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub expr: Expr,
    #[serde(default)]
    pub descending: bool,
}

/// A table in the FROM clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRef {
    #[serde(default)]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub join: JoinType,
    /// ON condition; becomes the table's initial join filter
    #[serde(default)]
    pub on: Option<Condition>,
}

impl TableRef {
    pub fn new(name: &str) -> Self {
        Self {
            schema: None,
            name: name.to_string(),
            alias: None,
            join: JoinType::Cross,
            on: None,
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn join(mut self, join: JoinType, on: Option<Condition>) -> Self {
        self.join = join;
        self.on = on;
        self
    }
}

/// A parsed SELECT statement
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectStatement {
    #[serde(default)]
    pub tables: Vec<TableRef>,
    pub columns: Vec<SelectItem>,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub group_by: Vec<Expr>,
    #[serde(default)]
    pub order_by: Vec<OrderItem>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

impl SelectStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, table: TableRef) -> Self {
        self.tables.push(table);
        self
    }

    pub fn select(mut self, item: SelectItem) -> Self {
        self.columns.push(item);
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn group_by(mut self, expr: Expr) -> Self {
        self.group_by.push(expr);
        self
    }

    pub fn order_by(mut self, expr: Expr, descending: bool) -> Self {
        self.order_by.push(OrderItem { expr, descending });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}
