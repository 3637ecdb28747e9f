//! Query plans
//!
//! A `SelectPlan` is a statement resolved against the catalog: tables are
//! looked up, wildcards expanded and every field reference tied to exactly
//! one table field. `compile` consumes it, runs pushdown, computes what each
//! table must load and binds everything to slots of the loaded-row layout.
//! The resulting `CompiledPlan` is immutable and can be executed any number
//! of times.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::ast::{
    AggregateFunc, Condition, Expr, FieldRef, JoinType, OrderItem, SelectItem, SelectStatement,
};
use super::bound::{Binder, BoundCondition, BoundOperand};
use super::condition::{ColumnRef, CompareOp, ConditionArena, ConditionNode, NodeId, Operand};
use super::errors::{PlannerError, PlannerResult};
use super::pushdown::push_down;
use crate::catalog::{Catalog, Table};
use crate::executor::{FunctionRegistry, ResultColumn, ReturnType};
use crate::observability::{log_event_with_fields, Event};
use crate::value::Value;

/// What planning needs from its surroundings
pub struct PlanContext<'a> {
    pub catalog: &'a dyn Catalog,
    pub functions: &'a FunctionRegistry,
}

#[derive(Debug)]
struct PlanTable {
    table: Arc<Table>,
    alias: Option<String>,
    join: JoinType,
    filter: Option<NodeId>,
}

impl PlanTable {
    fn label(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table.name)
    }

    fn answers_to(&self, qualifier: &str) -> bool {
        self.alias
            .as_deref()
            .map_or(false, |a| a.eq_ignore_ascii_case(qualifier))
            || self.table.name.eq_ignore_ascii_case(qualifier)
    }
}

#[derive(Debug)]
enum PlanColumn {
    Value {
        operand: Operand,
        name: String,
        sql_type: String,
        table: Option<String>,
    },
    Aggregate {
        func: AggregateFunc,
        arg: Option<Operand>,
        name: String,
        sql_type: String,
    },
}

impl PlanColumn {
    fn name(&self) -> &str {
        match self {
            PlanColumn::Value { name, .. } | PlanColumn::Aggregate { name, .. } => name,
        }
    }

    fn result_column(&self) -> ResultColumn {
        match self {
            PlanColumn::Value {
                name,
                sql_type,
                table,
                ..
            } => ResultColumn::new(name.clone(), sql_type.clone(), table.clone()),
            PlanColumn::Aggregate { name, sql_type, .. } => {
                ResultColumn::new(name.clone(), sql_type.clone(), None)
            }
        }
    }
}

/// Name resolution over the tables of one statement
struct Scope<'a> {
    tables: &'a [PlanTable],
    functions: Option<&'a FunctionRegistry>,
}

impl<'a> Scope<'a> {
    fn resolve_field(&self, field: &FieldRef) -> PlannerResult<ColumnRef> {
        let candidates: Vec<ColumnRef> = self
            .tables
            .iter()
            .enumerate()
            .filter(|(_, t)| field.table.as_deref().map_or(true, |q| t.answers_to(q)))
            .filter_map(|(i, t)| {
                t.table.field(&field.name).map(|f| ColumnRef {
                    table: i,
                    field: f.position,
                })
            })
            .collect();

        match candidates.as_slice() {
            [] => Err(PlannerError::invalid_column(field.display_name()).at(field.position)),
            [single] => Ok(*single),
            many => {
                let labels: Vec<String> = many
                    .iter()
                    .map(|c| self.tables[c.table].label().to_string())
                    .collect();
                Err(PlannerError::ambiguous_column(field.display_name(), &labels).at(field.position))
            }
        }
    }

    fn resolve_expr(&self, expr: &Expr) -> PlannerResult<Operand> {
        Ok(match expr {
            Expr::Field(f) => Operand::Column(self.resolve_field(f)?),
            Expr::Literal { value } => Operand::Literal(value.clone()),
            Expr::Parameter { index } => Operand::Parameter(*index),
            Expr::Function { name, args } => {
                let args = args
                    .iter()
                    .map(|a| self.resolve_expr(a))
                    .collect::<PlannerResult<Vec<_>>>()?;
                let function = self
                    .functions
                    .and_then(|registry| registry.resolve(name, args.len()))
                    .ok_or_else(|| PlannerError::unknown_function(name, args.len()))?;
                Operand::Function { function, args }
            }
        })
    }

    fn add_condition(&self, arena: &mut ConditionArena, condition: &Condition) -> PlannerResult<NodeId> {
        let compare = |op, left: &Expr, right: &Expr| -> PlannerResult<ConditionNode> {
            Ok(ConditionNode::Compare {
                op,
                left: self.resolve_expr(left)?,
                right: self.resolve_expr(right)?,
            })
        };

        let node = match condition {
            Condition::And { conditions } | Condition::Or { conditions } => {
                let children = conditions
                    .iter()
                    .map(|c| self.add_condition(arena, c))
                    .collect::<PlannerResult<Vec<_>>>()?;
                if matches!(condition, Condition::And { .. }) {
                    ConditionNode::And(children)
                } else {
                    ConditionNode::Or(children)
                }
            }
            Condition::Not { condition } => ConditionNode::Not(self.add_condition(arena, condition)?),
            Condition::Equals { left, right } => compare(CompareOp::Equals, left, right)?,
            Condition::NotEquals { left, right } => compare(CompareOp::NotEquals, left, right)?,
            Condition::LessThan { left, right } => compare(CompareOp::LessThan, left, right)?,
            Condition::LessOrEqual { left, right } => compare(CompareOp::LessOrEqual, left, right)?,
            Condition::GreaterThan { left, right } => compare(CompareOp::GreaterThan, left, right)?,
            Condition::GreaterOrEqual { left, right } => {
                compare(CompareOp::GreaterOrEqual, left, right)?
            }
            Condition::Between { expr, low, high } => ConditionNode::Between {
                expr: self.resolve_expr(expr)?,
                low: self.resolve_expr(low)?,
                high: self.resolve_expr(high)?,
            },
            Condition::Like {
                expr,
                pattern,
                escape,
            }
            | Condition::ILike {
                expr,
                pattern,
                escape,
            } => ConditionNode::Like {
                expr: self.resolve_expr(expr)?,
                pattern: self.resolve_expr(pattern)?,
                escape: *escape,
                case_insensitive: matches!(condition, Condition::ILike { .. }),
            },
            Condition::IsNull { expr } => ConditionNode::IsNull {
                expr: self.resolve_expr(expr)?,
                negated: false,
            },
            Condition::IsNotNull { expr } => ConditionNode::IsNull {
                expr: self.resolve_expr(expr)?,
                negated: true,
            },
        };
        Ok(arena.push(node))
    }

    fn resolve_columns(&self, items: &[SelectItem]) -> PlannerResult<Vec<PlanColumn>> {
        let mut columns = Vec::new();
        for item in items {
            match item {
                SelectItem::Expr { expr, alias } => {
                    let operand = self.resolve_expr(expr)?;
                    let table = match &operand {
                        Operand::Column(c) => Some(self.tables[c.table].table.name.clone()),
                        _ => None,
                    };
                    columns.push(PlanColumn::Value {
                        name: alias.clone().unwrap_or_else(|| self.default_name(&operand)),
                        sql_type: self.sql_type(&operand),
                        operand,
                        table,
                    });
                }
                SelectItem::Wildcard { table } => self.expand_wildcard(table.as_deref(), &mut columns)?,
                SelectItem::Aggregate { func, arg, alias } => {
                    let arg = match arg {
                        Some(expr) => Some(self.resolve_expr(expr)?),
                        None if *func == AggregateFunc::Count => None,
                        None => {
                            return Err(PlannerError::invalid_column(format!("{}(*)", func.as_str())))
                        }
                    };
                    let arg_type = arg.as_ref().map(|a| self.sql_type(a));
                    columns.push(PlanColumn::Aggregate {
                        func: *func,
                        name: alias.clone().unwrap_or_else(|| func.as_str().to_string()),
                        sql_type: aggregate_type(*func, arg_type.as_deref()),
                        arg,
                    });
                }
            }
        }
        Ok(columns)
    }

    fn expand_wildcard(&self, qualifier: Option<&str>, columns: &mut Vec<PlanColumn>) -> PlannerResult<()> {
        let mut matched = false;
        for (i, t) in self.tables.iter().enumerate() {
            if !qualifier.map_or(true, |q| t.answers_to(q)) {
                continue;
            }
            matched = true;
            for field in &t.table.fields {
                columns.push(PlanColumn::Value {
                    operand: Operand::Column(ColumnRef {
                        table: i,
                        field: field.position,
                    }),
                    name: field.name.clone(),
                    sql_type: field.sql_type().to_string(),
                    table: Some(t.table.name.clone()),
                });
            }
        }
        if matched {
            return Ok(());
        }
        Err(match qualifier {
            Some(q) => PlannerError::invalid_table(q, "not in the FROM clause"),
            None => PlannerError::invalid_table("*", "statement has no tables"),
        })
    }

    fn column_name(&self, c: ColumnRef) -> String {
        let t = &self.tables[c.table];
        match t.table.fields.get(c.field) {
            Some(f) => format!("{}.{}", t.label(), f.name),
            None => format!("{}.#{}", t.label(), c.field),
        }
    }

    fn default_name(&self, operand: &Operand) -> String {
        match operand {
            Operand::Column(c) => self.tables[c.table]
                .table
                .fields
                .get(c.field)
                .map(|f| f.name.clone())
                .unwrap_or_default(),
            Operand::Literal(v) => v.to_text().unwrap_or_else(|| "NULL".to_string()),
            Operand::Parameter(_) => "?".to_string(),
            Operand::Function { function, .. } => function.name.to_string(),
        }
    }

    fn sql_type(&self, operand: &Operand) -> String {
        match operand {
            Operand::Column(c) => self.tables[c.table]
                .table
                .fields
                .get(c.field)
                .map(|f| f.sql_type())
                .unwrap_or("NULL")
                .to_string(),
            Operand::Literal(v) => v.type_name().to_string(),
            Operand::Parameter(_) => "VARCHAR".to_string(),
            Operand::Function { function, args } => match function.return_type {
                ReturnType::Fixed(t) => t.to_string(),
                ReturnType::FirstArgument => args
                    .first()
                    .map(|a| self.sql_type(a))
                    .unwrap_or_else(|| "NULL".to_string()),
            },
        }
    }
}

fn aggregate_type(func: AggregateFunc, arg_type: Option<&str>) -> String {
    let t = match (func, arg_type) {
        (AggregateFunc::Count, _) => "BIGINT",
        (AggregateFunc::Sum, Some("SMALLINT" | "INTEGER" | "BIGINT")) => "BIGINT",
        (AggregateFunc::Sum | AggregateFunc::Avg, Some("DECIMAL")) => "DECIMAL",
        (AggregateFunc::Sum | AggregateFunc::Avg, _) => "DOUBLE",
        (AggregateFunc::Min | AggregateFunc::Max, Some(t)) => t,
        (AggregateFunc::Min | AggregateFunc::Max, None) => "NULL",
    };
    t.to_string()
}

fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Field(f) => f.display_name(),
        Expr::Literal { value } => value.to_string(),
        Expr::Parameter { index } => format!("?{}", index + 1),
        Expr::Function { name, args } => {
            let args: Vec<String> = args.iter().map(describe).collect();
            format!("{}({})", name, args.join(", "))
        }
    }
}

/// A statement resolved against the catalog, ready to compile
#[derive(Debug)]
pub struct SelectPlan {
    tables: Vec<PlanTable>,
    columns: Vec<PlanColumn>,
    arena: ConditionArena,
    condition: Option<NodeId>,
    group_by: Vec<Operand>,
    order_by: Vec<OrderItem>,
    distinct: bool,
    limit: Option<usize>,
    offset: usize,
}

impl SelectPlan {
    /// Resolves `statement` against the catalog and function registry
    pub fn build(statement: &SelectStatement, ctx: &PlanContext<'_>) -> PlannerResult<Self> {
        let mut tables: Vec<PlanTable> = Vec::with_capacity(statement.tables.len());
        for table_ref in &statement.tables {
            let table = ctx
                .catalog
                .find_table(table_ref.schema.as_deref(), &table_ref.name)
                .map_err(|e| PlannerError::invalid_table(&table_ref.name, e.message()))?;
            let planned = PlanTable {
                table,
                alias: table_ref.alias.clone(),
                join: table_ref.join,
                filter: None,
            };
            if tables
                .iter()
                .any(|t| t.label().eq_ignore_ascii_case(planned.label()))
            {
                return Err(PlannerError::invalid_table(
                    planned.label(),
                    "name or alias used more than once",
                ));
            }
            tables.push(planned);
        }

        let mut arena = ConditionArena::new();
        let scope = Scope {
            tables: &tables,
            functions: Some(ctx.functions),
        };
        let on_filters = statement
            .tables
            .iter()
            .map(|t| t.on.as_ref().map(|c| scope.add_condition(&mut arena, c)).transpose())
            .collect::<PlannerResult<Vec<_>>>()?;
        let condition = statement
            .condition
            .as_ref()
            .map(|c| scope.add_condition(&mut arena, c))
            .transpose()?;
        let columns = scope.resolve_columns(&statement.columns)?;
        if columns.is_empty() {
            return Err(PlannerError::empty_column_list());
        }
        let group_by = statement
            .group_by
            .iter()
            .map(|e| scope.resolve_expr(e))
            .collect::<PlannerResult<Vec<_>>>()?;

        for (table, filter) in tables.iter_mut().zip(on_filters) {
            table.filter = filter;
        }

        Ok(Self {
            tables,
            columns,
            arena,
            condition,
            group_by,
            order_by: statement.order_by.clone(),
            distinct: statement.distinct,
            limit: statement.limit,
            offset: statement.offset.unwrap_or(0),
        })
    }

    /// Number of tables in FROM order
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Number of output columns after wildcard expansion
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Compiles the plan; the plan is consumed
    pub fn compile(self) -> PlannerResult<CompiledPlan> {
        let SelectPlan {
            tables,
            columns,
            mut arena,
            condition,
            group_by,
            order_by,
            distinct,
            limit,
            offset,
        } = self;
        let scope = Scope {
            tables: &tables,
            functions: None,
        };

        let targets: Vec<(&str, JoinType)> = tables.iter().map(|t| (t.label(), t.join)).collect();
        let initial = tables.iter().map(|t| t.filter).collect();
        let pushdown = push_down(&mut arena, condition, &targets, initial);

        for (i, filter) in pushdown.filters.iter().enumerate() {
            let Some(id) = filter else { continue };
            if let Some(late) = arena.clause_fields(*id).into_iter().find(|c| c.table > i) {
                return Err(PlannerError::column_not_joined(
                    scope.column_name(late),
                    tables[i].label(),
                ));
            }
        }

        let grouped = !group_by.is_empty()
            || columns.iter().any(|c| matches!(c, PlanColumn::Aggregate { .. }));
        if grouped {
            validate_grouping(&scope, &columns, &group_by)?;
        }

        let sort_keys = order_by
            .iter()
            .map(|item| {
                resolve_order_item(&scope, &columns, item).map(|column| SortKey {
                    column,
                    descending: item.descending,
                })
            })
            .collect::<PlannerResult<Vec<_>>>()?;

        // Every field any part of the plan reads
        let mut needed = BTreeSet::new();
        for column in &columns {
            match column {
                PlanColumn::Value { operand, .. } => operand.collect_columns(&mut needed),
                PlanColumn::Aggregate { arg: Some(arg), .. } => arg.collect_columns(&mut needed),
                PlanColumn::Aggregate { arg: None, .. } => {}
            }
        }
        group_by.iter().for_each(|g| g.collect_columns(&mut needed));
        if let Some(residual) = pushdown.residual {
            needed.extend(arena.clause_fields(residual));
        }
        for filter in pushdown.filters.iter().flatten() {
            needed.extend(arena.clause_fields(*filter));
        }

        let mut slots = HashMap::new();
        let mut layout = Vec::with_capacity(tables.len());
        let mut width = 0;
        for (i, table) in tables.iter().enumerate() {
            let mut load: Vec<usize> = needed
                .iter()
                .filter(|c| c.table == i)
                .map(|c| c.field)
                .collect();
            // At least one field, so the row count is known.
            if load.is_empty() && !table.table.fields.is_empty() {
                load.push(0);
            }
            for (k, &field) in load.iter().enumerate() {
                slots.insert(ColumnRef { table: i, field }, width + k);
            }
            layout.push((width, load));
            width += layout[i].1.len();
        }

        let column_name = |c: ColumnRef| scope.column_name(c);
        let binder = Binder::new(&slots, &column_name);

        let mut compiled_tables = Vec::with_capacity(tables.len());
        for ((table, (offset, load)), filter) in tables.iter().zip(layout).zip(&pushdown.filters) {
            compiled_tables.push(CompiledTable {
                table: Arc::clone(&table.table),
                label: table.label().to_string(),
                join: table.join,
                load,
                offset,
                filter: filter.map(|id| binder.bind_condition(&arena, id)).transpose()?,
                filter_text: filter.map(|id| arena.render(id, &column_name)),
            });
        }
        let residual = pushdown
            .residual
            .map(|id| binder.bind_condition(&arena, id))
            .transpose()?;
        let residual_text = pushdown.residual.map(|id| arena.render(id, &column_name));

        let mut aggregates = Vec::new();
        let mut projection = Vec::with_capacity(columns.len());
        for column in &columns {
            match column {
                PlanColumn::Value { operand, .. } => {
                    projection.push(Projection::Value(binder.bind_operand(operand)?))
                }
                PlanColumn::Aggregate { func, arg, .. } => {
                    aggregates.push(BoundAggregate {
                        func: *func,
                        arg: arg.as_ref().map(|a| binder.bind_operand(a)).transpose()?,
                    });
                    projection.push(Projection::Aggregate(aggregates.len() - 1));
                }
            }
        }
        let grouping = if grouped {
            Some(Grouping {
                keys: group_by
                    .iter()
                    .map(|g| binder.bind_operand(g))
                    .collect::<PlannerResult<Vec<_>>>()?,
                key_names: group_by.iter().map(|g| g.render(&column_name)).collect(),
                aggregates,
            })
        } else {
            None
        };

        let mut parameters = arena.parameters();
        for column in &columns {
            match column {
                PlanColumn::Value { operand, .. } => operand.collect_parameters(&mut parameters),
                PlanColumn::Aggregate { arg: Some(arg), .. } => arg.collect_parameters(&mut parameters),
                PlanColumn::Aggregate { arg: None, .. } => {}
            }
        }
        group_by.iter().for_each(|g| g.collect_parameters(&mut parameters));
        let parameter_count = parameters.iter().next_back().map_or(0, |max| max + 1);
        if let Some(missing) = (0..parameter_count).find(|i| !parameters.contains(i)) {
            return Err(PlannerError::invalid_parameter_count(missing + 1, parameter_count));
        }

        let plan = CompiledPlan {
            tables: compiled_tables,
            residual,
            residual_text,
            projection,
            columns: columns.iter().map(PlanColumn::result_column).collect(),
            grouping,
            sort_keys,
            distinct,
            limit,
            offset,
            parameter_count,
            row_width: width,
        };

        let table_count = plan.tables.len().to_string();
        let pushed = pushdown.pushed.to_string();
        let parameter_count = plan.parameter_count.to_string();
        log_event_with_fields(
            Event::QueryCompiled,
            &[
                ("tables", &table_count),
                ("pushed", &pushed),
                ("residual", if plan.residual.is_some() { "true" } else { "false" }),
                ("parameters", &parameter_count),
            ],
        );
        Ok(plan)
    }
}

/// Every non-aggregate output column must be a GROUP BY expression or read
/// only grouped fields
fn validate_grouping(scope: &Scope<'_>, columns: &[PlanColumn], group_by: &[Operand]) -> PlannerResult<()> {
    let grouped_fields: BTreeSet<ColumnRef> = group_by
        .iter()
        .filter_map(|g| match g {
            Operand::Column(c) => Some(*c),
            _ => None,
        })
        .collect();

    for column in columns {
        let PlanColumn::Value { operand, .. } = column else { continue };
        if group_by.iter().any(|g| g.same_as(operand)) {
            continue;
        }
        let mut used = BTreeSet::new();
        operand.collect_columns(&mut used);
        if let Some(ungrouped) = used.into_iter().find(|c| !grouped_fields.contains(c)) {
            return Err(PlannerError::invalid_group_by(scope.column_name(ungrouped)));
        }
    }
    Ok(())
}

/// Maps an ORDER BY item to an output column index
fn resolve_order_item(scope: &Scope<'_>, columns: &[PlanColumn], item: &OrderItem) -> PlannerResult<usize> {
    match &item.expr {
        Expr::Literal { value } => {
            let ordinal = match value {
                Value::Int32(n) => i64::from(*n),
                Value::Int64(n) => *n,
                other => {
                    return Err(PlannerError::invalid_order_by(
                        other.to_string(),
                        "expected a column, alias or ordinal",
                    ))
                }
            };
            if ordinal >= 1 && (ordinal as usize) <= columns.len() {
                Ok(ordinal as usize - 1)
            } else {
                Err(PlannerError::invalid_order_by(
                    ordinal.to_string(),
                    format!("ordinal out of range 1..{}", columns.len()),
                ))
            }
        }
        Expr::Field(field) => {
            if field.table.is_none() {
                let named: Vec<usize> = columns
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.name().eq_ignore_ascii_case(&field.name))
                    .map(|(i, _)| i)
                    .collect();
                if let [single] = named.as_slice() {
                    return Ok(*single);
                }
            }
            let resolved = scope.resolve_field(field)?;
            columns
                .iter()
                .position(|c| {
                    matches!(c, PlanColumn::Value { operand: Operand::Column(x), .. } if *x == resolved)
                })
                .ok_or_else(|| {
                    PlannerError::invalid_order_by(field.display_name(), "not in the select list")
                        .at(field.position)
                })
        }
        other => Err(PlannerError::invalid_order_by(
            describe(other),
            "expected a column, alias or ordinal",
        )),
    }
}

/// One output column's source
#[derive(Debug, Clone)]
pub enum Projection {
    Value(BoundOperand),
    /// Index into the plan's aggregates
    Aggregate(usize),
}

#[derive(Debug, Clone)]
pub struct BoundAggregate {
    pub func: AggregateFunc,
    /// `None` for COUNT(*)
    pub arg: Option<BoundOperand>,
}

#[derive(Debug, Clone)]
pub struct Grouping {
    pub keys: Vec<BoundOperand>,
    pub key_names: Vec<String>,
    pub aggregates: Vec<BoundAggregate>,
}

/// Sort on an output column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: usize,
    pub descending: bool,
}

/// A table of a compiled plan
#[derive(Debug, Clone)]
pub struct CompiledTable {
    pub table: Arc<Table>,
    /// Alias, or the table name
    pub label: String,
    pub join: JoinType,
    /// Field positions to load, in slot order
    pub load: Vec<usize>,
    /// First slot of this table in the joined row
    pub offset: usize,
    pub filter: Option<BoundCondition>,
    pub filter_text: Option<String>,
}

/// Immutable, executable plan
#[derive(Debug, Clone)]
pub struct CompiledPlan {
    pub(crate) tables: Vec<CompiledTable>,
    pub(crate) residual: Option<BoundCondition>,
    pub(crate) residual_text: Option<String>,
    pub(crate) projection: Vec<Projection>,
    pub(crate) columns: Vec<ResultColumn>,
    pub(crate) grouping: Option<Grouping>,
    pub(crate) sort_keys: Vec<SortKey>,
    pub(crate) distinct: bool,
    pub(crate) limit: Option<usize>,
    pub(crate) offset: usize,
    pub(crate) parameter_count: usize,
    pub(crate) row_width: usize,
}

impl CompiledPlan {
    pub fn tables(&self) -> &[CompiledTable] {
        &self.tables
    }

    /// Output column metadata
    pub fn columns(&self) -> &[ResultColumn] {
        &self.columns
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    /// Rendered condition evaluated on the fully joined row
    pub fn residual_text(&self) -> Option<&str> {
        self.residual_text.as_deref()
    }

    pub fn has_residual(&self) -> bool {
        self.residual.is_some()
    }

    pub fn is_grouped(&self) -> bool {
        self.grouping.is_some()
    }

    pub fn sort_keys(&self) -> &[SortKey] {
        &self.sort_keys
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Width of the fully joined row
    pub fn row_width(&self) -> usize {
        self.row_width
    }

    /// True when rows can be emitted as they are produced
    pub fn is_streaming(&self) -> bool {
        self.grouping.is_none() && self.sort_keys.is_empty()
    }
}
