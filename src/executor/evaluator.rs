//! Per-row evaluation of bound conditions and operands

use std::borrow::Cow;
use std::cmp::Ordering;

use super::errors::{ExecutorError, ExecutorResult};
use crate::planner::{BoundCondition, BoundOperand};
use crate::value::{LikePattern, Value, ValuesComparator};

impl BoundOperand {
    /// Value of the operand for `row`; slots past the row end read as NULL
    pub fn evaluate<'v>(&'v self, row: &'v [Value], params: &'v [Value]) -> ExecutorResult<Cow<'v, Value>> {
        Ok(match self {
            BoundOperand::Slot(slot) => match row.get(*slot) {
                Some(v) => Cow::Borrowed(v),
                None => Cow::Owned(Value::Null),
            },
            BoundOperand::Literal(v) => Cow::Borrowed(v),
            BoundOperand::Parameter(index) => Cow::Borrowed(
                params
                    .get(*index)
                    .ok_or_else(|| ExecutorError::missing_parameter(index + 1, params.len()))?,
            ),
            BoundOperand::Function { function, args } => {
                let values = args
                    .iter()
                    .map(|a| a.evaluate(row, params).map(Cow::into_owned))
                    .collect::<ExecutorResult<Vec<_>>>()?;
                Cow::Owned(
                    function
                        .call(&values)
                        .map_err(|reason| ExecutorError::function_failed(function.name, reason))?,
                )
            }
        })
    }
}

impl BoundCondition {
    /// Evaluates the condition for `row`
    ///
    /// Comparisons with a NULL side are false, so `NOT (x = NULL)` is true.
    pub fn evaluate(&self, row: &[Value], params: &[Value]) -> ExecutorResult<bool> {
        match self {
            BoundCondition::And(children) => {
                for child in children {
                    if !child.evaluate(row, params)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            BoundCondition::Or(children) => {
                for child in children {
                    if child.evaluate(row, params)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            BoundCondition::Not(child) => Ok(!child.evaluate(row, params)?),
            BoundCondition::Compare { op, left, right } => {
                let left = left.evaluate(row, params)?;
                let right = right.evaluate(row, params)?;
                Ok(ValuesComparator::compare_with(&left, &right, |o| op.test(o)))
            }
            BoundCondition::Between { expr, low, high } => {
                let value = expr.evaluate(row, params)?;
                let low = low.evaluate(row, params)?;
                let high = high.evaluate(row, params)?;
                Ok(
                    ValuesComparator::compare_with(&low, &value, |o| o != Ordering::Greater)
                        && ValuesComparator::compare_with(&value, &high, |o| o != Ordering::Greater),
                )
            }
            BoundCondition::Like {
                expr,
                pattern,
                compiled,
                escape,
                case_insensitive,
            } => {
                let value = expr.evaluate(row, params)?;
                let Some(text) = value.to_text() else {
                    return Ok(false);
                };
                if let Some(like) = compiled {
                    return Ok(like.matches(&text));
                }
                let Some(pattern) = pattern.evaluate(row, params)?.to_text() else {
                    return Ok(false);
                };
                let like = LikePattern::compile(&pattern, *escape, *case_insensitive).map_err(|e| {
                    ExecutorError::execution_failed(format!("invalid LIKE pattern '{}': {}", pattern, e))
                })?;
                Ok(like.matches(&text))
            }
            BoundCondition::IsNull { expr, negated } => {
                Ok(expr.evaluate(row, params)?.is_null() != *negated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ExecutorErrorCode, FunctionRegistry};
    use crate::planner::CompareOp;

    fn slot(i: usize) -> BoundOperand {
        BoundOperand::Slot(i)
    }

    fn lit(v: impl Into<Value>) -> BoundOperand {
        BoundOperand::Literal(v.into())
    }

    fn compare(op: CompareOp, left: BoundOperand, right: BoundOperand) -> BoundCondition {
        BoundCondition::Compare { op, left, right }
    }

    fn like(pattern: &str, case_insensitive: bool) -> BoundCondition {
        BoundCondition::Like {
            expr: slot(1),
            pattern: lit(pattern),
            compiled: None,
            escape: Some('\\'),
            case_insensitive,
        }
    }

    #[test]
    fn test_comparisons() {
        let row = vec![Value::Int32(5), Value::from("abc")];
        assert!(compare(CompareOp::Equals, slot(0), lit(5)).evaluate(&row, &[]).unwrap());
        assert!(compare(CompareOp::LessThan, slot(0), lit("6")).evaluate(&row, &[]).unwrap());
        assert!(!compare(CompareOp::GreaterThan, slot(0), lit(5)).evaluate(&row, &[]).unwrap());
    }

    #[test]
    fn test_null_comparisons_are_false() {
        let row = vec![Value::Null];
        assert!(!compare(CompareOp::Equals, slot(0), lit(1)).evaluate(&row, &[]).unwrap());
        assert!(!compare(CompareOp::NotEquals, slot(0), lit(1)).evaluate(&row, &[]).unwrap());
        let not = BoundCondition::Not(Box::new(compare(CompareOp::Equals, slot(0), lit(1))));
        assert!(not.evaluate(&row, &[]).unwrap());
    }

    #[test]
    fn test_between_is_inclusive() {
        let between = |v: i32| BoundCondition::Between {
            expr: lit(v),
            low: lit(1),
            high: lit(3),
        };
        assert!(between(1).evaluate(&[], &[]).unwrap());
        assert!(between(3).evaluate(&[], &[]).unwrap());
        assert!(!between(4).evaluate(&[], &[]).unwrap());
    }

    #[test]
    fn test_like_and_ilike() {
        let row = vec![Value::Null, Value::from("Paradox_7")];
        assert!(like("Para%", false).evaluate(&row, &[]).unwrap());
        assert!(!like("para%", false).evaluate(&row, &[]).unwrap());
        assert!(like("para%", true).evaluate(&row, &[]).unwrap());
        assert!(like("Paradox\\__", false).evaluate(&row, &[]).unwrap());

        let null_row = vec![Value::Null, Value::Null];
        assert!(!like("%", false).evaluate(&null_row, &[]).unwrap());
    }

    #[test]
    fn test_is_null() {
        let row = vec![Value::Null, Value::Int32(1)];
        let is_null = |i, negated| BoundCondition::IsNull { expr: slot(i), negated };
        assert!(is_null(0, false).evaluate(&row, &[]).unwrap());
        assert!(!is_null(1, false).evaluate(&row, &[]).unwrap());
        assert!(is_null(1, true).evaluate(&row, &[]).unwrap());
    }

    #[test]
    fn test_parameters_and_functions() {
        let registry = FunctionRegistry::with_builtins();
        let upper = BoundOperand::Function {
            function: registry.resolve("UPPER", 1).unwrap(),
            args: vec![slot(0)],
        };
        let cond = compare(CompareOp::Equals, upper, BoundOperand::Parameter(0));
        let row = vec![Value::from("abc")];
        assert!(cond.evaluate(&row, &[Value::from("ABC")]).unwrap());

        let err = cond.evaluate(&row, &[]).unwrap_err();
        assert_eq!(err.code(), ExecutorErrorCode::PdxMissingParameter);
    }

    #[test]
    fn test_function_failure_propagates() {
        let registry = FunctionRegistry::with_builtins();
        let numeric = BoundOperand::Function {
            function: registry.resolve("NUMERIC", 1).unwrap(),
            args: vec![lit("abc")],
        };
        let err = numeric.evaluate(&[], &[]).unwrap_err();
        assert_eq!(err.code(), ExecutorErrorCode::PdxFunctionFailed);
    }

    #[test]
    fn test_and_or() {
        let t = compare(CompareOp::Equals, lit(1), lit(1));
        let f = compare(CompareOp::Equals, lit(1), lit(2));
        assert!(!BoundCondition::And(vec![t.clone(), f.clone()]).evaluate(&[], &[]).unwrap());
        assert!(BoundCondition::Or(vec![f, t]).evaluate(&[], &[]).unwrap());
        assert!(BoundCondition::And(vec![]).evaluate(&[], &[]).unwrap());
    }
}
