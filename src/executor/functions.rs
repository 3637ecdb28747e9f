//! Scalar function registry
//!
//! The registry is an explicit value built once and handed to the planner;
//! there is no global function table. Planning binds every call to an
//! `Arc<ScalarFunction>` after checking name and arity.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{Local, Timelike};
use rust_decimal::prelude::ToPrimitive;

use crate::value::{Value, ValuesConverter};

/// Result type of a function body; the message becomes PDX_FUNCTION_FAILED
pub type FunctionOutcome = Result<Value, String>;

/// SQL type reported for a function's result column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Fixed(&'static str),
    /// Same type as the first argument
    FirstArgument,
}

/// A registered scalar function
pub struct ScalarFunction {
    pub name: &'static str,
    pub min_args: usize,
    /// `None` for variadic functions
    pub max_args: Option<usize>,
    pub return_type: ReturnType,
    body: fn(&[Value]) -> FunctionOutcome,
}

impl ScalarFunction {
    pub fn new(
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        return_type: ReturnType,
        body: fn(&[Value]) -> FunctionOutcome,
    ) -> Self {
        Self {
            name,
            min_args,
            max_args,
            return_type,
            body,
        }
    }

    /// True if the function can be called with `count` arguments
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }

    /// Invokes the function on already evaluated arguments
    pub fn call(&self, args: &[Value]) -> FunctionOutcome {
        (self.body)(args)
    }
}

impl fmt::Debug for ScalarFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarFunction")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish()
    }
}

/// Registry of scalar functions keyed by upper-case name
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<ScalarFunction>>,
}

impl FunctionRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in functions
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for function in builtins() {
            registry.register(function);
        }
        registry
    }

    /// Registers a function, replacing any function with the same name
    pub fn register(&mut self, function: ScalarFunction) {
        self.functions
            .insert(function.name.to_ascii_uppercase(), Arc::new(function));
    }

    /// Looks a function up by name (case-insensitive) and arity
    pub fn resolve(&self, name: &str, arity: usize) -> Option<Arc<ScalarFunction>> {
        self.functions
            .get(&name.to_ascii_uppercase())
            .filter(|f| f.accepts(arity))
            .cloned()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.values().map(|f| f.name).collect();
        names.sort_unstable();
        names
    }
}

fn builtins() -> Vec<ScalarFunction> {
    use ReturnType::{FirstArgument, Fixed};
    vec![
        ScalarFunction::new("UPPER", 1, Some(1), Fixed("VARCHAR"), upper),
        ScalarFunction::new("LOWER", 1, Some(1), Fixed("VARCHAR"), lower),
        ScalarFunction::new("LENGTH", 1, Some(1), Fixed("INTEGER"), length),
        ScalarFunction::new("ASCII", 1, Some(1), Fixed("INTEGER"), ascii),
        ScalarFunction::new("RIGHT", 2, Some(2), Fixed("VARCHAR"), right),
        ScalarFunction::new("REPLACE", 3, Some(3), Fixed("VARCHAR"), replace),
        ScalarFunction::new("RPAD", 3, Some(3), Fixed("VARCHAR"), rpad),
        ScalarFunction::new("SUBSTRING", 2, Some(3), Fixed("VARCHAR"), substring),
        ScalarFunction::new("NVL", 2, Some(2), FirstArgument, nvl),
        ScalarFunction::new("COALESCE", 1, None, FirstArgument, coalesce),
        ScalarFunction::new("HEX", 1, Some(1), Fixed("VARCHAR"), hex),
        ScalarFunction::new("NUMERIC", 1, Some(1), Fixed("DOUBLE"), numeric),
        ScalarFunction::new("BINARY", 1, Some(1), Fixed("BINARY"), binary),
        ScalarFunction::new("CURRENT_TIME", 0, Some(1), Fixed("TIME"), current_time),
        ScalarFunction::new("HOUR", 1, Some(1), Fixed("INTEGER"), hour),
    ]
}

fn text_arg(value: &Value) -> Result<Option<String>, String> {
    ValuesConverter::to_text(value).map_err(|e| e.to_string())
}

/// Non-negative integer argument
fn size_arg(value: &Value) -> Result<Option<usize>, String> {
    match ValuesConverter::to_int32(value).map_err(|e| e.to_string())? {
        None => Ok(None),
        Some(n) if n < 0 => Err(format!("expected a non-negative integer, got {}", n)),
        Some(n) => Ok(Some(n as usize)),
    }
}

fn upper(args: &[Value]) -> FunctionOutcome {
    Ok(text_arg(&args[0])?.map_or(Value::Null, |s| Value::Text(s.to_uppercase())))
}

fn lower(args: &[Value]) -> FunctionOutcome {
    Ok(text_arg(&args[0])?.map_or(Value::Null, |s| Value::Text(s.to_lowercase())))
}

fn length(args: &[Value]) -> FunctionOutcome {
    Ok(text_arg(&args[0])?.map_or(Value::Null, |s| Value::Int32(s.chars().count() as i32)))
}

fn ascii(args: &[Value]) -> FunctionOutcome {
    Ok(text_arg(&args[0])?
        .and_then(|s| s.chars().next())
        .map_or(Value::Null, |c| Value::Int32(c as i32)))
}

fn right(args: &[Value]) -> FunctionOutcome {
    let (Some(text), Some(size)) = (text_arg(&args[0])?, size_arg(&args[1])?) else {
        return Ok(Value::Null);
    };
    let count = text.chars().count();
    Ok(Value::Text(text.chars().skip(count.saturating_sub(size)).collect()))
}

fn replace(args: &[Value]) -> FunctionOutcome {
    let (Some(text), Some(from), Some(to)) =
        (text_arg(&args[0])?, text_arg(&args[1])?, text_arg(&args[2])?)
    else {
        return Ok(Value::Null);
    };
    if from.is_empty() {
        return Ok(Value::Text(text));
    }
    Ok(Value::Text(text.replace(&from, &to)))
}

fn rpad(args: &[Value]) -> FunctionOutcome {
    let (Some(text), Some(size), Some(fill)) =
        (text_arg(&args[0])?, size_arg(&args[1])?, text_arg(&args[2])?)
    else {
        return Ok(Value::Null);
    };
    let mut chars: Vec<char> = text.chars().collect();
    if chars.len() < size && fill.is_empty() {
        return Err("padding string is empty".into());
    }
    while chars.len() < size {
        chars.extend(fill.chars());
    }
    chars.truncate(size);
    Ok(Value::Text(chars.into_iter().collect()))
}

/// SUBSTRING(text, start [, length]) with a 1-based start
fn substring(args: &[Value]) -> FunctionOutcome {
    let Some(text) = text_arg(&args[0])? else {
        return Ok(Value::Null);
    };
    let Some(start) = ValuesConverter::to_int64(&args[1]).map_err(|e| e.to_string())? else {
        return Ok(Value::Null);
    };
    let length = match args.get(2) {
        Some(v) => match ValuesConverter::to_int64(v).map_err(|e| e.to_string())? {
            Some(n) if n < 0 => return Err(format!("negative substring length {}", n)),
            Some(n) => Some(n),
            None => return Ok(Value::Null),
        },
        None => None,
    };

    // Positions before 1 still consume length, as in standard SQL.
    let end = length.map(|n| start.saturating_add(n));
    let first = start.max(1);
    let result: String = text
        .chars()
        .enumerate()
        .map(|(i, c)| (i as i64 + 1, c))
        .filter(|(pos, _)| *pos >= first && end.map_or(true, |e| *pos < e))
        .map(|(_, c)| c)
        .collect();
    Ok(Value::Text(result))
}

fn nvl(args: &[Value]) -> FunctionOutcome {
    Ok(if args[0].is_null() {
        args[1].clone()
    } else {
        args[0].clone()
    })
}

fn coalesce(args: &[Value]) -> FunctionOutcome {
    Ok(args
        .iter()
        .find(|v| !v.is_null())
        .cloned()
        .unwrap_or(Value::Null))
}

/// Hexadecimal form of the integral part, lower case
fn hex(args: &[Value]) -> FunctionOutcome {
    let Some(decimal) = ValuesConverter::to_decimal(&args[0]).map_err(|e| e.to_string())? else {
        return Ok(Value::Null);
    };
    let n = decimal
        .trunc()
        .to_i128()
        .ok_or_else(|| format!("{} is out of range", decimal))?;
    let text = if n < 0 {
        format!("-{:x}", n.unsigned_abs())
    } else {
        format!("{:x}", n)
    };
    Ok(Value::Text(text))
}

fn numeric(args: &[Value]) -> FunctionOutcome {
    Ok(ValuesConverter::to_f64(&args[0])
        .map_err(|e| e.to_string())?
        .map_or(Value::Null, Value::Float64))
}

fn binary(args: &[Value]) -> FunctionOutcome {
    Ok(ValuesConverter::to_bytes(&args[0])
        .map_err(|e| e.to_string())?
        .map_or(Value::Null, Value::Bytes))
}

/// CURRENT_TIME([precision]) in local time; precision is 0 to 6
fn current_time(args: &[Value]) -> FunctionOutcome {
    if let Some(arg) = args.first() {
        match ValuesConverter::to_int32(arg).map_err(|e| e.to_string())? {
            Some(n) if (0..=6).contains(&n) => {}
            _ => return Err(format!("invalid time precision {}", arg)),
        }
    }
    Ok(Value::Time(Local::now().time()))
}

/// Hour of day of a time or timestamp
fn hour(args: &[Value]) -> FunctionOutcome {
    Ok(ValuesConverter::to_time(&args[0])
        .map_err(|e| e.to_string())?
        .map_or(Value::Null, |t| Value::Int32(t.hour() as i32)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: Vec<Value>) -> FunctionOutcome {
        let registry = FunctionRegistry::with_builtins();
        let f = registry.resolve(name, args.len()).unwrap();
        f.call(&args)
    }

    #[test]
    fn test_resolve_checks_arity() {
        let registry = FunctionRegistry::with_builtins();
        assert!(registry.resolve("upper", 1).is_some());
        assert!(registry.resolve("UPPER", 2).is_none());
        assert!(registry.resolve("COALESCE", 5).is_some());
        assert!(registry.resolve("SUBSTRING", 3).is_some());
        assert!(registry.resolve("NOPE", 1).is_none());
        assert!(registry.resolve("CURRENT_TIME", 0).is_some());
        assert!(registry.resolve("CURRENT_TIME", 2).is_none());
        assert_eq!(registry.names().len(), 15);
    }

    #[test]
    fn test_string_functions() {
        assert_eq!(call("UPPER", vec!["abc".into()]), Ok(Value::from("ABC")));
        assert_eq!(call("LENGTH", vec!["ação".into()]), Ok(Value::Int32(4)));
        assert_eq!(call("ASCII", vec!["A".into()]), Ok(Value::Int32(65)));
        assert_eq!(call("ASCII", vec!["".into()]), Ok(Value::Null));
        assert_eq!(call("RIGHT", vec!["abcdef".into(), 2.into()]), Ok(Value::from("ef")));
        assert_eq!(call("RIGHT", vec!["ab".into(), 5.into()]), Ok(Value::from("ab")));
        assert_eq!(
            call("REPLACE", vec!["a-b-c".into(), "-".into(), "+".into()]),
            Ok(Value::from("a+b+c"))
        );
        assert_eq!(
            call("RPAD", vec!["ab".into(), 5.into(), "xy".into()]),
            Ok(Value::from("abxyx"))
        );
        assert_eq!(
            call("RPAD", vec!["abcdef".into(), 3.into(), "x".into()]),
            Ok(Value::from("abc"))
        );
        assert!(call("RPAD", vec!["a".into(), 3.into(), "".into()]).is_err());
        assert!(call("RIGHT", vec!["a".into(), (-1).into()]).is_err());
    }

    #[test]
    fn test_substring() {
        assert_eq!(call("SUBSTRING", vec!["hello".into(), 2.into()]), Ok(Value::from("ello")));
        assert_eq!(
            call("SUBSTRING", vec!["hello".into(), 2.into(), 3.into()]),
            Ok(Value::from("ell"))
        );
        assert_eq!(
            call("SUBSTRING", vec!["hello".into(), 0.into(), 2.into()]),
            Ok(Value::from("h"))
        );
    }

    #[test]
    fn test_null_handling() {
        assert_eq!(call("UPPER", vec![Value::Null]), Ok(Value::Null));
        assert_eq!(call("NVL", vec![Value::Null, 3.into()]), Ok(Value::Int32(3)));
        assert_eq!(call("NVL", vec![1.into(), 3.into()]), Ok(Value::Int32(1)));
        assert_eq!(
            call("COALESCE", vec![Value::Null, Value::Null, "x".into()]),
            Ok(Value::from("x"))
        );
        assert_eq!(call("COALESCE", vec![Value::Null]), Ok(Value::Null));
    }

    #[test]
    fn test_numeric_functions() {
        assert_eq!(call("HEX", vec![255.into()]), Ok(Value::from("ff")));
        assert_eq!(call("HEX", vec![(-26).into()]), Ok(Value::from("-1a")));
        assert_eq!(call("HEX", vec![10.9.into()]), Ok(Value::from("a")));
        assert_eq!(call("NUMERIC", vec!["2.5".into()]), Ok(Value::Float64(2.5)));
        assert!(call("NUMERIC", vec!["abc".into()]).is_err());
    }

    #[test]
    fn test_hour_reads_time_and_timestamp() {
        let time = chrono::NaiveTime::from_hms_opt(17, 5, 0).unwrap();
        let stamp = chrono::NaiveDate::from_ymd_opt(2020, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(call("HOUR", vec![Value::Time(time)]), Ok(Value::Int32(17)));
        assert_eq!(call("HOUR", vec![Value::Timestamp(stamp)]), Ok(Value::Int32(9)));
        assert_eq!(call("HOUR", vec!["23:01:02".into()]), Ok(Value::Int32(23)));
        assert_eq!(call("HOUR", vec![Value::Null]), Ok(Value::Null));
        assert!(call("HOUR", vec![Value::Bool(true)]).is_err());
    }

    #[test]
    fn test_binary_and_current_time() {
        assert_eq!(call("BINARY", vec!["ab".into()]), Ok(Value::Bytes(vec![b'a', b'b'])));
        assert_eq!(call("BINARY", vec![Value::Bytes(vec![1, 2])]), Ok(Value::Bytes(vec![1, 2])));
        assert_eq!(call("BINARY", vec![Value::Null]), Ok(Value::Null));

        assert!(matches!(call("CURRENT_TIME", vec![]), Ok(Value::Time(_))));
        assert!(matches!(call("CURRENT_TIME", vec![3.into()]), Ok(Value::Time(_))));
        assert!(call("CURRENT_TIME", vec![7.into()]).is_err());
    }
}
