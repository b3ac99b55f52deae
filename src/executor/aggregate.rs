//! Aggregate functions.
//!
//! Aggregation produces exactly one row with one column per SELECT item.
//! Three kinds of arguments are accepted:
//!
//! - `*`: only `count`, which counts tuples
//! - a numeric literal such as `count(1)` or `max(2.5)`: `count` counts
//!   tuples, `max`/`min`/`avg` return the literal
//! - a column: NULLs are skipped; numeric columns support every function,
//!   CHARS and DATES columns everything but `avg`
//!
//! Numeric results are FLOATS. An extremum or mean over no values is NULL.

use std::fmt;

use tracing::debug;

use crate::datum::{AttrType, Value};
use crate::sql::RelAttr;

use super::error::ExecutorError;
use super::tuple::{Tuple, TupleField, TupleSchema, TupleSet};

/// Supported aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    /// COUNT: counts tuples or non-NULL values.
    Count,
    /// MAX: largest non-NULL value.
    Max,
    /// MIN: smallest non-NULL value.
    Min,
    /// AVG: mean of non-NULL numeric values.
    Avg,
}

impl AggregateFunction {
    /// Resolves a function name (case-insensitive).
    ///
    /// Returns `None` for anything that is not an aggregate function.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "count" => Some(AggregateFunction::Count),
            "max" => Some(AggregateFunction::Max),
            "min" => Some(AggregateFunction::Min),
            "avg" => Some(AggregateFunction::Avg),
            _ => None,
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateFunction::Count => write!(f, "count"),
            AggregateFunction::Max => write!(f, "max"),
            AggregateFunction::Min => write!(f, "min"),
            AggregateFunction::Avg => write!(f, "avg"),
        }
    }
}

/// Returns true for a non-empty name made only of digits and dots.
pub fn is_numeric_literal(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Aggregates `input` into a one-row tuple set.
///
/// `items` pairs each function name with its argument, in SELECT order.
/// `resolve` maps a column argument to its index in `input`'s schema.
pub fn aggregate<F>(items: &[(String, RelAttr)], input: &TupleSet, resolve: F) -> Result<TupleSet, ExecutorError>
where
    F: Fn(&RelAttr) -> Result<usize, ExecutorError>,
{
    debug!(items = items.len(), rows = input.len(), "aggregate");
    let mut schema = TupleSchema::new();
    let mut values = Vec::with_capacity(items.len());

    for (name, attr) in items {
        let function = AggregateFunction::from_name(name)
            .ok_or_else(|| ExecutorError::SqlSyntax(format!("unknown aggregate function \"{}\"", name)))?;

        if attr.is_star() || is_numeric_literal(&attr.attribute_name) {
            values.push(aggregate_constant(function, attr, input.len())?);
            schema.add(TupleField::aggregate(AttrType::Floats, "", attr.attribute_name.clone(), name.clone()));
            continue;
        }

        let index = resolve(attr)?;
        let field = input.schema().field(index);
        let (attr_type, value) = if field.attr_type.is_numeric() {
            (AttrType::Floats, aggregate_numeric(function, input.tuples(), index))
        } else {
            aggregate_textual(function, field.attr_type, input.tuples(), index)?
        };
        values.push(value);
        schema.add(TupleField::aggregate(
            attr_type,
            field.table_name.clone(),
            field.field_name.clone(),
            name.clone(),
        ));
    }

    let mut result = TupleSet::new(schema);
    result.push(Tuple::from_values(values));
    Ok(result)
}

fn aggregate_constant(function: AggregateFunction, attr: &RelAttr, count: usize) -> Result<Value, ExecutorError> {
    match function {
        AggregateFunction::Count => Ok(Value::Float(count as f32)),
        _ if attr.is_star() => Err(ExecutorError::SqlSyntax(format!("{}(*) is not supported", function))),
        _ => attr
            .attribute_name
            .parse::<f32>()
            .map(Value::Float)
            .map_err(|_| ExecutorError::SqlSyntax(format!("invalid number \"{}\"", attr.attribute_name))),
    }
}

fn aggregate_numeric(function: AggregateFunction, tuples: &[Tuple], index: usize) -> Value {
    let numbers: Vec<f64> = tuples.iter().filter_map(|t| t.get(index).as_f64()).collect();

    if function == AggregateFunction::Count {
        return Value::Float(numbers.len() as f32);
    }
    if numbers.is_empty() {
        return Value::Null;
    }

    let result = match function {
        AggregateFunction::Avg => numbers.iter().sum::<f64>() / numbers.len() as f64,
        AggregateFunction::Max => numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregateFunction::Min => numbers.iter().copied().fold(f64::INFINITY, f64::min),
        AggregateFunction::Count => numbers.len() as f64,
    };
    Value::Float(result as f32)
}

fn aggregate_textual(
    function: AggregateFunction,
    attr_type: AttrType,
    tuples: &[Tuple],
    index: usize,
) -> Result<(AttrType, Value), ExecutorError> {
    let texts: Vec<&Value> = tuples.iter().map(|t| t.get(index)).filter(|v| !v.is_null()).collect();

    let extremum = match function {
        AggregateFunction::Count => return Ok((AttrType::Floats, Value::Float(texts.len() as f32))),
        AggregateFunction::Avg => {
            return Err(ExecutorError::SqlSyntax(format!("avg is not defined for {}", attr_type)))
        }
        AggregateFunction::Max => texts.into_iter().max_by(|a, b| a.sort_cmp(b)),
        AggregateFunction::Min => texts.into_iter().min_by(|a, b| a.sort_cmp(b)),
    };
    Ok((attr_type, extremum.cloned().unwrap_or(Value::Null)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> TupleSet {
        let mut schema = TupleSchema::new();
        schema.add(TupleField::new(AttrType::Ints, "t", "a"));
        schema.add(TupleField::new(AttrType::Chars, "t", "b"));
        schema.add(TupleField::new(AttrType::Floats, "t", "f"));
        let rows = vec![
            vec![Value::Int(1), Value::Chars("x".into()), Value::Null],
            vec![Value::Int(2), Value::Chars("y".into()), Value::Null],
            vec![Value::Null, Value::Chars("x".into()), Value::Null],
        ];
        TupleSet::with_tuples(schema, rows.into_iter().map(Tuple::from_values).collect())
    }

    fn resolve(attr: &RelAttr) -> Result<usize, ExecutorError> {
        input()
            .schema()
            .index_of_field("t", &attr.attribute_name)
            .ok_or_else(|| ExecutorError::SqlSyntax(attr.to_string()))
    }

    fn run(items: &[(&str, RelAttr)]) -> Result<Vec<Value>, ExecutorError> {
        let items: Vec<(String, RelAttr)> = items.iter().map(|(n, a)| (n.to_string(), a.clone())).collect();
        let result = aggregate(&items, &input(), resolve)?;
        assert_eq!(result.len(), 1);
        Ok(result.tuples()[0].values().iter().map(|v| (**v).clone()).collect())
    }

    #[test]
    fn test_numeric_column() {
        let values = run(&[
            ("avg", RelAttr::new("a")),
            ("max", RelAttr::new("a")),
            ("min", RelAttr::new("a")),
            ("count", RelAttr::new("a")),
        ])
        .unwrap();
        assert_eq!(
            values,
            vec![Value::Float(1.5), Value::Float(2.0), Value::Float(1.0), Value::Float(2.0)]
        );
    }

    #[test]
    fn test_star_and_literals() {
        let values = run(&[
            ("count", RelAttr::star()),
            ("COUNT", RelAttr::new("1")),
            ("max", RelAttr::new("2.5")),
        ])
        .unwrap();
        assert_eq!(values, vec![Value::Float(3.0), Value::Float(3.0), Value::Float(2.5)]);

        assert!(matches!(run(&[("max", RelAttr::star())]), Err(ExecutorError::SqlSyntax(_))));
        assert!(matches!(run(&[("avg", RelAttr::new("1.2.3"))]), Err(ExecutorError::SqlSyntax(_))));
    }

    #[test]
    fn test_string_column() {
        let values = run(&[
            ("min", RelAttr::new("b")),
            ("max", RelAttr::new("b")),
            ("count", RelAttr::new("b")),
        ])
        .unwrap();
        assert_eq!(
            values,
            vec![Value::Chars("x".into()), Value::Chars("y".into()), Value::Float(3.0)]
        );
        assert!(matches!(run(&[("avg", RelAttr::new("b"))]), Err(ExecutorError::SqlSyntax(_))));
    }

    #[test]
    fn test_all_null_column() {
        let values = run(&[("avg", RelAttr::new("f")), ("count", RelAttr::new("f"))]).unwrap();
        assert_eq!(values, vec![Value::Null, Value::Float(0.0)]);
    }

    #[test]
    fn test_unknown_function_and_column() {
        assert!(matches!(run(&[("sum", RelAttr::new("a"))]), Err(ExecutorError::SqlSyntax(_))));
        assert!(matches!(run(&[("", RelAttr::new("a"))]), Err(ExecutorError::SqlSyntax(_))));
        assert!(matches!(run(&[("max", RelAttr::new("zz"))]), Err(ExecutorError::SqlSyntax(_))));
    }

    #[test]
    fn test_result_schema() {
        let items = vec![
            ("avg".to_string(), RelAttr::new("a")),
            ("count".to_string(), RelAttr::star()),
            ("max".to_string(), RelAttr::new("b")),
        ];
        let result = aggregate(&items, &input(), resolve).unwrap();
        let headers: Vec<String> = result.schema().fields().iter().map(|f| f.header(true)).collect();
        assert_eq!(headers, vec!["avg(t.a)", "count(*)", "max(t.b)"]);
        assert_eq!(result.schema().field(2).attr_type, AttrType::Chars);
    }

    #[test]
    fn test_numeric_literal_predicate() {
        assert!(is_numeric_literal("3.14"));
        assert!(is_numeric_literal("10"));
        assert!(!is_numeric_literal(""));
        assert!(!is_numeric_literal("a1"));
        assert!(!is_numeric_literal("*"));
    }
}
