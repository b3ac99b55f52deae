//! Column types and scalar values.
//!
//! [`AttrType`] names the column types the storage layer knows about and
//! [`Value`] carries a single typed scalar. The comparison rules used by every
//! predicate in the executor live here as well:
//!
//! - INTS and FLOATS compare numerically (an INT is promoted when it meets a FLOAT)
//! - CHARS and DATES compare as byte strings
//! - NULLS never compares; only `IS NULL` / `NOT NULL` can accept it

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

use crate::sql::CompOp;

/// Width in bytes of a stored DATES value (`YYYY-MM-DD`).
pub const DATE_WIDTH: usize = 10;

/// Number of decimals printed for FLOATS unless configured otherwise.
pub const DEFAULT_FLOAT_PRECISION: usize = 2;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrType {
    /// NUL-terminated fixed-width string.
    Chars,
    /// 4-byte signed integer.
    Ints,
    /// 4-byte floating point.
    Floats,
    /// Calendar date stored as a `YYYY-MM-DD` string.
    Dates,
    /// Type of the NULL literal.
    Nulls,
}

impl AttrType {
    /// Returns true for INTS and FLOATS.
    pub const fn is_numeric(self) -> bool {
        matches!(self, AttrType::Ints | AttrType::Floats)
    }

    /// Returns true for CHARS and DATES, which compare as byte strings.
    pub const fn is_textual(self) -> bool {
        matches!(self, AttrType::Chars | AttrType::Dates)
    }

    /// Returns the storage width for fixed-size types, or `None` when the
    /// width is declared per column (CHARS).
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            AttrType::Ints | AttrType::Floats => Some(4),
            AttrType::Dates => Some(DATE_WIDTH),
            AttrType::Nulls => Some(0),
            AttrType::Chars => None,
        }
    }

    /// Returns true if a predicate may compare values of these two types.
    ///
    /// NULLS is compatible with everything; numeric types mix freely and so
    /// do CHARS and DATES.
    pub fn is_comparable_with(self, other: AttrType) -> bool {
        self == other
            || self == AttrType::Nulls
            || other == AttrType::Nulls
            || (self.is_numeric() && other.is_numeric())
            || (self.is_textual() && other.is_textual())
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttrType::Chars => "CHARS",
            AttrType::Ints => "INTS",
            AttrType::Floats => "FLOATS",
            AttrType::Dates => "DATES",
            AttrType::Nulls => "NULLS",
        };
        f.write_str(name)
    }
}

/// A typed scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// INTS value.
    Int(i32),
    /// FLOATS value.
    Float(f32),
    /// CHARS value.
    Chars(String),
    /// DATES value, always normalized to `YYYY-MM-DD`.
    Date(String),
}

impl Value {
    /// Parses and normalizes a date literal.
    ///
    /// Returns `None` unless `text` names a real calendar day that fits the
    /// stored width (`2021-2-3` becomes `2021-02-03`).
    pub fn date(text: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()?;
        let normalized = date.format(DATE_FORMAT).to_string();
        (normalized.len() == DATE_WIDTH).then_some(Value::Date(normalized))
    }

    /// Returns the type of this value.
    pub fn attr_type(&self) -> AttrType {
        match self {
            Value::Null => AttrType::Nulls,
            Value::Int(_) => AttrType::Ints,
            Value::Float(_) => AttrType::Floats,
            Value::Chars(_) => AttrType::Chars,
            Value::Date(_) => AttrType::Dates,
        }
    }

    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the numeric value widened to `f64`, or `None` for non-numeric values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(f64::from(*n)),
            Value::Float(n) => Some(f64::from(*n)),
            _ => None,
        }
    }

    /// Returns the string payload of CHARS and DATES values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Chars(s) | Value::Date(s) => Some(s),
            _ => None,
        }
    }

    /// Compares two values.
    ///
    /// Returns `None` when either side is NULL or the types are not
    /// comparable; callers must treat that as "predicate is false".
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => Some(a.partial_cmp(b).unwrap_or(Ordering::Equal)),
            (Value::Int(_), Value::Float(_)) | (Value::Float(_), Value::Int(_)) => {
                let (a, b) = (self.as_f64()?, other.as_f64()?);
                Some(a.partial_cmp(&b).unwrap_or(Ordering::Equal))
            }
            (Value::Chars(a) | Value::Date(a), Value::Chars(b) | Value::Date(b)) => {
                Some(a.as_bytes().cmp(b.as_bytes()))
            }
            _ => None,
        }
    }

    /// Total order used by ORDER BY: NULL sorts before every other value.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }

    /// Formats this value for a result set.
    pub fn to_text(&self, float_precision: usize) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => format_float(*n, float_precision),
            Value::Chars(s) | Value::Date(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text(DEFAULT_FLOAT_PRECISION))
    }
}

/// Formats a float with `precision` decimals, trimming trailing zeros and a
/// dangling decimal point (`2.50` -> `2.5`, `3.00` -> `3`).
pub fn format_float(value: f32, precision: usize) -> String {
    let text = format!("{:.*}", precision, value);
    let trimmed = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text.as_str()
    };
    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Maps a comparison operator and an ordering to the predicate outcome.
///
/// Only the six ordering operators are meaningful here; the NULL tests
/// never reach this function and yield false.
pub fn judge(op: CompOp, ordering: Ordering) -> bool {
    match op {
        CompOp::EqualTo => ordering == Ordering::Equal,
        CompOp::NotEqual => ordering != Ordering::Equal,
        CompOp::LessThan => ordering == Ordering::Less,
        CompOp::LessEqual => ordering != Ordering::Greater,
        CompOp::GreatThan => ordering == Ordering::Greater,
        CompOp::GreatEqual => ordering != Ordering::Less,
        CompOp::IsNull | CompOp::NotNull | CompOp::NoOp => false,
    }
}

/// Evaluates `left <op> right` with NULL semantics.
///
/// `IS NULL` holds when both sides are NULL and `NOT NULL` when exactly one
/// side is. Every other operator rejects a NULL on either side.
pub fn evaluate(op: CompOp, left: &Value, right: &Value) -> bool {
    match op {
        CompOp::IsNull => left.is_null() && right.is_null(),
        CompOp::NotNull => left.is_null() != right.is_null(),
        _ => left
            .compare(right)
            .is_some_and(|ordering| judge(op, ordering)),
    }
}
