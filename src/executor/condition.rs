//! Single-table condition filters.
//!
//! A [`ConditionFilter`] is a WHERE conjunct bound to the physical layout of
//! one table: attribute operands become [`FieldMeta`] lookups and literal
//! operands are kept as values. [`Filter`] combines bound conjuncts and is
//! what a scan node evaluates against every record.

use tracing::warn;

use crate::datum::{evaluate, AttrType, Value};
use crate::sql::{CompOp, Condition, Operand};
use crate::storage::{FieldMeta, Record, StorageError, TableMeta};

use super::error::ExecutorError;

/// One bound side of a condition.
#[derive(Debug, Clone, PartialEq)]
enum Side {
    Field(FieldMeta),
    Value(Value),
}

impl Side {
    fn attr_type(&self) -> AttrType {
        match self {
            Side::Field(field) => field.attr_type,
            Side::Value(value) => value.attr_type(),
        }
    }

    fn read(&self, record: &Record) -> Result<Value, StorageError> {
        match self {
            Side::Field(field) => record.value(field),
            Side::Value(value) => Ok(value.clone()),
        }
    }
}

/// A condition bound to one table.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionFilter {
    left: Side,
    comp: CompOp,
    right: Side,
}

impl ConditionFilter {
    /// Binds `condition` to the table described by `meta`.
    ///
    /// A qualified attribute must name this table. A CHARS literal compared
    /// with a DATES column is normalized to a date when it parses as one.
    pub fn bind(meta: &TableMeta, condition: &Condition) -> Result<Self, ExecutorError> {
        if condition.comp == CompOp::NoOp {
            return Err(ExecutorError::InvalidArgument(format!(
                "condition on table {} has no operator",
                meta.name()
            )));
        }

        let mut left = bind_side(meta, &condition.left)?;
        let mut right = bind_side(meta, &condition.right)?;
        normalize_date_literal(&left, &mut right);
        normalize_date_literal(&right, &mut left);

        let (left_type, right_type) = (left.attr_type(), right.attr_type());
        if !left_type.is_comparable_with(right_type) {
            return Err(ExecutorError::FieldTypeMismatch {
                left: left_type,
                right: right_type,
            });
        }

        Ok(Self {
            left,
            comp: condition.comp,
            right,
        })
    }

    /// Returns true if neither side reads the record.
    pub fn is_constant(&self) -> bool {
        matches!((&self.left, &self.right), (Side::Value(_), Side::Value(_)))
    }

    /// Outcome of a constant condition, `None` if it reads the record.
    pub fn constant_result(&self) -> Option<bool> {
        match (&self.left, &self.right) {
            (Side::Value(l), Side::Value(r)) => Some(evaluate(self.comp, l, r)),
            _ => None,
        }
    }

    /// Evaluates the condition against `record`.
    pub fn filter(&self, record: &Record) -> Result<bool, StorageError> {
        let left = self.left.read(record)?;
        let right = self.right.read(record)?;
        Ok(evaluate(self.comp, &left, &right))
    }
}

fn bind_side(meta: &TableMeta, operand: &Operand) -> Result<Side, ExecutorError> {
    match operand {
        Operand::Value(value) => Ok(Side::Value(value.clone())),
        Operand::Attr(attr) => {
            let field = attr
                .relation_name
                .as_deref()
                .map_or(true, |relation| relation == meta.name())
                .then(|| meta.field(&attr.attribute_name))
                .flatten();
            match field {
                Some(field) => Ok(Side::Field(field.clone())),
                None => {
                    warn!(table = %meta.name(), field = %attr, "no such field in condition");
                    Err(ExecutorError::FieldMissing(attr.to_string()))
                }
            }
        }
    }
}

fn normalize_date_literal(field: &Side, literal: &mut Side) {
    let Side::Field(f) = field else { return };
    if f.attr_type != AttrType::Dates {
        return;
    }
    if let Side::Value(Value::Chars(text)) = literal {
        if let Some(date) = Value::date(text) {
            *literal = Side::Value(date);
        }
    }
}

/// A conjunction of bound conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// A single condition.
    Atom(ConditionFilter),
    /// All nested filters must accept. `All([])` accepts everything.
    All(Vec<Filter>),
}

impl Filter {
    /// Binds every condition to `meta` and combines them.
    pub fn bind_all(meta: &TableMeta, conditions: &[Condition]) -> Result<Self, ExecutorError> {
        let filters = conditions
            .iter()
            .map(|c| ConditionFilter::bind(meta, c).map(Filter::Atom))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Filter::All(filters))
    }

    /// Decides the filter without a record when possible.
    ///
    /// Returns `Some(false)` as soon as one constant conjunct is false and
    /// `Some(true)` when every conjunct is constant and true.
    pub fn constant_result(&self) -> Option<bool> {
        match self {
            Filter::Atom(atom) => atom.constant_result(),
            Filter::All(filters) => {
                let mut decided = true;
                for filter in filters {
                    match filter.constant_result() {
                        Some(false) => return Some(false),
                        Some(true) => {}
                        None => decided = false,
                    }
                }
                decided.then_some(true)
            }
        }
    }

    /// Evaluates the filter against `record`.
    pub fn filter(&self, record: &Record) -> Result<bool, StorageError> {
        match self {
            Filter::Atom(atom) => atom.filter(record),
            Filter::All(filters) => {
                for filter in filters {
                    if !filter.filter(record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}
