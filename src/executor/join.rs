//! Cross-table filters and join assembly.
//!
//! Join assembly is a left-deep cartesian product in FROM order. At each step
//! the attribute-vs-attribute conditions that connect the tables joined so
//! far (left) with the next table (right) are bound into a [`TupleFilter`]
//! and applied to every candidate pair.

use tracing::debug;

use crate::datum::evaluate;
use crate::sql::{CompOp, Condition, Operand, RelAttr};

use super::error::ExecutorError;
use super::tuple::{Tuple, TupleSchema, TupleSet};

/// One bound attribute comparison between a left and a right tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JoinPredicate {
    left_index: usize,
    comp: CompOp,
    right_index: usize,
}

/// Conjunction of comparisons between a left and a right tuple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TupleFilter {
    predicates: Vec<JoinPredicate>,
}

impl TupleFilter {
    /// Binds the conditions that compare a column of `left` with a column of
    /// `right`, in either orientation. Other conditions are skipped.
    ///
    /// Attribute operands must already be qualified.
    pub fn bind(left: &TupleSchema, right: &TupleSchema, conditions: &[Condition]) -> Result<Self, ExecutorError> {
        let mut predicates = Vec::new();

        for condition in conditions {
            let (Operand::Attr(l), Operand::Attr(r)) = (&condition.left, &condition.right) else {
                continue;
            };

            let predicate = match (locate(left, l), locate(right, r)) {
                (Some(left_index), Some(right_index)) => JoinPredicate {
                    left_index,
                    comp: condition.comp,
                    right_index,
                },
                _ => match (locate(left, r), locate(right, l)) {
                    (Some(left_index), Some(right_index)) => JoinPredicate {
                        left_index,
                        comp: condition.comp.flip(),
                        right_index,
                    },
                    _ => continue,
                },
            };

            if predicate.comp == CompOp::NoOp {
                return Err(ExecutorError::InvalidArgument(format!(
                    "join condition {} - {} has no operator",
                    l, r
                )));
            }
            let left_type = left.field(predicate.left_index).attr_type;
            let right_type = right.field(predicate.right_index).attr_type;
            if !left_type.is_comparable_with(right_type) {
                return Err(ExecutorError::FieldTypeMismatch {
                    left: left_type,
                    right: right_type,
                });
            }
            predicates.push(predicate);
        }

        Ok(Self { predicates })
    }

    /// Number of bound predicates.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns true if no predicate was bound; such a filter accepts every pair.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Returns true if every predicate holds for the pair.
    pub fn accepts(&self, left: &Tuple, right: &Tuple) -> bool {
        self.predicates
            .iter()
            .all(|p| evaluate(p.comp, left.get(p.left_index), right.get(p.right_index)))
    }
}

fn locate(schema: &TupleSchema, attr: &RelAttr) -> Option<usize> {
    let relation = attr.relation_name.as_deref()?;
    schema.index_of_field(relation, &attr.attribute_name)
}

/// Joins `tuple_sets` in order, applying every cross-table condition at the
/// first step where both of its tables are present.
pub fn join(tuple_sets: Vec<TupleSet>, conditions: &[Condition]) -> Result<TupleSet, ExecutorError> {
    let mut schema = TupleSchema::new();
    let mut running = vec![Tuple::default()];

    for tuple_set in tuple_sets {
        let filter = TupleFilter::bind(&schema, tuple_set.schema(), conditions)?;
        let mut next = Vec::new();
        for left in &running {
            for right in tuple_set.tuples() {
                if filter.accepts(left, right) {
                    next.push(left.concat(right));
                }
            }
        }
        schema.append(tuple_set.schema());
        running = next;
        debug!(predicates = filter.len(), rows = running.len(), "join step");
    }

    Ok(TupleSet::with_tuples(schema, running))
}
