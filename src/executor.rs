//! SELECT executor.
//!
//! This module turns a parsed [`Selects`](crate::sql::Selects) into a result
//! set by scanning tables, joining them and projecting or aggregating the
//! joined tuples.
//!
//! # Components
//!
//! - [`SelectExecutor`]: resolves the statement and drives every stage
//! - [`ScanNode`]: reads one table with pushed-down [`Filter`]s
//! - [`TupleFilter`] and [`join`]: cross-table predicates and join assembly
//! - [`aggregate()`]: count/max/min/avg over the joined tuples
//! - [`Tuple`], [`TupleSchema`], [`TupleSet`]: rows and their layout

mod aggregate;
mod condition;
mod error;
mod join;
mod node;
mod select;
mod tuple;

pub use aggregate::{aggregate, is_numeric_literal, AggregateFunction};
pub use condition::{ConditionFilter, Filter};
pub use error::ExecutorError;
pub use join::{join, TupleFilter};
pub use node::ScanNode;
pub use select::SelectExecutor;
pub use tuple::{Tuple, TupleField, TupleSchema, TupleSet};
