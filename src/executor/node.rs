//! Scan nodes.
//!
//! A [`ScanNode`] reads one base table under a transaction's snapshot and
//! keeps the records accepted by its pushed-down [`Filter`]. The whole table
//! schema is emitted; projection happens after the join.

use std::sync::Arc;

use tracing::debug;

use crate::sql::Condition;
use crate::storage::Table;
use crate::tx::Trx;

use super::condition::Filter;
use super::error::ExecutorError;
use super::tuple::{Tuple, TupleSchema, TupleSet};

/// Table scan with pushed-down conditions.
pub struct ScanNode<'a> {
    trx: &'a Trx,
    table: Arc<Table>,
    schema: TupleSchema,
    filter: Filter,
}

impl<'a> ScanNode<'a> {
    /// Binds `conditions` to `table`. Every condition must only reference
    /// this table's columns or literals.
    pub fn new(trx: &'a Trx, table: Arc<Table>, conditions: &[Condition]) -> Result<Self, ExecutorError> {
        let filter = Filter::bind_all(table.table_meta(), conditions)?;
        let schema = TupleSchema::from_table(table.table_meta());
        Ok(Self {
            trx,
            table,
            schema,
            filter,
        })
    }

    /// Name of the scanned table.
    pub fn table_name(&self) -> &str {
        self.table.name()
    }

    /// Schema of the emitted tuples.
    pub fn schema(&self) -> &TupleSchema {
        &self.schema
    }

    /// Runs the scan.
    ///
    /// When a constant conjunct is false the table is not read at all.
    pub fn execute(&self) -> Result<TupleSet, ExecutorError> {
        let mut tuple_set = TupleSet::new(self.schema.clone());
        if self.filter.constant_result() == Some(false) {
            debug!(table = %self.table_name(), "scan skipped by constant condition");
            return Ok(tuple_set);
        }

        let meta = self.table.table_meta();
        for record in self.trx.scan(&self.table) {
            let record = record?;
            if self.filter.filter(&record)? {
                tuple_set.push(Tuple::from_record(meta, &record)?);
            }
        }

        debug!(table = %self.table_name(), rows = tuple_set.len(), "scan finished");
        Ok(tuple_set)
    }
}
