//! SELECT driver.
//!
//! [`SelectExecutor::execute`] runs a statement through these stages:
//!
//! ```text
//! Selects (parser order)
//!     |  reverse lists, resolve tables and condition attributes
//!     v
//! ScanNode per FROM table (single-table conditions pushed down)
//!     |
//!     v
//! join (cross-table conditions applied at the earliest step)
//!     |
//!     v
//! stable sort by ORDER BY keys
//!     |
//!     v
//! projection  or  aggregation
//! ```
//!
//! [`SelectExecutor::run`] also renders the result and, outside
//! multi-operation mode, commits or rolls back the transaction.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::config::OutputConfig;
use crate::sql::{Condition, Operand, RelAttr, Selects};
use crate::storage::{DefaultHandler, Table};
use crate::tx::{Trx, TxError};

use super::aggregate::aggregate;
use super::error::ExecutorError;
use super::join::join;
use super::node::ScanNode;
use super::tuple::{Tuple, TupleSchema, TupleSet};

/// Executes SELECT statements against one database inside one transaction.
pub struct SelectExecutor<'a> {
    handler: &'a DefaultHandler,
    db: &'a str,
    trx: &'a Trx,
}

/// A statement with its lists in textual order and its tables resolved.
struct Query {
    tables: Vec<Arc<Table>>,
    attributes: Vec<RelAttr>,
    aggregates: Vec<String>,
    conditions: Vec<Condition>,
}

impl Query {
    fn is_relation(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t.name() == name)
    }

    fn table(&self, name: &str) -> Option<&Arc<Table>> {
        self.tables.iter().find(|t| t.name() == name)
    }

    /// Picks the only FROM table that has column `field`.
    fn unique_table_name(&self, field: &str) -> Result<&str, ExecutorError> {
        let mut owners = self.tables.iter().filter(|t| t.table_meta().field(field).is_some());
        match (owners.next(), owners.next()) {
            (Some(table), None) => Ok(table.name()),
            (None, _) => {
                warn!(field = %field, "no table in FROM has this field");
                Err(ExecutorError::SqlSyntax(format!("unknown column \"{}\"", field)))
            }
            (Some(_), Some(_)) => {
                warn!(field = %field, "field name is ambiguous");
                Err(ExecutorError::SqlSyntax(format!("column \"{}\" is ambiguous", field)))
            }
        }
    }

    /// Qualifies `attr` with its table and checks that the column exists.
    ///
    /// A bare name binds to the only table of a single-table query and goes
    /// through the unique-table rule otherwise.
    fn qualify(&self, attr: &RelAttr) -> Result<RelAttr, ExecutorError> {
        let table_name = match (&attr.relation_name, self.tables.as_slice()) {
            (Some(relation), _) => relation.as_str(),
            (None, [only]) => only.name(),
            (None, _) => self.unique_table_name(&attr.attribute_name)?,
        };

        let exists = self
            .table(table_name)
            .is_some_and(|t| t.table_meta().field(&attr.attribute_name).is_some());
        if !exists {
            warn!(table = %table_name, field = %attr.attribute_name, "no such field");
            return Err(ExecutorError::FieldMissing(attr.to_string()));
        }
        Ok(RelAttr::qualified(table_name, attr.attribute_name.clone()))
    }

    /// Position of `attr` in the joined schema.
    fn locate(&self, schema: &TupleSchema, attr: &RelAttr) -> Result<usize, ExecutorError> {
        let attr = self.qualify(attr)?;
        let table = attr.relation_name.as_deref().unwrap_or_default();
        schema
            .index_of_field(table, &attr.attribute_name)
            .ok_or_else(|| ExecutorError::FieldMissing(attr.to_string()))
    }

    fn qualify_operand(&self, operand: &Operand) -> Result<Operand, ExecutorError> {
        match operand {
            Operand::Attr(attr) => self.qualify(attr).map(Operand::Attr),
            Operand::Value(value) => Ok(Operand::Value(value.clone())),
        }
    }
}

/// Returns the table an operand reads, if it is a column.
fn operand_table(operand: &Operand) -> Option<&str> {
    match operand {
        Operand::Attr(attr) => attr.relation_name.as_deref(),
        Operand::Value(_) => None,
    }
}

/// Returns true if the condition can be evaluated while scanning `table`.
fn is_scan_condition(condition: &Condition, table: &str) -> bool {
    match (operand_table(&condition.left), operand_table(&condition.right)) {
        (None, None) => true,
        (Some(t), None) | (None, Some(t)) => t == table,
        (Some(l), Some(r)) => l == table && r == table,
    }
}

fn is_join_condition(condition: &Condition) -> bool {
    matches!(
        (operand_table(&condition.left), operand_table(&condition.right)),
        (Some(l), Some(r)) if l != r
    )
}

fn syntax_error(err: ExecutorError) -> ExecutorError {
    match err {
        ExecutorError::SqlSyntax(_) => err,
        other => ExecutorError::SqlSyntax(other.to_string()),
    }
}

impl<'a> SelectExecutor<'a> {
    /// Creates an executor reading database `db` through `trx`.
    pub fn new(handler: &'a DefaultHandler, db: &'a str, trx: &'a Trx) -> Self {
        Self { handler, db, trx }
    }

    /// Executes `selects`, renders the result and ends the transaction
    /// unless `multi_operation` is set.
    ///
    /// On failure the transaction is rolled back (outside multi-operation
    /// mode) and the execution error is returned.
    pub fn run(
        &self,
        selects: &Selects,
        output: &OutputConfig,
        multi_operation: bool,
    ) -> Result<String, ExecutorError> {
        match self.execute(selects) {
            Ok(result) => {
                let text = result.render(output, selects.relations.len() > 1);
                self.end_trx_if_need(multi_operation, true)?;
                Ok(text)
            }
            Err(err) => {
                debug!(code = err.code(), error = %err, "select failed");
                if let Err(tx_err) = self.end_trx_if_need(multi_operation, false) {
                    warn!(error = %tx_err, "rollback after failed select did not succeed");
                }
                Err(err)
            }
        }
    }

    fn end_trx_if_need(&self, multi_operation: bool, succeeded: bool) -> Result<(), TxError> {
        if multi_operation {
            return Ok(());
        }
        if succeeded {
            self.trx.commit()
        } else {
            self.trx.rollback()
        }
    }

    /// Executes `selects` and returns the result set. The transaction is
    /// left open.
    pub fn execute(&self, selects: &Selects) -> Result<TupleSet, ExecutorError> {
        let query = self.ingest(selects)?;

        let mut tuple_sets = Vec::with_capacity(query.tables.len());
        {
            let mut nodes = Vec::with_capacity(query.tables.len());
            for table in &query.tables {
                let conditions: Vec<Condition> = query
                    .conditions
                    .iter()
                    .filter(|c| is_scan_condition(c, table.name()))
                    .cloned()
                    .collect();
                nodes.push(ScanNode::new(self.trx, Arc::clone(table), &conditions)?);
            }
            for node in &nodes {
                tuple_sets.push(node.execute()?);
            }
        }

        let join_conditions: Vec<Condition> = query
            .conditions
            .iter()
            .filter(|c| is_join_condition(c))
            .cloned()
            .collect();
        let joined = join(tuple_sets, &join_conditions)?;

        let (schema, mut tuples) = joined.into_parts();
        if !selects.orders.is_empty() {
            self.order(&query, selects, &schema, &mut tuples)?;
        }
        let joined = TupleSet::with_tuples(schema, tuples);

        if query.aggregates.is_empty() {
            self.project(&query, &joined)
        } else {
            let items: Vec<(String, RelAttr)> = query
                .aggregates
                .iter()
                .cloned()
                .zip(query.attributes.iter().cloned())
                .collect();
            aggregate(&items, &joined, |attr| {
                query.locate(joined.schema(), attr).map_err(syntax_error)
            })
        }
    }

    /// Restores textual order, resolves tables and qualifies every
    /// condition attribute.
    fn ingest(&self, selects: &Selects) -> Result<Query, ExecutorError> {
        if selects.relations.is_empty() {
            error!("no table given");
            return Err(ExecutorError::SqlSyntax("no table given".to_string()));
        }
        if !selects.aggregates.is_empty() && selects.aggregates.len() != selects.attributes.len() {
            return Err(ExecutorError::SqlSyntax(
                "aggregates cannot be mixed with plain columns".to_string(),
            ));
        }

        let mut tables = Vec::with_capacity(selects.relations.len());
        for name in selects.relations.iter().rev() {
            let table = self.handler.find_table(self.db, name).ok_or_else(|| {
                warn!(db = %self.db, table = %name, "no such table");
                ExecutorError::TableNotExist(name.clone())
            })?;
            tables.push(table);
        }

        let mut query = Query {
            tables,
            attributes: selects.attributes.iter().rev().cloned().collect(),
            aggregates: selects.aggregates.iter().rev().cloned().collect(),
            conditions: Vec::with_capacity(selects.conditions.len()),
        };

        for condition in &selects.conditions {
            if let Some(relation) = [&condition.left, &condition.right]
                .into_iter()
                .filter_map(operand_table)
                .find(|relation| !query.is_relation(relation))
            {
                warn!(table = %relation, "condition references a table outside FROM");
                return Err(ExecutorError::FieldMissing(relation.to_string()));
            }
            let resolved = Condition {
                left: query.qualify_operand(&condition.left)?,
                comp: condition.comp,
                right: query.qualify_operand(&condition.right)?,
            };
            query.conditions.push(resolved);
        }

        debug!(
            tables = query.tables.len(),
            conditions = query.conditions.len(),
            "select ingested"
        );
        Ok(query)
    }

    /// Stable sort by the ORDER BY keys. Unresolvable keys are syntax errors.
    fn order(
        &self,
        query: &Query,
        selects: &Selects,
        schema: &TupleSchema,
        tuples: &mut [Tuple],
    ) -> Result<(), ExecutorError> {
        let keys = selects
            .orders
            .iter()
            .map(|order| {
                query
                    .locate(schema, &order.attr)
                    .map(|index| (index, order.is_desc))
                    .map_err(syntax_error)
            })
            .collect::<Result<Vec<_>, _>>()?;

        tuples.sort_by(|a, b| {
            for &(index, is_desc) in &keys {
                let ordering = a.get(index).sort_cmp(b.get(index));
                let ordering = if is_desc { ordering.reverse() } else { ordering };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
        debug!(keys = keys.len(), rows = tuples.len(), "ordered");
        Ok(())
    }

    fn project(&self, query: &Query, joined: &TupleSet) -> Result<TupleSet, ExecutorError> {
        let mut schema = TupleSchema::new();
        let mut indexes = Vec::new();
        let mut add = |schema: &mut TupleSchema, index: usize| {
            let before = schema.len();
            schema.add_if_not_exists(joined.schema().field(index).clone());
            if schema.len() > before {
                indexes.push(index);
            }
        };

        for (position, attr) in query.attributes.iter().enumerate() {
            match (&attr.relation_name, attr.is_star()) {
                (None, true) => {
                    if position != 0 {
                        return Err(ExecutorError::SqlSyntax("* must be the first column".to_string()));
                    }
                    for index in 0..joined.schema().len() {
                        add(&mut schema, index);
                    }
                }
                (Some(relation), true) => {
                    let table = query.table(relation).ok_or_else(|| {
                        warn!(table = %relation, "projection references a table outside FROM");
                        ExecutorError::FieldMissing(attr.to_string())
                    })?;
                    for field in table.table_meta().fields() {
                        let index = joined
                            .schema()
                            .index_of_field(relation, &field.name)
                            .ok_or_else(|| ExecutorError::FieldMissing(format!("{}.{}", relation, field.name)))?;
                        add(&mut schema, index);
                    }
                }
                (_, false) => {
                    let index = query.locate(joined.schema(), attr)?;
                    add(&mut schema, index);
                }
            }
        }

        if schema.is_empty() {
            return Err(ExecutorError::SqlSyntax("empty select list".to_string()));
        }

        let tuples = joined.tuples().iter().map(|t| t.project(&indexes)).collect();
        debug!(columns = schema.len(), "projected");
        Ok(TupleSet::with_tuples(schema, tuples))
    }
}
