//! Tuples, tuple schemas and tuple sets.
//!
//! A [`Tuple`] is one row flowing through the executor. Its values are
//! reference-counted so that join concatenation and projection share string
//! payloads instead of copying them. Every tuple is interpreted through a
//! [`TupleSchema`], and a [`TupleSet`] keeps the two together.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::error;

use crate::config::OutputConfig;
use crate::datum::{AttrType, Value};
use crate::storage::{Record, StorageError, TableMeta};

/// Describes one column of a tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleField {
    /// Declared type. Values may still be NULL.
    pub attr_type: AttrType,
    /// Source table, empty for `*` and literals inside aggregates.
    pub table_name: String,
    /// Source column, `*`, or a numeric literal.
    pub field_name: String,
    /// Aggregate function applied to the column, as written.
    pub aggregate_name: Option<String>,
}

impl TupleField {
    /// Creates a plain column.
    pub fn new(attr_type: AttrType, table_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            attr_type,
            table_name: table_name.into(),
            field_name: field_name.into(),
            aggregate_name: None,
        }
    }

    /// Creates an aggregate result column.
    pub fn aggregate(
        attr_type: AttrType,
        table_name: impl Into<String>,
        field_name: impl Into<String>,
        aggregate_name: impl Into<String>,
    ) -> Self {
        Self {
            aggregate_name: Some(aggregate_name.into()),
            ..Self::new(attr_type, table_name, field_name)
        }
    }

    /// Column header: `t.a` or `a`, wrapped as `agg(...)` for aggregates.
    ///
    /// The table prefix is printed only when `is_tables` is set and the
    /// field has a table.
    pub fn header(&self, is_tables: bool) -> String {
        let column = if is_tables && !self.table_name.is_empty() {
            format!("{}.{}", self.table_name, self.field_name)
        } else {
            self.field_name.clone()
        };
        match &self.aggregate_name {
            Some(aggregate) => format!("{}({})", aggregate, column),
            None => column,
        }
    }

    fn same_column(&self, other: &TupleField) -> bool {
        self.table_name == other.table_name && self.field_name == other.field_name
    }
}

/// Ordered list of tuple fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TupleSchema {
    fields: Vec<TupleField>,
}

impl TupleSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema of every column of a table, in declaration order.
    pub fn from_table(meta: &TableMeta) -> Self {
        let fields = meta
            .fields()
            .iter()
            .map(|f| TupleField::new(f.attr_type, meta.name(), f.name.clone()))
            .collect();
        Self { fields }
    }

    /// Appends a field.
    pub fn add(&mut self, field: TupleField) {
        self.fields.push(field);
    }

    /// Appends a field unless the same `table.field` is already present.
    pub fn add_if_not_exists(&mut self, field: TupleField) {
        if !self.fields.iter().any(|f| f.same_column(&field)) {
            self.fields.push(field);
        }
    }

    /// Appends every field of `other`.
    pub fn append(&mut self, other: &TupleSchema) {
        self.fields.extend(other.fields.iter().cloned());
    }

    /// Position of `table.field`, if present.
    pub fn index_of_field(&self, table_name: &str, field_name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.table_name == table_name && f.field_name == field_name)
    }

    /// Field at `index`.
    pub fn field(&self, index: usize) -> &TupleField {
        &self.fields[index]
    }

    /// All fields.
    pub fn fields(&self) -> &[TupleField] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tuple {
    values: Vec<Arc<Value>>,
}

impl Tuple {
    /// Creates a tuple from shared values.
    pub fn new(values: Vec<Arc<Value>>) -> Self {
        Self { values }
    }

    /// Creates a tuple from owned values.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self::new(values.into_iter().map(Arc::new).collect())
    }

    /// Reads every field of `record` as laid out by `meta`.
    pub fn from_record(meta: &TableMeta, record: &Record) -> Result<Self, StorageError> {
        let values = meta
            .fields()
            .iter()
            .map(|field| record.value(field).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }

    /// Value at `index`.
    pub fn get(&self, index: usize) -> &Value {
        &self.values[index]
    }

    /// All values.
    pub fn values(&self) -> &[Arc<Value>] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true for the empty tuple.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `self` followed by `other`, sharing both sides' values.
    pub fn concat(&self, other: &Tuple) -> Tuple {
        let mut values = Vec::with_capacity(self.len() + other.len());
        values.extend(self.values.iter().cloned());
        values.extend(other.values.iter().cloned());
        Tuple { values }
    }

    /// Picks the values at `indexes`, in that order.
    pub fn project(&self, indexes: &[usize]) -> Tuple {
        Tuple {
            values: indexes.iter().map(|&i| Arc::clone(&self.values[i])).collect(),
        }
    }
}

/// A schema with the tuples that follow it.
#[derive(Debug, Clone, Default)]
pub struct TupleSet {
    schema: TupleSchema,
    tuples: Vec<Tuple>,
}

impl TupleSet {
    /// Creates an empty set.
    pub fn new(schema: TupleSchema) -> Self {
        Self {
            schema,
            tuples: Vec::new(),
        }
    }

    /// Creates a set from tuples that all match `schema`.
    ///
    /// # Panics
    ///
    /// Panics if a tuple's length differs from the schema's.
    pub fn with_tuples(schema: TupleSchema, tuples: Vec<Tuple>) -> Self {
        for tuple in &tuples {
            check_arity(&schema, tuple);
        }
        Self { schema, tuples }
    }

    /// Appends a tuple.
    ///
    /// # Panics
    ///
    /// Panics if the tuple's length differs from the schema's.
    pub fn push(&mut self, tuple: Tuple) {
        check_arity(&self.schema, &tuple);
        self.tuples.push(tuple);
    }

    /// Schema of the set.
    pub fn schema(&self) -> &TupleSchema {
        &self.schema
    }

    /// Tuples of the set.
    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    /// Splits the set into schema and tuples.
    pub fn into_parts(self) -> (TupleSchema, Vec<Tuple>) {
        (self.schema, self.tuples)
    }

    /// Number of tuples.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Returns true when there are no tuples.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Renders the header line followed by one line per tuple.
    pub fn render(&self, output: &OutputConfig, is_tables: bool) -> String {
        let sep = output.column_separator.as_str();
        let mut out = String::new();

        let header: Vec<String> = self.schema.fields.iter().map(|f| f.header(is_tables)).collect();
        out.push_str(&header.join(sep));
        out.push('\n');

        for tuple in &self.tuples {
            for (i, value) in tuple.values.iter().enumerate() {
                if i > 0 {
                    out.push_str(sep);
                }
                let _ = write!(out, "{}", value.to_text(output.float_precision));
            }
            out.push('\n');
        }
        out
    }
}

fn check_arity(schema: &TupleSchema, tuple: &Tuple) {
    if tuple.len() != schema.len() {
        error!(
            tuple_len = tuple.len(),
            schema_len = schema.len(),
            "tuple does not match its schema"
        );
        panic!(
            "tuple of {} values does not match schema of {} fields",
            tuple.len(),
            schema.len()
        );
    }
}
