//! Storage layer errors.

use thiserror::Error;

use crate::datum::AttrType;

/// Storage layer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// A stored record does not match the table's record size.
    #[error("malformed record in table {table}: expected {expected} bytes, got {actual}")]
    MalformedRecord {
        /// Table the record was read from.
        table: String,
        /// Record size declared by the table meta.
        expected: usize,
        /// Actual record length.
        actual: usize,
    },

    /// A field lies outside the bytes of the record it is read from.
    #[error("field {field} lies outside a record of {record_len} bytes")]
    FieldOutOfBounds {
        /// Field name.
        field: String,
        /// Record length.
        record_len: usize,
    },

    /// Number of values does not match the number of columns.
    #[error("table {table} has {expected} columns but {actual} values were given")]
    ColumnCountMismatch {
        /// Target table.
        table: String,
        /// Column count.
        expected: usize,
        /// Value count.
        actual: usize,
    },

    /// Value type cannot be stored in the column.
    #[error("cannot store {actual} value in column {field} of type {expected}")]
    TypeMismatch {
        /// Column name.
        field: String,
        /// Column type.
        expected: AttrType,
        /// Value type.
        actual: AttrType,
    },

    /// NULL given for a NOT NULL column.
    #[error("column {0} does not accept NULL")]
    NullNotAllowed(String),

    /// String value longer than the column width.
    #[error("value of {len} bytes does not fit column {field} of width {width}")]
    ValueTooLong {
        /// Column name.
        field: String,
        /// Declared width.
        width: usize,
        /// Value length.
        len: usize,
    },

    /// Text that is not a valid `YYYY-MM-DD` date.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Column definition rejected when creating a table.
    #[error("invalid column {field}: {reason}")]
    InvalidColumn {
        /// Column name.
        field: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Table already exists in the database.
    #[error("table {0} already exists")]
    TableExists(String),

    /// Database already exists.
    #[error("database {0} already exists")]
    DatabaseExists(String),

    /// Database does not exist.
    #[error("database {0} does not exist")]
    DatabaseNotFound(String),
}
