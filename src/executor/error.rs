//! Executor-specific errors.

use thiserror::Error;

use crate::datum::AttrType;
use crate::storage::StorageError;
use crate::tx::TxError;

/// Errors that can occur while executing a SELECT.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutorError {
    /// Statement is structurally invalid (bad `*` position, ambiguous or
    /// unresolvable name, unsupported aggregate).
    #[error("syntax error: {0}")]
    SqlSyntax(String),

    /// Referenced table does not exist.
    #[error("table \"{0}\" does not exist")]
    TableNotExist(String),

    /// Referenced column does not exist.
    #[error("column \"{0}\" does not exist")]
    FieldMissing(String),

    /// Two operands of a predicate cannot be compared.
    #[error("cannot compare {left} with {right}")]
    FieldTypeMismatch {
        /// Type of the left operand.
        left: AttrType,
        /// Type of the right operand.
        right: AttrType,
    },

    /// Invalid operator or argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Error raised by the storage layer.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Error raised while ending the transaction.
    #[error(transparent)]
    Transaction(#[from] TxError),
}

impl ExecutorError {
    /// Returns the error code reported to the client.
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorError::SqlSyntax(_) => "SQL_SYNTAX",
            ExecutorError::TableNotExist(_) => "SCHEMA_TABLE_NOT_EXIST",
            ExecutorError::FieldMissing(_) => "SCHEMA_FIELD_MISSING",
            ExecutorError::FieldTypeMismatch { .. } => "SCHEMA_FIELD_TYPE_MISMATCH",
            ExecutorError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ExecutorError::Storage(_) => "STORAGE_ERROR",
            ExecutorError::Transaction(_) => "TRANSACTION_ERROR",
        }
    }
}
