//! Transaction errors.

use thiserror::Error;

use super::types::{TxId, TxState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    /// The id was never handed out by this manager.
    #[error("transaction {0} not found")]
    TransactionNotFound(TxId),
    /// Commit or abort of a transaction that already finished.
    #[error("transaction {txid} is {current}, cannot become {attempted}")]
    InvalidStateTransition {
        txid: TxId,
        current: TxState,
        attempted: TxState,
    },
}
