//! Transactions for snapshot reads.
//!
//! This module implements the pieces the executor needs from a transaction:
//! - Transaction ID allocation and lifecycle management
//! - Snapshots deciding which stored records a transaction may see
//! - The [`Trx`] handle: scan, insert, commit, rollback

mod error;
mod manager;
mod snapshot;
mod trx;
mod types;

pub use error::TxError;
pub use manager::TransactionManager;
pub use snapshot::Snapshot;
pub use trx::Trx;
pub use types::{TxId, TxState};
