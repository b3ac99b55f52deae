//! Transaction handle.

use std::sync::Arc;

use tracing::debug;

use crate::datum::Value;
use crate::storage::{Record, StorageError, Table, TableScan};

use super::error::TxError;
use super::manager::TransactionManager;
use super::snapshot::Snapshot;
use super::TxId;

/// A running transaction.
///
/// The snapshot is taken once at [`Trx::begin`], so every scan inside the
/// transaction sees the same committed data plus its own writes.
#[derive(Clone)]
pub struct Trx {
    id: TxId,
    snapshot: Snapshot,
    manager: Arc<TransactionManager>,
}

impl Trx {
    /// Starts a transaction.
    pub fn begin(manager: &Arc<TransactionManager>) -> Self {
        let id = manager.begin();
        Self {
            id,
            snapshot: manager.snapshot(id),
            manager: Arc::clone(manager),
        }
    }

    /// Transaction ID.
    pub fn id(&self) -> TxId {
        self.id
    }

    /// Snapshot used by scans.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Opens a scan over the records of `table` visible to this transaction.
    pub fn scan(&self, table: &Table) -> TableScan {
        table.scan_visible(|writer| self.snapshot.is_visible(writer, &self.manager))
    }

    /// Encodes `values` and inserts them into `table`.
    pub fn insert(&self, table: &Table, values: &[Value]) -> Result<(), StorageError> {
        let record = table.table_meta().encode(values)?;
        self.insert_record(table, record);
        Ok(())
    }

    /// Inserts raw record bytes without validating them.
    pub fn insert_record(&self, table: &Table, record: Record) {
        table.append(self.id, record);
    }

    /// Commits the transaction.
    pub fn commit(&self) -> Result<(), TxError> {
        self.manager.commit(self.id)?;
        debug!(txid = %self.id, "commit");
        Ok(())
    }

    /// Rolls the transaction back. Its inserts stay stored but invisible.
    pub fn rollback(&self) -> Result<(), TxError> {
        self.manager.abort(self.id)?;
        debug!(txid = %self.id, "rollback");
        Ok(())
    }
}

impl std::fmt::Debug for Trx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trx")
            .field("id", &self.id)
            .field("snapshot", &self.snapshot)
            .finish()
    }
}
