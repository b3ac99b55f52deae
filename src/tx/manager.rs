//! Transaction registry.
//!
//! Hands out transaction ids, records how each transaction ended and builds
//! the snapshots scans use to decide visibility.

use std::collections::{BTreeSet, HashMap};

use parking_lot::Mutex;
use tracing::debug;

use super::error::TxError;
use super::snapshot::Snapshot;
use super::{TxId, TxState};

/// Id allocation and the running set change together under one lock, so a
/// snapshot never sees an id that is allocated but not yet running.
struct Registry {
    next_txid: u64,
    running: BTreeSet<TxId>,
    outcomes: HashMap<TxId, TxState>,
}

/// Shared by every session of a server.
///
/// Ids start at 1 and grow by one per [`begin`](Self::begin). A transaction
/// moves from in-progress to committed or aborted exactly once.
pub struct TransactionManager {
    registry: Mutex<Registry>,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                next_txid: 1,
                running: BTreeSet::new(),
                outcomes: HashMap::new(),
            }),
        }
    }

    /// Starts a transaction and returns its id.
    pub fn begin(&self) -> TxId {
        let mut registry = self.registry.lock();
        let txid = TxId::new(registry.next_txid);
        registry.next_txid += 1;
        registry.running.insert(txid);
        registry.outcomes.insert(txid, TxState::InProgress);
        drop(registry);

        debug!(%txid, "transaction started");
        txid
    }

    pub fn commit(&self, txid: TxId) -> Result<(), TxError> {
        self.finish(txid, TxState::Committed)
    }

    /// Aborts `txid`. Records it wrote stay in their tables but no other
    /// transaction will see them.
    pub fn abort(&self, txid: TxId) -> Result<(), TxError> {
        self.finish(txid, TxState::Aborted)
    }

    fn finish(&self, txid: TxId, outcome: TxState) -> Result<(), TxError> {
        let mut registry = self.registry.lock();
        let current = registry
            .outcomes
            .get(&txid)
            .copied()
            .ok_or(TxError::TransactionNotFound(txid))?;
        if current != TxState::InProgress {
            return Err(TxError::InvalidStateTransition {
                txid,
                current,
                attempted: outcome,
            });
        }
        registry.outcomes.insert(txid, outcome);
        registry.running.remove(&txid);
        drop(registry);

        debug!(%txid, state = %outcome, "transaction finished");
        Ok(())
    }

    /// State of `txid`, or `None` if it was never started here.
    pub fn state(&self, txid: TxId) -> Option<TxState> {
        self.registry.lock().outcomes.get(&txid).copied()
    }

    /// Snapshot owned by `current_txid`: every other running transaction is
    /// in `xip`, and ids from `xmax` on are in the future.
    pub fn snapshot(&self, current_txid: TxId) -> Snapshot {
        let registry = self.registry.lock();
        let xmax = TxId::new(registry.next_txid);
        let xip: Vec<TxId> = registry.running.iter().copied().filter(|&t| t != current_txid).collect();
        drop(registry);

        Snapshot {
            xmin: xip.first().copied().unwrap_or(xmax),
            xmax,
            xip,
            current_txid,
        }
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_allocates_sequential_txids() {
        let manager = TransactionManager::new();

        assert_eq!(manager.begin(), TxId::new(1));
        assert_eq!(manager.begin(), TxId::new(2));
        assert_eq!(manager.begin(), TxId::new(3));
    }

    #[test]
    fn test_commit_and_abort_transition_state() {
        let manager = TransactionManager::new();
        let committed = manager.begin();
        let aborted = manager.begin();

        assert_eq!(manager.state(committed), Some(TxState::InProgress));
        manager.commit(committed).unwrap();
        manager.abort(aborted).unwrap();

        assert_eq!(manager.state(committed), Some(TxState::Committed));
        assert_eq!(manager.state(aborted), Some(TxState::Aborted));
    }

    #[test]
    fn test_double_commit_is_rejected() {
        let manager = TransactionManager::new();
        let txid = manager.begin();
        manager.commit(txid).unwrap();

        let err = manager.abort(txid).unwrap_err();
        assert_eq!(
            err,
            TxError::InvalidStateTransition {
                txid,
                current: TxState::Committed,
                attempted: TxState::Aborted,
            }
        );
        assert_eq!(manager.state(txid), Some(TxState::Committed));
    }

    #[test]
    fn test_unknown_transaction() {
        let manager = TransactionManager::new();
        assert_eq!(
            manager.commit(TxId::new(7)),
            Err(TxError::TransactionNotFound(TxId::new(7)))
        );
        assert_eq!(manager.state(TxId::new(7)), None);
    }

    #[test]
    fn test_snapshot_excludes_self_from_in_progress() {
        let manager = TransactionManager::new();
        let other = manager.begin();
        let me = manager.begin();

        let snapshot = manager.snapshot(me);
        assert_eq!(snapshot.xip, vec![other]);
        assert_eq!(snapshot.xmin, other);
        assert_eq!(snapshot.xmax, TxId::new(3));

        manager.commit(other).unwrap();
        let snapshot = manager.snapshot(me);
        assert!(snapshot.xip.is_empty());
        assert_eq!(snapshot.xmin, snapshot.xmax);
    }
}
