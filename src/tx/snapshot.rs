//! Snapshot visibility.
//!
//! A scan keeps a stored record only when the transaction that wrote it is
//! visible to the reader's snapshot. Writers never block readers.

use super::manager::TransactionManager;
use super::{TxId, TxState};

/// The set of transactions a reader may see, fixed when the reader began.
///
/// ```text
///        xmin                 xmax
/// ---------|--------------------|---------->  txid
///  finished   running unless     not started
///             listed in xip      yet: hidden
/// ```
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Smallest id that was still running, or `xmax` if none was.
    pub xmin: TxId,
    /// First id not yet allocated.
    pub xmax: TxId,
    /// Ids that were running, excluding the owner.
    pub xip: Vec<TxId>,
    pub current_txid: TxId,
}

impl Snapshot {
    /// Returns true if `txid` had finished when the snapshot was taken.
    pub fn is_txid_visible(&self, txid: TxId) -> bool {
        if txid >= self.xmax {
            return false;
        }
        if txid < self.xmin {
            return true;
        }
        !self.xip.contains(&txid)
    }

    /// Returns true if a record written by `writer` is visible.
    ///
    /// A record is visible when it was written by the snapshot owner, or when
    /// its writer committed and was not running at snapshot time. Aborted and
    /// in-progress writers are never visible to other transactions.
    pub fn is_visible(&self, writer: TxId, tx_manager: &TransactionManager) -> bool {
        if writer.is_invalid() {
            return false;
        }
        if writer == self.current_txid {
            return true;
        }
        self.is_txid_visible(writer) && tx_manager.state(writer) == Some(TxState::Committed)
    }
}
