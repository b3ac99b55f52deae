//! Transaction ids and states.

use std::fmt;

/// Identifies a transaction. Allocated from 1 upward; 0 never names a
/// real transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxId(u64);

impl TxId {
    /// The id no transaction receives.
    pub const INVALID: Self = Self(0);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    pub const fn is_invalid(&self) -> bool {
        self.0 == Self::INVALID.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a transaction is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    InProgress,
    /// Writes become visible to snapshots taken afterwards.
    Committed,
    /// Writes are never visible outside the transaction.
    Aborted,
}

impl fmt::Display for TxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TxState::InProgress => "in-progress",
            TxState::Committed => "committed",
            TxState::Aborted => "aborted",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txid() {
        assert_eq!(TxId::INVALID.as_u64(), 0);
        assert!(TxId::INVALID.is_invalid());

        let txid = TxId::new(42);
        assert_eq!(txid.as_u64(), 42);
        assert!(!txid.is_invalid());
        assert!(TxId::new(1) < TxId::new(2));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(TxState::Aborted.to_string(), "aborted");
    }
}
