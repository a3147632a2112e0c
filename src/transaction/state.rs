// ============================================================================
// Transaction State Management
// ============================================================================
//
// Each transaction moves through Active -> Committed | Aborted. The log
// below tracks that state and the change journal; the staged table image
// lives with the storage-side transaction handle.
//
// ============================================================================

use super::Change;
use crate::core::{StoreError, StoreResult};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TXN_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(pub u64);

impl TransactionId {
    pub fn new() -> Self {
        TransactionId(NEXT_TXN_ID.fetch_add(1, Ordering::SeqCst))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "txn_{}", self.0)
    }
}

/// State transitions:
/// ```text
/// Active ──commit──> Committed
///   │
///   └──rollback──> Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Active,
    Committed,
    Aborted,
}

impl TransactionState {
    pub fn is_active(&self) -> bool {
        matches!(self, TransactionState::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionState::Committed | TransactionState::Aborted
        )
    }
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionState::Active => write!(f, "ACTIVE"),
            TransactionState::Committed => write!(f, "COMMITTED"),
            TransactionState::Aborted => write!(f, "ABORTED"),
        }
    }
}

#[derive(Debug)]
pub struct TransactionLog {
    id: TransactionId,
    state: TransactionState,
    changes: Vec<Change>,
    start_time: std::time::Instant,
}

impl TransactionLog {
    pub fn new(id: TransactionId) -> Self {
        Self {
            id,
            state: TransactionState::Active,
            changes: Vec::new(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    pub fn duration(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    pub fn ensure_active(&self) -> StoreResult<()> {
        if !self.state.is_active() {
            return Err(StoreError::Transaction(format!(
                "transaction {} is {}",
                self.id, self.state
            )));
        }
        Ok(())
    }

    pub fn record_change(&mut self, change: Change) -> StoreResult<()> {
        self.ensure_active()?;
        self.changes.push(change);
        Ok(())
    }

    pub fn commit(&mut self) -> StoreResult<()> {
        self.ensure_active()?;
        self.state = TransactionState::Committed;
        Ok(())
    }

    /// Marks the log aborted and discards the journal.
    pub fn rollback(&mut self) -> StoreResult<()> {
        self.ensure_active()?;
        self.changes.clear();
        self.state = TransactionState::Aborted;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert() -> Change {
        Change::InsertRow {
            table: "accounts".to_string(),
            row_id: 0,
            row: vec![],
        }
    }

    #[test]
    fn test_transaction_id_generation() {
        let id1 = TransactionId::new();
        let id2 = TransactionId::new();
        assert!(id2.as_u64() > id1.as_u64());
        assert!(id1.to_string().starts_with("txn_"));
    }

    #[test]
    fn test_lifecycle() {
        let mut log = TransactionLog::new(TransactionId::new());
        assert!(log.state().is_active());
        log.commit().unwrap();
        assert_eq!(log.state(), TransactionState::Committed);
        assert!(log.state().is_terminal());
        assert!(log.commit().is_err());
    }

    #[test]
    fn test_rollback_clears_changes() {
        let mut log = TransactionLog::new(TransactionId::new());
        log.record_change(insert()).unwrap();
        assert_eq!(log.change_count(), 1);

        log.rollback().unwrap();
        assert_eq!(log.change_count(), 0);
        assert_eq!(log.state(), TransactionState::Aborted);
        assert!(log.record_change(insert()).is_err());
    }
}
