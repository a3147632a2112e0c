// ============================================================================
// Transaction Module
// ============================================================================
//
// Single-writer transactions with snapshot reads:
// - readers always see the last committed image and never wait on writers
// - a writer stages its changes on a copy-on-write image of the tables
// - commit publishes the image atomically, rollback discards it
//
// ============================================================================

pub mod change;
pub mod state;

pub use change::{Change, deletions_by_table};
pub use state::{TransactionId, TransactionLog, TransactionState};
