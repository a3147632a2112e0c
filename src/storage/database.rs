use super::{Filter, RowSet, Table, TableSchema};
use crate::core::{Row, StoreError, StoreResult};
use crate::transaction::{Change, TransactionId, TransactionLog, TransactionState};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

type Tables = im::HashMap<String, Table>;

/// Handle to the persisted store. Clones share the same tables.
///
/// Reads go against the last committed image and never block behind a
/// running transaction. Transactions are serialised through a single writer
/// slot, so a long deletion delays other writers only.
#[derive(Clone, Default)]
pub struct Database {
    committed: Arc<RwLock<Tables>>,
    writer: Arc<Mutex<()>>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    async fn image(&self) -> Tables {
        self.committed.read().await.clone()
    }

    pub async fn create_table(&self, schema: TableSchema) -> StoreResult<()> {
        let mut txn = self.begin().await;
        txn.create_table(schema)?;
        txn.commit().await
    }

    /// Autocommit insert.
    pub async fn insert(&self, table: &str, row: Row) -> StoreResult<()> {
        let mut txn = self.begin().await;
        txn.insert(table, row)?;
        txn.commit().await
    }

    pub async fn select(&self, table: &str, filter: &Filter) -> StoreResult<RowSet> {
        select_from(&self.image().await, table, filter)
    }

    pub async fn count(&self, table: &str, filter: &Filter) -> StoreResult<usize> {
        lookup(&self.image().await, table)?.count(filter)
    }

    pub async fn table_exists(&self, table: &str) -> bool {
        self.committed.read().await.contains_key(table)
    }

    pub async fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.committed.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Waits for the writer slot, then stages on the current committed image.
    pub async fn begin(&self) -> Transaction {
        let writer = Arc::clone(&self.writer).lock_owned().await;
        let staged = self.image().await;
        let log = TransactionLog::new(TransactionId::new());
        debug!(txn = %log.id(), "transaction started");
        Transaction {
            log,
            staged,
            committed: Arc::clone(&self.committed),
            _writer: writer,
        }
    }
}

fn lookup<'a>(tables: &'a Tables, table: &str) -> StoreResult<&'a Table> {
    tables
        .get(table)
        .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
}

fn select_from(tables: &Tables, table: &str, filter: &Filter) -> StoreResult<RowSet> {
    let table_ref = lookup(tables, table)?;
    let rows = table_ref.select(filter)?;
    Ok(RowSet::new(table, table_ref.schema().column_names(), rows))
}

/// An open write transaction. Dropping it without `commit` rolls it back.
pub struct Transaction {
    log: TransactionLog,
    staged: Tables,
    committed: Arc<RwLock<Tables>>,
    _writer: OwnedMutexGuard<()>,
}

impl Transaction {
    pub fn id(&self) -> TransactionId {
        self.log.id()
    }

    pub fn state(&self) -> TransactionState {
        self.log.state()
    }

    pub fn changes(&self) -> &[Change] {
        self.log.changes()
    }

    pub fn change_count(&self) -> usize {
        self.log.change_count()
    }

    pub fn select(&self, table: &str, filter: &Filter) -> StoreResult<RowSet> {
        self.log.ensure_active()?;
        select_from(&self.staged, table, filter)
    }

    pub fn count(&self, table: &str, filter: &Filter) -> StoreResult<usize> {
        self.log.ensure_active()?;
        lookup(&self.staged, table)?.count(filter)
    }

    pub fn create_table(&mut self, schema: TableSchema) -> StoreResult<()> {
        self.log.ensure_active()?;
        let name = schema.name().to_string();
        if self.staged.contains_key(&name) {
            return Err(StoreError::TableExists(name));
        }
        self.staged.insert(name.clone(), Table::new(schema));
        self.log.record_change(Change::CreateTable { name })
    }

    pub fn insert(&mut self, table: &str, row: Row) -> StoreResult<()> {
        self.log.ensure_active()?;
        let target = self
            .staged
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let row_id = target.insert(row.clone())?;
        self.log.record_change(Change::InsertRow {
            table: table.to_string(),
            row_id,
            row,
        })
    }

    /// Deletes the matching rows and returns how many were removed.
    pub fn delete_where(&mut self, table: &str, filter: &Filter) -> StoreResult<usize> {
        self.log.ensure_active()?;
        let target = self
            .staged
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let removed = target.delete_where(filter)?;
        let count = removed.len();
        for (row_id, old_row) in removed {
            self.log.record_change(Change::DeleteRow {
                table: table.to_string(),
                row_id,
                old_row,
            })?;
        }
        Ok(count)
    }

    /// Publishes the staged image.
    pub async fn commit(mut self) -> StoreResult<()> {
        self.log.commit()?;
        let staged = std::mem::take(&mut self.staged);
        *self.committed.write().await = staged;
        debug!(
            txn = %self.log.id(),
            changes = self.log.change_count(),
            elapsed_us = self.log.duration().as_micros() as u64,
            "transaction committed"
        );
        Ok(())
    }

    pub fn rollback(mut self) -> StoreResult<()> {
        self.abort()
    }

    fn abort(&mut self) -> StoreResult<()> {
        let discarded = self.log.change_count();
        self.log.rollback()?;
        self.staged = Tables::new();
        debug!(txn = %self.log.id(), discarded, "transaction rolled back");
        Ok(())
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.log.state().is_active() {
            let _ = self.abort();
        }
    }
}
