use super::steps::{CHARACTER_CASCADE, DeletionStep};
use crate::core::{ActorId, ConsoleError, Result};
use crate::lifecycle::{LifecycleCommander, NO_PINNED_TARGETS};
use crate::storage::schema::{ACCOUNTS, CHARACTERS};
use crate::storage::{Database, Filter, Transaction};
use crate::transaction::deletions_by_table;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// What a committed character deletion removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub actor_id: ActorId,
    pub account: String,
    /// Rows removed per table, the account row included.
    pub rows_deleted: BTreeMap<String, usize>,
    pub account_deleted: bool,
}

impl DeletionReport {
    pub fn total_rows(&self) -> usize {
        self.rows_deleted.values().sum()
    }
}

/// Removes characters with all their dependent records, one transaction
/// per character.
#[derive(Clone)]
pub struct DeletionEngine {
    db: Database,
    lifecycle: LifecycleCommander,
    cascade: Vec<DeletionStep>,
}

impl DeletionEngine {
    pub fn new(db: Database, lifecycle: LifecycleCommander) -> Self {
        Self {
            db,
            lifecycle,
            cascade: CHARACTER_CASCADE.to_vec(),
        }
    }

    /// Replaces the cascade plan. The character row step must stay last.
    pub fn with_cascade(mut self, cascade: Vec<DeletionStep>) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn cascade(&self) -> &[DeletionStep] {
        &self.cascade
    }

    /// Despawns (when online) and deletes every id. Returns how many
    /// persisted deletions committed; per-id failures are logged only.
    pub async fn delete_batch(&self, ids: &[ActorId]) -> Result<usize> {
        if ids.is_empty() {
            return Err(ConsoleError::validation(NO_PINNED_TARGETS));
        }

        let mut deleted = 0;
        for &id in ids {
            if let Err(err) = self.lifecycle.despawn(id).await {
                warn!(actor_id = %id, error = %err, "despawn before delete failed");
            }

            match self.delete_one(id).await {
                Ok(_) => deleted += 1,
                Err(err) => warn!(actor_id = %id, error = %err, "delete failed"),
            }
        }

        info!(deleted, requested = ids.len(), "delete batch finished");
        Ok(deleted)
    }

    /// Deletes one character and, if it was the last one, its account.
    ///
    /// The name is released before the transaction opens and stays released
    /// even when the transaction rolls back.
    pub async fn delete_one(&self, id: ActorId) -> Result<DeletionReport> {
        if !id.is_valid() {
            return Err(ConsoleError::validation(format!("Invalid identity {}.", id)));
        }

        self.lifecycle.world().unregister_identity(id).await;

        let mut txn = self.db.begin().await;
        match self.cascade_in(&mut txn, id) {
            Ok((account, account_deleted)) => {
                let rows_deleted = deletions_by_table(txn.changes());
                txn.commit().await?;
                let report = DeletionReport {
                    actor_id: id,
                    account,
                    rows_deleted,
                    account_deleted,
                };
                info!(
                    actor_id = %id,
                    account = %report.account,
                    rows = report.total_rows(),
                    account_deleted,
                    "character deleted"
                );
                Ok(report)
            }
            Err(err) => {
                let txn_id = txn.id();
                if let Err(rollback_err) = txn.rollback() {
                    warn!(txn = %txn_id, error = %rollback_err, "rollback failed");
                }
                warn!(
                    actor_id = %id,
                    error = %err,
                    "deletion rolled back; name stays released"
                );
                Err(err)
            }
        }
    }

    fn cascade_in(&self, txn: &mut Transaction, id: ActorId) -> Result<(String, bool)> {
        let account = txn
            .select(CHARACTERS, &Filter::eq("obj_id", id))?
            .first()
            .map(|record| record.get_opt_str("account_name"))
            .transpose()?
            .flatten()
            .map(str::to_string)
            .ok_or(ConsoleError::AccountMissing(id))?;

        for step in &self.cascade {
            let filter = step.filter(txn, id)?;
            let removed = txn.delete_where(step.table, &filter)?;
            debug!(actor_id = %id, table = step.table, removed, "cascade step");
        }

        let remaining = txn.count(CHARACTERS, &Filter::eq("account_name", account.as_str()))?;
        let account_deleted = if remaining == 0 {
            txn.delete_where(ACCOUNTS, &Filter::eq("login", account.as_str()))? > 0
        } else {
            false
        };

        Ok((account, account_deleted))
    }
}
