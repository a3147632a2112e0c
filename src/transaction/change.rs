// ============================================================================
// Transaction Change Journal
// ============================================================================
//
// Every mutation a transaction stages is journaled as a Change. The journal
// is what the deletion engine reports per table, and what a rollback
// discards together with the staged image.
//
// ============================================================================

use crate::core::Row;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Insert a new row into a table
    InsertRow {
        table: String,
        row_id: usize,
        row: Row,
    },

    /// Delete an existing row
    DeleteRow {
        table: String,
        row_id: usize,
        old_row: Row,
    },

    /// Create a new table
    CreateTable { name: String },
}

impl Change {
    /// Get the table name affected by this change
    pub fn table_name(&self) -> &str {
        match self {
            Change::InsertRow { table, .. } => table,
            Change::DeleteRow { table, .. } => table,
            Change::CreateTable { name } => name,
        }
    }

    pub fn is_ddl(&self) -> bool {
        matches!(self, Change::CreateTable { .. })
    }

    pub fn is_dml(&self) -> bool {
        matches!(self, Change::InsertRow { .. } | Change::DeleteRow { .. })
    }
}

/// Number of deleted rows per table, in table-name order.
pub fn deletions_by_table(changes: &[Change]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for change in changes {
        if let Change::DeleteRow { table, .. } = change {
            *counts.entry(table.clone()).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    #[test]
    fn test_change_classification() {
        let insert = Change::InsertRow {
            table: "items".to_string(),
            row_id: 0,
            row: vec![Value::Integer(1)],
        };
        assert!(insert.is_dml());
        assert!(!insert.is_ddl());
        assert_eq!(insert.table_name(), "items");

        let create = Change::CreateTable {
            name: "pets".to_string(),
        };
        assert!(create.is_ddl());
        assert!(!create.is_dml());
    }

    #[test]
    fn test_deletions_by_table() {
        let delete = |table: &str, row_id| Change::DeleteRow {
            table: table.to_string(),
            row_id,
            old_row: vec![],
        };
        let changes = vec![
            delete("items", 0),
            delete("items", 1),
            delete("characters", 4),
            Change::CreateTable { name: "x".into() },
        ];
        let counts = deletions_by_table(&changes);
        assert_eq!(counts.get("items"), Some(&2));
        assert_eq!(counts.get("characters"), Some(&1));
        assert_eq!(counts.get("x"), None);
    }
}
