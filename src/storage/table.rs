use super::Filter;
use crate::core::{DataType, Row, StoreError, StoreResult, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub primary_key: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn validate(&self, value: &Value) -> StoreResult<()> {
        if value.is_null() {
            if !self.nullable {
                return Err(StoreError::ConstraintViolation(format!(
                    "Column '{}' cannot be NULL",
                    self.name
                )));
            }
            return Ok(());
        }

        if !self.data_type.is_compatible(value) {
            return Err(StoreError::TypeMismatch(format!(
                "Column '{}' expects type {}, got {}",
                self.name,
                self.data_type,
                value.type_name()
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    name: String,
    columns: Vec<Column>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    /// Like `find_column_index` but reports the missing column as an error.
    pub fn column_index(&self, name: &str) -> StoreResult<usize> {
        self.find_column_index(name)
            .ok_or_else(|| StoreError::ColumnNotFound(name.to_string(), self.name.clone()))
    }
}

/// A table image. Rows live in a persistent ordered map so cloning a table
/// for a transaction is O(1) and only touched paths are copied.
#[derive(Debug, Clone)]
pub struct Table {
    schema: TableSchema,
    rows: im::OrdMap<usize, Row>,
    next_row_id: usize,
}

impl Table {
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            rows: im::OrdMap::new(),
            next_row_id: 0,
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn insert(&mut self, row: Row) -> StoreResult<usize> {
        self.validate_row(&row)?;
        self.check_primary_key(&row)?;

        let id = self.next_row_id;
        self.next_row_id += 1;
        self.rows.insert(id, row);
        Ok(id)
    }

    /// Rows matching `filter`, in insertion order.
    pub fn select(&self, filter: &Filter) -> StoreResult<Vec<Row>> {
        let mut results = Vec::new();
        for row in self.rows.values() {
            if filter.matches(&self.schema, row)? {
                results.push(row.clone());
            }
        }
        Ok(results)
    }

    pub fn count(&self, filter: &Filter) -> StoreResult<usize> {
        let mut count = 0;
        for row in self.rows.values() {
            if filter.matches(&self.schema, row)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Removes every row matching `filter` and returns them with their ids.
    /// Nothing is removed if the filter fails to evaluate on any row.
    pub fn delete_where(&mut self, filter: &Filter) -> StoreResult<Vec<(usize, Row)>> {
        let mut doomed = Vec::new();
        for (id, row) in self.rows.iter() {
            if filter.matches(&self.schema, row)? {
                doomed.push((*id, row.clone()));
            }
        }
        for (id, _) in &doomed {
            self.rows.remove(id);
        }
        Ok(doomed)
    }

    fn validate_row(&self, row: &Row) -> StoreResult<()> {
        let columns = self.schema.columns();
        if row.len() != columns.len() {
            return Err(StoreError::TypeMismatch(format!(
                "Table '{}' expects {} columns, got {}",
                self.schema.name(),
                columns.len(),
                row.len()
            )));
        }
        for (column, value) in columns.iter().zip(row.iter()) {
            column.validate(value)?;
        }
        Ok(())
    }

    fn check_primary_key(&self, row: &Row) -> StoreResult<()> {
        for (col_idx, column) in self.schema.columns().iter().enumerate() {
            if !column.primary_key {
                continue;
            }
            let value = &row[col_idx];
            if self.rows.values().any(|existing| &existing[col_idx] == value) {
                return Err(StoreError::ConstraintViolation(format!(
                    "Primary key violation: {}.{} already contains {}",
                    self.schema.name(),
                    column.name,
                    value
                )));
            }
        }
        Ok(())
    }
}
