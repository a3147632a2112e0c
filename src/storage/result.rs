use crate::core::{Row, StoreError, StoreResult, Value};

/// Rows returned by a select, with the column names of the source table.
#[derive(Debug, Clone)]
pub struct RowSet {
    table: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl RowSet {
    pub fn new(table: impl Into<String>, columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            table: table.into(),
            columns,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |values| Record { set: self, values })
    }

    pub fn first(&self) -> Option<Record<'_>> {
        self.records().next()
    }

    /// Every value of one column, e.g. the ids feeding an `IN` filter.
    pub fn column_values(&self, column: &str) -> StoreResult<Vec<Value>> {
        let idx = self.index_of(column)?;
        Ok(self.rows.iter().map(|row| row[idx].clone()).collect())
    }

    fn index_of(&self, column: &str) -> StoreResult<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| StoreError::ColumnNotFound(column.to_string(), self.table.clone()))
    }
}

/// One row of a [`RowSet`] with typed, name-based accessors.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    set: &'a RowSet,
    values: &'a Row,
}

impl<'a> Record<'a> {
    pub fn get(&self, column: &str) -> StoreResult<&'a Value> {
        Ok(&self.values[self.set.index_of(column)?])
    }

    pub fn get_i64(&self, column: &str) -> StoreResult<i64> {
        let value = self.get(column)?;
        value.as_i64().ok_or_else(|| self.mismatch(column, "INTEGER", value))
    }

    /// Integer that must fit in 32 bits; wider values are a type mismatch.
    pub fn get_i32(&self, column: &str) -> StoreResult<i32> {
        let value = self.get(column)?;
        value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| self.mismatch(column, "INTEGER(32)", value))
    }

    pub fn get_str(&self, column: &str) -> StoreResult<&'a str> {
        let value = self.get(column)?;
        value.as_str().ok_or_else(|| self.mismatch(column, "TEXT", value))
    }

    /// NULL and empty text both read as `None`.
    pub fn get_opt_str(&self, column: &str) -> StoreResult<Option<&'a str>> {
        match self.get(column)? {
            Value::Null => Ok(None),
            Value::Text(s) if s.is_empty() => Ok(None),
            Value::Text(s) => Ok(Some(s)),
            other => Err(self.mismatch(column, "TEXT", other)),
        }
    }

    fn mismatch(&self, column: &str, expected: &str, got: &Value) -> StoreError {
        StoreError::TypeMismatch(format!(
            "{}.{} expected {}, got {}",
            self.set.table,
            column,
            expected,
            got.type_name()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_access() {
        let set = RowSet::new(
            "characters",
            vec!["obj_id".into(), "account_name".into()],
            vec![vec![5001.into(), "AutoPilot_7".into()], vec![5002.into(), Value::Null]],
        );
        let first = set.first().unwrap();
        assert_eq!(first.get_i64("obj_id").unwrap(), 5001);
        assert_eq!(first.get_str("account_name").unwrap(), "AutoPilot_7");
        assert!(first.get_i64("account_name").is_err());
        assert!(first.get("x").is_err());
        assert_eq!(first.get_i32("obj_id").unwrap(), 5001);

        let second = set.records().nth(1).unwrap();
        assert!(second.get_i32("account_name").is_err());
        assert_eq!(second.get_opt_str("account_name").unwrap(), None);
        assert_eq!(
            set.column_values("obj_id").unwrap(),
            vec![Value::Integer(5001), Value::Integer(5002)]
        );
    }
}
