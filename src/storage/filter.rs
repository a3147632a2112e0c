use super::{TableSchema, pattern};
use crate::core::{Row, StoreResult, Value};

/// Row predicate understood by the store, the subset of SQL `WHERE` the
/// console needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Eq(String, Value),
    Like(String, String),
    In(String, Vec<Value>),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(column.into(), value.into())
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Filter::Like(column.into(), pattern.into())
    }

    pub fn in_list(column: impl Into<String>, values: Vec<Value>) -> Self {
        Filter::In(column.into(), values)
    }

    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut parts) => {
                parts.push(other);
                Filter::And(parts)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut parts) => {
                parts.push(other);
                Filter::Or(parts)
            }
            first => Filter::Or(vec![first, other]),
        }
    }

    /// NULL never matches `Eq`, `Like` or `In`, following SQL three-valued
    /// logic collapsed to false.
    pub fn matches(&self, schema: &TableSchema, row: &Row) -> StoreResult<bool> {
        match self {
            Filter::All => Ok(true),
            Filter::Eq(column, expected) => {
                let value = &row[schema.column_index(column)?];
                Ok(!value.is_null() && value == expected)
            }
            Filter::Like(column, like) => match &row[schema.column_index(column)?] {
                Value::Text(text) => pattern::eval_like(text, like),
                _ => Ok(false),
            },
            Filter::In(column, values) => {
                let value = &row[schema.column_index(column)?];
                Ok(!value.is_null() && values.contains(value))
            }
            Filter::And(parts) => {
                for part in parts {
                    if !part.matches(schema, row)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Filter::Or(parts) => {
                for part in parts {
                    if part.matches(schema, row)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, StoreError};
    use crate::storage::Column;

    fn friends() -> TableSchema {
        TableSchema::new(
            "character_friends",
            vec![
                Column::new("char_id", DataType::Integer),
                Column::new("friend_id", DataType::Integer),
            ],
        )
    }

    #[test]
    fn test_either_side_match() {
        let schema = friends();
        let filter = Filter::eq("char_id", 7).or(Filter::eq("friend_id", 7));
        assert!(filter.matches(&schema, &vec![7.into(), 9.into()]).unwrap());
        assert!(filter.matches(&schema, &vec![9.into(), 7.into()]).unwrap());
        assert!(!filter.matches(&schema, &vec![8.into(), 9.into()]).unwrap());
    }

    #[test]
    fn test_null_never_matches() {
        let schema = friends();
        let row = vec![Value::Null, 1.into()];
        assert!(!Filter::Eq("char_id".into(), Value::Null).matches(&schema, &row).unwrap());
        assert!(!Filter::in_list("char_id", vec![Value::Null]).matches(&schema, &row).unwrap());
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        let err = Filter::eq("owner_id", 1)
            .matches(&friends(), &vec![1.into(), 2.into()])
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::ColumnNotFound("owner_id".into(), "character_friends".into())
        );
    }

    #[test]
    fn test_and_flattens() {
        let filter = Filter::eq("char_id", 1).and(Filter::eq("friend_id", 2)).and(Filter::All);
        assert!(matches!(&filter, Filter::And(parts) if parts.len() == 3));
    }
}
