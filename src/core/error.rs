use crate::core::ActorId;
use thiserror::Error;

/// Failures raised by the persisted store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Invalid LIKE pattern: {0}")]
    Pattern(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

/// Failures raised by the world runtime capabilities.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    #[error("Actor {0} is not live")]
    NotFound(ActorId),

    #[error("Failed restoring actor {0}: {1}")]
    RestoreFailed(ActorId, String),

    #[error("No behavior controller registered for class '{0}'")]
    NoController(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Error surfaced to the console front end and any other collaborator.
///
/// `Validation` is raised before any side effect happens; every other variant
/// describes an execution failure.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("{0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("World error: {0}")]
    World(#[from] WorldError),

    #[error("Character {0} has no owning account")]
    AccountMissing(ActorId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConsoleError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_distinct() {
        assert!(ConsoleError::validation("Select a Point.").is_validation());
        let store: ConsoleError = StoreError::TableNotFound("items".into()).into();
        assert!(!store.is_validation());
        assert_eq!(store.to_string(), "Store error: Table 'items' not found");
    }

    #[test]
    fn test_poison_maps_to_lock_error() {
        let lock = std::sync::Mutex::new(0);
        let _ = std::panic::catch_unwind(|| {
            let _guard = lock.lock().unwrap();
            panic!("poison");
        });
        let err: StoreError = lock.lock().unwrap_err().into();
        assert!(matches!(err, StoreError::LockError(_)));
    }
}
