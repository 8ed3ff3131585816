use crate::locking::UpdatePlan;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Conflict(Box<ConflictError>),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound { column: String, table: String },

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns the conflict details when this error is an optimistic lock conflict.
    pub fn as_conflict(&self) -> Option<&ConflictError> {
        match self {
            Self::Conflict(conflict) => Some(conflict),
            _ => None,
        }
    }
}

/// A conditional update matched zero rows.
///
/// Carries the exact plan that was attempted so callers can see which
/// predicate no longer held.
#[derive(Error, Debug, Clone)]
#[error("Optimistic lock conflict for {table}: no row matched {}", .plan.where_clause())]
pub struct ConflictError {
    pub table: String,
    pub plan: UpdatePlan,
}

impl From<ConflictError> for DbError {
    fn from(err: ConflictError) -> Self {
        Self::Conflict(Box::new(err))
    }
}

/// Failures raised by a persistence backend.
///
/// These are surfaced to callers as-is and never reinterpreted as conflicts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
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

    #[error("Lock error: {0}")]
    LockPoisoned(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("{0}")]
    Other(String),
}

impl<T> From<std::sync::PoisonError<T>> for BackendError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned(err.to_string())
    }
}
