// ============================================================================
// memolock Library
// ============================================================================

//! Optimistic locking for row-oriented records.
//!
//! Instead of holding database locks while a record is edited, every update
//! carries extra `WHERE` conditions so it only applies if the row is still
//! in the state the caller last saw. A zero-row update is reported as a
//! conflict.
//!
//! # Examples
//!
//! ```
//! use memolock::{
//!     Column, DataType, InMemoryBackend, LockingConfig, LockingStrategy, Record,
//!     RecordSchema, RecordType, SaveOutcome, Value,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = RecordSchema::new(
//!     "documents",
//!     vec![
//!         Column::new("id", DataType::Integer).primary_key(),
//!         Column::new("title", DataType::Text),
//!         Column::new("version", DataType::Integer),
//!     ],
//! );
//!
//! let mut backend = InMemoryBackend::new();
//! backend.create_table(schema.clone())?;
//!
//! let documents = RecordType::new(schema, LockingConfig::new(LockingStrategy::Version))?;
//!
//! let mut doc = Record::new(documents.clone());
//! doc.set("id", 1)?;
//! doc.set("title", "draft")?;
//! assert_eq!(doc.save(&backend)?, SaveOutcome::Inserted);
//!
//! let mut stale = Record::load(
//!     documents,
//!     [("id", Value::Integer(1)), ("title", Value::from("draft")), ("version", Value::Integer(1))],
//! )?;
//!
//! doc.set("title", "final")?;
//! assert_eq!(doc.save(&backend)?, SaveOutcome::Updated);
//! assert_eq!(doc.get("version"), Some(&Value::Integer(2)));
//!
//! stale.set("title", "other")?;
//! let err = stale.save(&backend).unwrap_err();
//! assert!(err.is_conflict());
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod locking;
pub mod record;
pub mod storage;

// Re-export main types for convenience
pub use crate::core::{
    BackendError, Column, ColumnValues, ConflictError, DataType, DbError, RecordSchema, Result,
    Value,
};
pub use crate::locking::{
    LockingConfig, LockingPolicy, LockingStrategy, UpdatePlan, validate_strategy,
};
pub use crate::record::{Record, RecordState, RecordType, SaveOutcome};
pub use crate::storage::{BackendResult, InMemoryBackend, PersistenceBackend};
