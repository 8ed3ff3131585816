use crate::core::{BackendError, ColumnValues, Value};

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// The store that executes writes on behalf of records.
///
/// Only the conditional update is required. Implementations must check the
/// predicate and apply the write atomically.
pub trait PersistenceBackend: Send + Sync {
    /// Applies `columns` to every row of `table` matching all `predicate`
    /// equalities and returns how many rows were affected.
    fn execute_conditional_update(
        &self,
        table: &str,
        columns: &[(String, Value)],
        predicate: &[(String, Value)],
    ) -> BackendResult<u64>;

    /// Inserts a complete row.
    fn insert_row(&self, table: &str, _values: &[(String, Value)]) -> BackendResult<()> {
        Err(BackendError::Unsupported(format!(
            "insert into '{}' is not supported by this backend",
            table
        )))
    }

    /// Fetches the row identified by `key`, if it still exists.
    fn fetch_row(
        &self,
        table: &str,
        _key: &[(String, Value)],
    ) -> BackendResult<Option<ColumnValues>> {
        Err(BackendError::Unsupported(format!(
            "fetch from '{}' is not supported by this backend",
            table
        )))
    }
}
