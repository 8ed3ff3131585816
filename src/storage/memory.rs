use super::{BackendResult, PersistenceBackend, Table};
use crate::core::{BackendError, ColumnValues, RecordSchema, Value};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-process backend with per-table locks.
///
/// Every conditional update checks its predicate and writes under a single
/// table write lock, so concurrent savers cannot interleave between the
/// check and the write.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    tables: HashMap<String, RwLock<Table>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_table(&mut self, schema: RecordSchema) -> BackendResult<()> {
        let name = schema.table().to_string();
        if self.tables.contains_key(&name) {
            return Err(BackendError::TableExists(name));
        }
        self.tables.insert(name, RwLock::new(Table::new(schema)));
        Ok(())
    }

    pub fn drop_table(&mut self, name: &str) -> BackendResult<()> {
        if self.tables.remove(name).is_none() {
            return Err(BackendError::TableNotFound(name.to_string()));
        }
        Ok(())
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn row_count(&self, name: &str) -> BackendResult<usize> {
        Ok(self.get_table(name)?.read()?.row_count())
    }

    fn get_table(&self, name: &str) -> BackendResult<&RwLock<Table>> {
        self.tables
            .get(name)
            .ok_or_else(|| BackendError::TableNotFound(name.to_string()))
    }
}

impl PersistenceBackend for InMemoryBackend {
    fn execute_conditional_update(
        &self,
        table: &str,
        columns: &[(String, Value)],
        predicate: &[(String, Value)],
    ) -> BackendResult<u64> {
        let mut table = self.get_table(table)?.write()?;
        table.update_matching(columns, predicate)
    }

    fn insert_row(&self, table: &str, values: &[(String, Value)]) -> BackendResult<()> {
        let mut table = self.get_table(table)?.write()?;
        table.insert(values)?;
        Ok(())
    }

    fn fetch_row(
        &self,
        table: &str,
        key: &[(String, Value)],
    ) -> BackendResult<Option<ColumnValues>> {
        let table = self.get_table(table)?.read()?;
        table.fetch(key)
    }
}
