use super::BackendResult;
use crate::core::{BackendError, ColumnValues, DbError, RecordSchema, Row, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Table {
    schema: RecordSchema,
    rows: BTreeMap<usize, Row>,
    next_row_id: usize,
}

impl Table {
    pub fn new(schema: RecordSchema) -> Self {
        Self {
            schema,
            rows: BTreeMap::new(),
            next_row_id: 0,
        }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Inserts a row; columns not listed are `NULL`.
    pub fn insert(&mut self, values: &[(String, Value)]) -> BackendResult<usize> {
        let mut row = vec![Value::Null; self.schema.column_count()];
        for (idx, value) in self.resolve(values)? {
            row[idx] = value;
        }
        self.validate_row(&row)?;
        self.check_key_unique(&row, &[])?;

        let id = self.next_row_id;
        self.next_row_id += 1;
        self.rows.insert(id, row);
        Ok(id)
    }

    /// Writes `columns` into every row matching `predicate`.
    pub fn update_matching(
        &mut self,
        columns: &[(String, Value)],
        predicate: &[(String, Value)],
    ) -> BackendResult<u64> {
        let assignments = self.resolve(columns)?;
        let matching = self.matching_ids(predicate)?;

        let mut updated = Vec::with_capacity(matching.len());
        for id in &matching {
            let mut row = self.rows[id].clone();
            for (idx, value) in &assignments {
                row[*idx] = value.clone();
            }
            self.validate_row(&row)?;
            updated.push((*id, row));
        }

        for (position, (_, row)) in updated.iter().enumerate() {
            self.check_key_unique(row, &matching)?;
            let clash = updated[..position]
                .iter()
                .any(|(_, other)| self.same_key(row, other));
            if clash {
                return Err(self.duplicate_key(row));
            }
        }

        for (id, row) in updated {
            self.rows.insert(id, row);
        }
        Ok(matching.len() as u64)
    }

    /// Returns the first row matching `key`.
    pub fn fetch(&self, key: &[(String, Value)]) -> BackendResult<Option<ColumnValues>> {
        let Some(id) = self.matching_ids(key)?.into_iter().next() else {
            return Ok(None);
        };
        let row = &self.rows[&id];
        Ok(Some(
            self.schema
                .column_names()
                .map(str::to_string)
                .zip(row.iter().cloned())
                .collect(),
        ))
    }

    fn matching_ids(&self, predicate: &[(String, Value)]) -> BackendResult<Vec<usize>> {
        let conditions = self.resolve(predicate)?;
        Ok(self
            .rows
            .iter()
            .filter(|(_, row)| conditions.iter().all(|(idx, value)| &row[*idx] == value))
            .map(|(id, _)| *id)
            .collect())
    }

    fn resolve(&self, columns: &[(String, Value)]) -> BackendResult<Vec<(usize, Value)>> {
        columns
            .iter()
            .map(|(name, value)| {
                self.schema
                    .find_column_index(name)
                    .map(|idx| (idx, value.clone()))
                    .ok_or_else(|| {
                        BackendError::ColumnNotFound(name.clone(), self.schema.table().to_string())
                    })
            })
            .collect()
    }

    fn validate_row(&self, row: &Row) -> BackendResult<()> {
        for (column, value) in self.schema.columns().iter().zip(row) {
            column.validate(value).map_err(|err| match err {
                DbError::TypeMismatch(message) => BackendError::TypeMismatch(message),
                other => BackendError::Other(other.to_string()),
            })?;
        }
        Ok(())
    }

    fn same_key(&self, left: &Row, right: &Row) -> bool {
        self.schema
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, column)| column.primary_key)
            .all(|(idx, _)| left[idx] == right[idx])
    }

    fn check_key_unique(&self, row: &Row, skip: &[usize]) -> BackendResult<()> {
        let clash = self
            .rows
            .iter()
            .filter(|(id, _)| !skip.contains(*id))
            .any(|(_, existing)| self.same_key(row, existing));
        if clash {
            return Err(self.duplicate_key(row));
        }
        Ok(())
    }

    fn duplicate_key(&self, row: &Row) -> BackendError {
        let key = self
            .schema
            .columns()
            .iter()
            .zip(row)
            .filter(|(column, _)| column.primary_key)
            .map(|(column, value)| format!("{}={}", column.name, value))
            .collect::<Vec<_>>()
            .join(", ");
        BackendError::ConstraintViolation(format!(
            "Unique constraint violation: primary key ({}) already exists in '{}'",
            key,
            self.schema.table()
        ))
    }
}
