pub mod state;

pub use state::RecordState;

use crate::core::{ColumnValues, DbError, RecordSchema, Result, Value};
use crate::locking::{LockingConfig, LockingPolicy};
use crate::storage::PersistenceBackend;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, debug_span, error, warn};

/// Schema and locking policy shared by every instance of one record type.
#[derive(Debug)]
pub struct RecordType {
    schema: RecordSchema,
    policy: LockingPolicy,
}

impl RecordType {
    /// Validates `config` against `schema` and freezes both.
    pub fn new(schema: RecordSchema, config: LockingConfig) -> Result<Arc<Self>> {
        let policy = LockingPolicy::new(&schema, config)?;
        Ok(Arc::new(Self { schema, policy }))
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn policy(&self) -> &LockingPolicy {
        &self.policy
    }

    pub fn table(&self) -> &str {
        self.schema.table()
    }
}

/// What a successful [`Record::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing changed; no backend call was made.
    NoOp,
    Inserted,
    Updated,
}

/// One in-memory record instance with optimistic-locking saves.
#[derive(Debug, Clone)]
pub struct Record {
    record_type: Arc<RecordType>,
    state: RecordState,
    persisted: bool,
}

impl Record {
    /// Creates a record that has never been persisted. Every column starts as `NULL`.
    pub fn new(record_type: Arc<RecordType>) -> Self {
        let state = RecordState::new(
            record_type
                .schema()
                .column_names()
                .map(|column| (column, Value::Null)),
        );
        Self {
            record_type,
            state,
            persisted: false,
        }
    }

    /// Wraps a row already stored in the backend. Omitted columns are `NULL`,
    /// which fails for key and `NOT NULL` columns.
    pub fn load<I, K, V>(record_type: Arc<RecordType>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut record = Self::new(record_type);
        for (column, value) in values {
            record.set(column.as_ref(), value)?;
        }
        for column in record.record_type.schema().columns() {
            let value = record.state.value(&column.name).unwrap_or(&Value::Null);
            column.validate(value)?;
        }
        record.state.clear_session_state();
        record.persisted = true;
        Ok(record)
    }

    /// Loads a stored row from a JSON object keyed by column name.
    pub fn from_json(record_type: Arc<RecordType>, json: &JsonValue) -> Result<Self> {
        let object = json.as_object().ok_or_else(|| {
            DbError::TypeMismatch(format!(
                "record for '{}' must be a JSON object",
                record_type.table()
            ))
        })?;

        let mut values = Vec::with_capacity(object.len());
        for (column, raw) in object {
            let declared = record_type.schema().require_column(column)?;
            values.push((column.clone(), Value::from_json(raw, &declared.data_type)?));
        }
        Self::load(record_type, values)
    }

    pub fn to_json(&self) -> JsonValue {
        let object = self
            .record_type
            .schema()
            .column_names()
            .map(|column| {
                let value = self.get(column).map(Value::to_json).unwrap_or(JsonValue::Null);
                (column.to_string(), value)
            })
            .collect();
        JsonValue::Object(object)
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    pub fn state(&self) -> &RecordState {
        &self.state
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.state.value(column)
    }

    /// Sets a declared column after checking the value against its type.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.record_type
            .schema()
            .require_column(column)?
            .validate(&value)?;
        self.state.set_field(column, value);
        Ok(())
    }

    pub fn is_changed(&self) -> bool {
        self.state.is_changed()
    }

    pub fn original_value(&self, column: &str) -> Option<&Value> {
        self.state.original_value(column)
    }

    /// Primary key as last persisted.
    pub fn key(&self) -> ColumnValues {
        self.record_type
            .schema()
            .primary_key()
            .map(|key| {
                let value = self.original_value(key).cloned().unwrap_or(Value::Null);
                (key.to_string(), value)
            })
            .collect()
    }

    /// Writes pending changes.
    ///
    /// New records are inserted. Persisted records go through one
    /// conditional update guarded by the type's locking policy. On any
    /// error the edit session is left exactly as it was before the call.
    pub fn save<B>(&mut self, backend: &B) -> Result<SaveOutcome>
    where
        B: PersistenceBackend + ?Sized,
    {
        let record_type = Arc::clone(&self.record_type);
        let table = record_type.table();
        let span = debug_span!("save", table = %table, strategy = %record_type.policy().strategy());
        let _enter = span.enter();

        let before = self.state.clone();
        let result = if self.persisted {
            self.update(&record_type, backend)
        } else {
            self.insert(&record_type, backend)
        };

        match &result {
            Ok(SaveOutcome::NoOp) => {}
            Ok(_) => {
                self.state.clear_session_state();
                self.persisted = true;
            }
            Err(_) => self.state = before,
        }
        result
    }

    fn update<B>(&mut self, record_type: &RecordType, backend: &B) -> Result<SaveOutcome>
    where
        B: PersistenceBackend + ?Sized,
    {
        let table = record_type.table();
        let Some(plan) = record_type
            .policy()
            .compute_update_plan(record_type.schema(), &mut self.state)?
        else {
            debug!("no changed columns, skipping update");
            return Ok(SaveOutcome::NoOp);
        };

        debug!(
            predicate_terms = plan.predicate().len(),
            sql = %plan.to_sql(table),
            "issuing conditional update"
        );

        let rows_affected =
            backend.execute_conditional_update(table, &plan.columns_to_write(), plan.predicate())?;

        match plan.interpret_rows_affected(table, rows_affected) {
            Ok(()) => {
                debug!("update applied");
                Ok(SaveOutcome::Updated)
            }
            Err(err @ DbError::Conflict(_)) => {
                warn!(error = %err, "optimistic lock conflict");
                Err(err)
            }
            Err(err) => {
                error!(rows_affected, error = %err, "conditional update matched more than one row");
                Err(err)
            }
        }
    }

    fn insert<B>(&mut self, record_type: &RecordType, backend: &B) -> Result<SaveOutcome>
    where
        B: PersistenceBackend + ?Sized,
    {
        record_type.policy().prepare_insert(&mut self.state);

        let mut row = ColumnValues::with_capacity(record_type.schema().column_count());
        for column in record_type.schema().columns() {
            let value = self.state.value(&column.name).cloned().unwrap_or(Value::Null);
            column.validate(&value)?;
            row.push((column.name.clone(), value));
        }

        backend.insert_row(record_type.table(), &row)?;
        debug!(columns = row.len(), "row inserted");
        Ok(SaveOutcome::Inserted)
    }

    /// Replaces the record with the row currently stored under its key.
    ///
    /// Returns `Ok(false)` and leaves the record untouched if the row is gone.
    pub fn reload<B>(&mut self, backend: &B) -> Result<bool>
    where
        B: PersistenceBackend + ?Sized,
    {
        let Some(row) = backend.fetch_row(self.record_type.table(), &self.key())? else {
            debug!(table = %self.record_type.table(), "row vanished, nothing to reload");
            return Ok(false);
        };

        let schema = self.record_type.schema();
        let mut fresh: ColumnValues = schema
            .column_names()
            .map(|column| (column.to_string(), Value::Null))
            .collect();
        for (column, value) in row {
            if let Some(slot) = fresh.iter_mut().find(|(name, _)| *name == column) {
                slot.1 = value;
            }
        }

        self.state.rebase(fresh);
        self.persisted = true;
        Ok(true)
    }
}
