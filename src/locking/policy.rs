use super::{LockingConfig, LockingStrategy, UpdatePlan};
use crate::core::{ColumnValues, DataType, DbError, RecordSchema, Result, Value};
use crate::record::RecordState;
use std::collections::BTreeSet;

/// Validated, immutable locking configuration of one record type.
#[derive(Debug, Clone)]
pub struct LockingPolicy {
    strategy: LockingStrategy,
    ignored: BTreeSet<String>,
    version_column: String,
}

impl LockingPolicy {
    /// Validates `config` against `schema`.
    pub fn new(schema: &RecordSchema, config: LockingConfig) -> Result<Self> {
        if schema.primary_key().next().is_none() {
            return Err(DbError::Configuration(format!(
                "table '{}' declares no primary key",
                schema.table()
            )));
        }

        for column in &config.ignored_columns {
            if schema.get_column(column).is_none() {
                return Err(DbError::Configuration(format!(
                    "ignored column '{}' is not declared on table '{}'",
                    column,
                    schema.table()
                )));
            }
        }

        if config.strategy == LockingStrategy::Version {
            if config.ignored_columns.contains(&config.version_column) {
                return Err(DbError::Configuration(format!(
                    "version column '{}' cannot be ignored",
                    config.version_column
                )));
            }
            match schema.get_column(&config.version_column) {
                Some(column) if column.data_type == DataType::Integer => {}
                Some(column) => {
                    return Err(DbError::Configuration(format!(
                        "version column '{}' must be INTEGER, found {}",
                        column.name, column.data_type
                    )));
                }
                None => {
                    return Err(DbError::Configuration(format!(
                        "version column '{}' is not declared on table '{}'",
                        config.version_column,
                        schema.table()
                    )));
                }
            }
        }

        Ok(Self {
            strategy: config.strategy,
            ignored: config.ignored_columns.into_iter().collect(),
            version_column: config.version_column,
        })
    }

    pub fn strategy(&self) -> LockingStrategy {
        self.strategy
    }

    pub fn version_column(&self) -> &str {
        &self.version_column
    }

    pub fn is_ignored(&self, column: &str) -> bool {
        self.ignored.contains(column)
    }

    /// Derives the update plan for `state`. The persistence path calls this
    /// once, right before issuing the write.
    ///
    /// Under `version`, bumps the counter in `state` when any non-ignored
    /// column changed, overriding any value the caller set by hand.
    pub fn compute_update_plan(
        &self,
        schema: &RecordSchema,
        state: &mut RecordState,
    ) -> Result<Option<UpdatePlan>> {
        if !state.is_changed() {
            return Ok(None);
        }

        if self.strategy == LockingStrategy::Version {
            let significant = state
                .changed_columns()
                .iter()
                .any(|column| !self.is_ignored(column));
            if significant {
                let next = self.next_version(state)?;
                state.set_field(self.version_column.clone(), Value::Integer(next));
            }
        }

        let identity: ColumnValues = schema
            .primary_key()
            .map(|key| (key.to_string(), current(state, key)))
            .collect();

        let changes: ColumnValues = schema
            .column_names()
            .filter(|column| state.is_column_changed(column))
            .map(|column| (column.to_string(), current(state, column)))
            .collect();

        let mut predicate: ColumnValues = schema
            .primary_key()
            .map(|key| (key.to_string(), original(state, key)))
            .collect();
        predicate.extend(self.extra_conditions(schema, state));

        Ok(Some(UpdatePlan::new(
            self.strategy,
            identity,
            changes,
            predicate,
        )))
    }

    /// Starts the version counter at 1 before a first insert, whatever
    /// the caller put there.
    pub fn prepare_insert(&self, state: &mut RecordState) {
        if self.strategy == LockingStrategy::Version {
            state.set_field(self.version_column.clone(), Value::Integer(1));
        }
    }

    fn extra_conditions(&self, schema: &RecordSchema, state: &RecordState) -> ColumnValues {
        let guarded = |column: &&str| !schema.is_primary_key(column) && !self.is_ignored(column);

        match self.strategy {
            LockingStrategy::Dirty => {
                let captured = state.captured_originals();
                schema
                    .column_names()
                    .filter(guarded)
                    .filter_map(|column| {
                        captured
                            .get(column)
                            .map(|value| (column.to_string(), value.clone()))
                    })
                    .collect()
            }
            LockingStrategy::Version => {
                vec![(
                    self.version_column.clone(),
                    original(state, &self.version_column),
                )]
            }
            LockingStrategy::All => {
                let originals = state.original_values();
                schema
                    .column_names()
                    .filter(guarded)
                    .map(|column| {
                        let value = originals.get(column).cloned().unwrap_or(Value::Null);
                        (column.to_string(), value)
                    })
                    .collect()
            }
            LockingStrategy::None => Vec::new(),
        }
    }

    fn next_version(&self, state: &RecordState) -> Result<i64> {
        match original(state, &self.version_column) {
            Value::Null => Ok(1),
            Value::Integer(version) => version.checked_add(1).ok_or_else(|| {
                DbError::InvariantViolation(format!(
                    "version column '{}' overflowed",
                    self.version_column
                ))
            }),
            other => Err(DbError::TypeMismatch(format!(
                "version column '{}' holds {}, expected INTEGER",
                self.version_column,
                other.type_name()
            ))),
        }
    }
}

fn current(state: &RecordState, column: &str) -> Value {
    state.value(column).cloned().unwrap_or(Value::Null)
}

fn original(state: &RecordState, column: &str) -> Value {
    state.original_value(column).cloned().unwrap_or(Value::Null)
}
