use super::LockingStrategy;
use crate::core::{ColumnValues, ConflictError, DbError, Result, Value};

/// The frozen outcome of planning one save attempt.
///
/// Once built, the predicate does not change: the backend call, the
/// conflict diagnostics and the logs all see the same snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePlan {
    strategy: LockingStrategy,
    identity: ColumnValues,
    changes: ColumnValues,
    predicate: ColumnValues,
}

impl UpdatePlan {
    pub(crate) fn new(
        strategy: LockingStrategy,
        identity: ColumnValues,
        changes: ColumnValues,
        predicate: ColumnValues,
    ) -> Self {
        Self {
            strategy,
            identity,
            changes,
            predicate,
        }
    }

    pub fn strategy(&self) -> LockingStrategy {
        self.strategy
    }

    /// Changed columns with the values that will be written.
    pub fn changes(&self) -> &[(String, Value)] {
        &self.changes
    }

    /// Equality conditions the row must satisfy, primary key first.
    pub fn predicate(&self) -> &[(String, Value)] {
        &self.predicate
    }

    /// Primary-key columns with their current values, followed by every
    /// changed column that is not part of the key.
    pub fn columns_to_write(&self) -> ColumnValues {
        let mut columns = self.identity.clone();
        for (name, value) in &self.changes {
            match columns.iter_mut().find(|(key, _)| key == name) {
                Some(slot) => slot.1 = value.clone(),
                None => columns.push((name.clone(), value.clone())),
            }
        }
        columns
    }

    pub fn predicate_value(&self, column: &str) -> Option<&Value> {
        lookup(&self.predicate, column)
    }

    pub fn change_value(&self, column: &str) -> Option<&Value> {
        lookup(&self.changes, column)
    }

    /// Renders the predicate as SQL, using `IS NULL` for null conditions.
    pub fn where_clause(&self) -> String {
        self.predicate
            .iter()
            .map(|(column, value)| match value {
                Value::Null => format!("{} IS NULL", column),
                other => format!("{} = {}", column, other.to_sql_literal()),
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    pub fn set_clause(&self) -> String {
        self.changes
            .iter()
            .map(|(column, value)| format!("{} = {}", column, value.to_sql_literal()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn to_sql(&self, table: &str) -> String {
        format!(
            "UPDATE {} SET {} WHERE {}",
            table,
            self.set_clause(),
            self.where_clause()
        )
    }

    /// Turns the backend's affected-row count into the save result.
    ///
    /// One row is success, zero is a conflict, more than one means the
    /// predicate did not pin a unique row.
    pub fn interpret_rows_affected(self, table: &str, rows_affected: u64) -> Result<()> {
        match rows_affected {
            1 => Ok(()),
            0 => Err(ConflictError {
                table: table.to_string(),
                plan: self,
            }
            .into()),
            n => Err(DbError::InvariantViolation(format!(
                "conditional update on '{}' matched {} rows for {}; primary key is missing or not unique",
                table,
                n,
                self.where_clause()
            ))),
        }
    }
}

fn lookup<'a>(columns: &'a [(String, Value)], name: &str) -> Option<&'a Value> {
    columns
        .iter()
        .find(|(column, _)| column == name)
        .map(|(_, value)| value)
}
