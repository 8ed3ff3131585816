use super::{DataType, DbError, Result, Value};

pub type Row = Vec<Value>;

/// Column/value pairs in a stable, caller-visible order.
pub type ColumnValues = Vec<(String, Value)>;

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub primary_key: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column as part of the primary key. Key columns are never nullable.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn validate(&self, value: &Value) -> Result<()> {
        if value.is_null() {
            if !self.nullable {
                return Err(DbError::TypeMismatch(format!(
                    "Column '{}' cannot be NULL",
                    self.name
                )));
            }
            return Ok(());
        }

        if !self.data_type.is_compatible(value) {
            return Err(DbError::TypeMismatch(format!(
                "Column '{}' expects type {}, got {}",
                self.name,
                self.data_type,
                value.type_name()
            )));
        }

        if let Value::Float(f) = value {
            if !f.is_finite() {
                return Err(DbError::TypeMismatch(format!(
                    "Column '{}' cannot store non-finite float {}",
                    self.name, f
                )));
            }
        }

        Ok(())
    }
}

/// Declared shape of a record type: its table, columns and primary key.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    table: String,
    columns: Vec<Column>,
}

impl RecordSchema {
    pub fn new(table: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|col| col.name.as_str())
    }

    pub fn primary_key(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|col| col.primary_key)
            .map(|col| col.name.as_str())
    }

    pub fn is_primary_key(&self, name: &str) -> bool {
        self.get_column(name).is_some_and(|col| col.primary_key)
    }

    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.find_column_index(name).map(|idx| &self.columns[idx])
    }

    /// Looks up a declared column, failing with `ColumnNotFound` otherwise.
    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.get_column(name).ok_or_else(|| DbError::ColumnNotFound {
            column: name.to_string(),
            table: self.table.clone(),
        })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
