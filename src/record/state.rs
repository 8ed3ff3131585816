use crate::core::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Edit-session bookkeeping for one record instance.
///
/// Tracks current values, which columns were mutated since the last
/// successful save, and the value each mutated column held before its
/// first mutation. A column has a captured original if and only if it is
/// marked changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordState {
    values: BTreeMap<String, Value>,
    changed: BTreeSet<String>,
    originals: BTreeMap<String, Value>,
}

impl RecordState {
    /// Creates a clean state whose current values form the baseline.
    pub fn new<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            changed: BTreeSet::new(),
            originals: BTreeMap::new(),
        }
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Sets a column, capturing its pre-mutation value on the first change
    /// of the session. Later mutations keep the first captured original.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        let previous = self.values.insert(name.clone(), value);
        if !self.changed.contains(&name) {
            self.originals
                .insert(name.clone(), previous.unwrap_or(Value::Null));
            self.changed.insert(name);
        }
    }

    /// The captured original for a changed column, else its current value.
    pub fn original_value(&self, name: &str) -> Option<&Value> {
        self.originals.get(name).or_else(|| self.values.get(name))
    }

    /// The record as last known to be persisted: current values overlaid
    /// with captured originals.
    pub fn original_values(&self) -> BTreeMap<String, Value> {
        let mut values = self.values.clone();
        for (name, original) in &self.originals {
            values.insert(name.clone(), original.clone());
        }
        values
    }

    /// Columns captured with an original value this session.
    pub fn captured_originals(&self) -> &BTreeMap<String, Value> {
        &self.originals
    }

    pub fn is_changed(&self) -> bool {
        !self.changed.is_empty()
    }

    pub fn is_column_changed(&self, name: &str) -> bool {
        self.changed.contains(name)
    }

    pub fn changed_columns(&self) -> &BTreeSet<String> {
        &self.changed
    }

    /// Changed columns paired with their current values.
    pub fn dirty_columns(&self) -> BTreeMap<String, Value> {
        self.changed
            .iter()
            .map(|name| {
                let value = self.values.get(name).cloned().unwrap_or(Value::Null);
                (name.clone(), value)
            })
            .collect()
    }

    pub fn clear_session_state(&mut self) {
        self.changed.clear();
        self.originals.clear();
    }

    /// Replaces every current value with a freshly loaded baseline.
    pub(crate) fn rebase<I, K>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.values = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.clear_session_state();
    }
}
