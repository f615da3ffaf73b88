use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::types::RowValues;

/// Named statement parameters, keyed by placeholder name.
pub type Params = HashMap<String, RowValues>;

/// Field access by name.
///
/// The mapping engine hands the adapter anything that can read and write named fields; the
/// adapter never asks for more than this. Write-back of generated identities goes through
/// [`RowLike::set_field`].
pub trait RowLike {
    /// Value stored under `name`, if the field is present.
    fn get_field(&self, name: &str) -> Option<&RowValues>;

    /// Store `value` under `name`, overwriting or adding the field.
    fn set_field(&mut self, name: &str, value: RowValues);

    fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }
}

/// A flat, ordered mapping from column (or object field) name to value.
///
/// Rows materialized from one result set share their column list through an `Arc`, so a
/// large fetch holds the names once.
#[derive(Debug, Clone, Default)]
pub struct Record {
    column_names: Arc<Vec<String>>,
    values: Vec<RowValues>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row that shares `column_names` with its siblings in a result set.
    ///
    /// Extra values beyond the column count are dropped; missing ones are padded with
    /// [`RowValues::Null`].
    #[must_use]
    pub fn from_parts(column_names: Arc<Vec<String>>, mut values: Vec<RowValues>) -> Self {
        values.resize(column_names.len(), RowValues::Null);
        Self {
            column_names,
            values,
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<RowValues>) -> Self {
        self.set_field(name, value.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RowValues> {
        self.get_column_index(name)
            .and_then(|idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|col| col == name)
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Render the record as a JSON object, preserving column order.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.column_names == other.column_names && self.values == other.values
    }
}

impl RowLike for Record {
    fn get_field(&self, name: &str) -> Option<&RowValues> {
        self.get(name)
    }

    fn set_field(&mut self, name: &str, value: RowValues) {
        if let Some(idx) = self.get_column_index(name) {
            self.values[idx] = value;
        } else {
            Arc::make_mut(&mut self.column_names).push(name.to_string());
            self.values.push(value);
        }
    }
}

impl<K: Into<String>, V: Into<RowValues>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.set_field(&k.into(), v.into());
        }
        record
    }
}

impl RowLike for HashMap<String, RowValues> {
    fn get_field(&self, name: &str) -> Option<&RowValues> {
        self.get(name)
    }

    fn set_field(&mut self, name: &str, value: RowValues) {
        self.insert(name.to_string(), value);
    }
}

impl RowLike for BTreeMap<String, RowValues> {
    fn get_field(&self, name: &str) -> Option<&RowValues> {
        self.get(name)
    }

    fn set_field(&mut self, name: &str, value: RowValues) {
        self.insert(name.to_string(), value);
    }
}

/// One delete target: either a full key record or a bare value for single-field keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier<R = Record> {
    /// Multi-field key; every identifier field must be present.
    Fields(R),
    /// Shortcut for operations whose identifier is exactly one field.
    Scalar(RowValues),
}

impl<R> From<RowValues> for Identifier<R> {
    fn from(value: RowValues) -> Self {
        Identifier::Scalar(value)
    }
}

impl From<i64> for Identifier<Record> {
    fn from(value: i64) -> Self {
        Identifier::Scalar(RowValues::Int(value))
    }
}

impl From<Record> for Identifier<Record> {
    fn from(value: Record) -> Self {
        Identifier::Fields(value)
    }
}
