//! Declarative descriptions of mapping actions.
//!
//! Descriptors are built once by the mapping engine's configuration loader and only read
//! by the adapter. They deserialize from the engine's YAML/JSON source definitions:
//! ```rust
//! use datamapper_sql::prelude::*;
//!
//! let op: Operation = serde_json::from_str(r#"{
//!     "statement": "users",
//!     "properties": [
//!         {"object": "Name", "field": "name"},
//!         {"object": "Email", "field": "email"}
//!     ],
//!     "generated": [{"object": "ID", "field": "id"}]
//! }"#).unwrap();
//! assert!(op.is_generated("id"));
//! assert!(!op.multi);
//! ```

use serde::{Deserialize, Serialize};

/// Pairs an object field with the data (column) field it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(rename = "object")]
    pub object_field: String,
    #[serde(rename = "field")]
    pub data_field: String,
}

impl FieldMapping {
    #[must_use]
    pub fn new(object_field: impl Into<String>, data_field: impl Into<String>) -> Self {
        Self {
            object_field: object_field.into(),
            data_field: data_field.into(),
        }
    }
}

/// One CRUD action against a table (or, for fetch, a statement template).
///
/// List order is significant: it fixes the column order of generated statements and the
/// order of positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Operation {
    /// Table name for insert/update/delete; statement template for fetch.
    pub statement: String,
    /// Zero-or-many results; an empty fetch is not an error.
    pub multi: bool,
    /// Batch several inserted objects into one multi-row statement.
    pub bulk: bool,
    pub properties: Vec<FieldMapping>,
    pub identifier: Vec<FieldMapping>,
    /// Extra WHERE predicates for updates, e.g. an optimistic-locking version.
    pub condition: Vec<FieldMapping>,
    /// Columns filled by the backend; never written, read back after insert.
    pub generated: Vec<FieldMapping>,
}

impl Operation {
    #[must_use]
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    #[must_use]
    pub fn bulk(mut self, bulk: bool) -> Self {
        self.bulk = bulk;
        self
    }

    #[must_use]
    pub fn property(mut self, object_field: &str, data_field: &str) -> Self {
        self.properties.push(FieldMapping::new(object_field, data_field));
        self
    }

    #[must_use]
    pub fn identifier(mut self, object_field: &str, data_field: &str) -> Self {
        self.identifier.push(FieldMapping::new(object_field, data_field));
        self
    }

    #[must_use]
    pub fn condition(mut self, object_field: &str, data_field: &str) -> Self {
        self.condition.push(FieldMapping::new(object_field, data_field));
        self
    }

    #[must_use]
    pub fn generated(mut self, object_field: &str, data_field: &str) -> Self {
        self.generated.push(FieldMapping::new(object_field, data_field));
        self
    }

    #[must_use]
    pub fn is_generated(&self, data_field: &str) -> bool {
        self.generated.iter().any(|g| g.data_field == data_field)
    }

    #[must_use]
    pub fn is_identifier(&self, data_field: &str) -> bool {
        self.identifier.iter().any(|i| i.data_field == data_field)
    }

    /// Properties that an INSERT may write: everything except generated columns.
    pub fn writable_properties(&self) -> impl Iterator<Item = &FieldMapping> {
        self.properties
            .iter()
            .filter(|p| !self.is_generated(&p.data_field))
    }

    /// Properties that an UPDATE may SET: everything except identifier columns.
    pub fn settable_properties(&self) -> impl Iterator<Item = &FieldMapping> {
        self.properties
            .iter()
            .filter(|p| !self.is_identifier(&p.data_field))
    }
}

/// A custom statement or stored-procedure call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    pub statement: String,
    /// Name of the declared result shape. When present the statement is run as a query
    /// and its rows are returned; otherwise only the affected-row count is reported.
    pub result: Option<String>,
}

impl Action {
    #[must_use]
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            result: None,
        }
    }

    #[must_use]
    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    #[must_use]
    pub fn returns_rows(&self) -> bool {
        self.result.is_some()
    }
}
