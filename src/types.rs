use chrono::NaiveDateTime;
use clap::ValueEnum;
use clap::builder::PossibleValue;

/// Values that can be stored in a database row or used as statement parameters.
///
/// The same enum crosses the adapter boundary for every backend, so the mapping engine never
/// sees driver types:
/// ```rust
/// use datamapper_sql::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
///
/// There is no nested variant: a record built from `RowValues` is always flat.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Render the value as JSON for display purposes (CLI output, logs).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            RowValues::Int(i) => serde_json::Value::from(*i),
            RowValues::Float(f) => serde_json::Value::from(*f),
            RowValues::Text(s) => serde_json::Value::from(s.as_str()),
            RowValues::Bool(b) => serde_json::Value::from(*b),
            RowValues::Timestamp(dt) => serde_json::Value::from(dt.format("%F %T%.f").to_string()),
            RowValues::Null => serde_json::Value::Null,
            RowValues::Blob(bytes) => {
                serde_json::Value::from(bytes.iter().map(|b| u64::from(*b)).collect::<Vec<_>>())
            }
        }
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<i32> for RowValues {
    fn from(value: i32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// The relational backend an adapter talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// `MySQL` / `MariaDB`
    #[cfg(feature = "mysql")]
    MySql,
    /// `SQLite` database file
    #[cfg(feature = "sqlite")]
    Sqlite,
}

impl BackendKind {
    /// Stable lowercase adapter name used for registration and lookup.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            #[cfg(feature = "mysql")]
            BackendKind::MySql => "mysql",
            #[cfg(feature = "sqlite")]
            BackendKind::Sqlite => "sqlite",
        }
    }

    /// Parse an adapter name back into a backend kind.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            #[cfg(feature = "mysql")]
            "mysql" => Some(BackendKind::MySql),
            #[cfg(feature = "sqlite")]
            "sqlite" => Some(BackendKind::Sqlite),
            _ => None,
        }
    }
}

impl ValueEnum for BackendKind {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            #[cfg(feature = "mysql")]
            BackendKind::MySql,
            #[cfg(feature = "sqlite")]
            BackendKind::Sqlite,
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(PossibleValue::new(self.name()))
    }
}
