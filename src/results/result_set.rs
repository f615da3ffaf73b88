use std::sync::Arc;

use crate::record::Record;
use crate::types::RowValues;

/// Rows materialized from one query, fully read into memory.
///
/// Column names are read from the cursor once and shared by every row.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query, in cursor order
    pub results: Vec<Record>,
    column_names: Option<Arc<Vec<String>>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            column_names: None,
        }
    }

    /// Set the column names for this result set (to be shared by all rows)
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_names = Some(column_names);
    }

    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Add a row using the shared column names. Rows added before the column names are
    /// known get an empty column list.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        let columns = self.column_names.clone().unwrap_or_default();
        self.results.push(Record::from_parts(columns, row_values));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.results
    }
}

/// What a write statement reported back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DmlOutcome {
    pub rows_affected: u64,
    /// Identity assigned by the backend to the (first) inserted row, if any.
    pub last_insert_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_share_column_names() {
        let mut rs = ResultSet::with_capacity(2);
        rs.set_column_names(Arc::new(vec!["id".into(), "name".into()]));
        rs.add_row_values(vec![RowValues::Int(1), RowValues::Text("a".into())]);
        rs.add_row_values(vec![RowValues::Int(2), RowValues::Text("b".into())]);

        assert_eq!(rs.len(), 2);
        let rows = rs.into_records();
        assert_eq!(rows[1].get("name").and_then(RowValues::as_text), Some("b"));
        assert_eq!(rows[0].column_names(), rows[1].column_names());
    }
}
