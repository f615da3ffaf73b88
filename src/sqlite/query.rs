use std::sync::Arc;

use rusqlite::Statement;
use rusqlite::types::Value;

use crate::error::{Stage, StageError};
use crate::results::ResultSet;
use crate::types::RowValues;

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
/// Returns a scan-stage error if the value cannot be read.
pub(crate) fn sqlite_extract_value_sync(
    row: &rusqlite::Row,
    idx: usize,
) -> Result<RowValues, StageError> {
    let value: Value = row.get(idx).map_err(|e| StageError::new(Stage::Scan, e))?;
    Ok(match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    })
}

/// Run a prepared statement and read every row into memory.
///
/// Column names are read once; any failure discards the rows read so far.
///
/// # Errors
/// Returns a query-stage error if execution fails, or a scan-stage error if a row cannot be
/// read.
pub(crate) fn build_result_set(stmt: &mut Statement, params: &[Value]) -> Result<ResultSet, StageError> {
    let param_refs: Vec<&dyn rusqlite::ToSql> =
        params.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(column_names));

    let mut rows_iter = stmt
        .query(&param_refs[..])
        .map_err(|e| StageError::new(Stage::Query, e))?;

    while let Some(row) = rows_iter
        .next()
        .map_err(|e| StageError::new(Stage::Scan, e))?
    {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value_sync(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
