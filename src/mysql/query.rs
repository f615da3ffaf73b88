use std::sync::Arc;

use mysql_async::{Row, Value};

use crate::results::ResultSet;

use super::params::mysql_value_to_row_value;

/// Materialize fetched driver rows into a `ResultSet`.
///
/// Column names are taken from the first row's metadata and shared by all rows.
pub(crate) fn build_result_set(rows: Vec<Row>) -> ResultSet {
    let mut result_set = ResultSet::with_capacity(rows.len());
    let Some(first) = rows.first() else {
        return result_set;
    };

    let columns = first.columns();
    let column_names: Vec<String> = columns
        .iter()
        .map(|c| c.name_str().into_owned())
        .collect();
    result_set.set_column_names(Arc::new(column_names));

    for mut row in rows {
        let row_values = (0..columns.len())
            .map(|i| {
                let value: Value = row.take(i).unwrap_or(Value::NULL);
                mysql_value_to_row_value(value, columns.get(i))
            })
            .collect();
        result_set.add_row_values(row_values);
    }

    result_set
}
