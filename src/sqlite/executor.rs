use crate::error::{Stage, StageError};
use crate::results::{DmlOutcome, ResultSet};
use crate::types::RowValues;

use super::config::{SharedSqliteConnection, run_blocking};
use super::params::Params;
use super::query::build_result_set;

/// Prepare and run a row-producing statement.
///
/// # Errors
/// Returns a stage-tagged error from preparation, execution or row reading.
pub(crate) async fn select(
    conn: SharedSqliteConnection,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, StageError> {
    let sql_owned = query.to_owned();
    let converted = Params::convert(params);
    run_blocking(conn, move |guard| {
        let mut stmt = guard
            .prepare(&sql_owned)
            .map_err(|e| StageError::new(Stage::Prepare, e))?;
        build_result_set(&mut stmt, &converted.0)
    })
    .await
}

/// Execute a write statement and report rows affected and the last inserted rowid.
///
/// # Errors
/// Returns a stage-tagged error from preparation or execution.
pub(crate) async fn dml(
    conn: SharedSqliteConnection,
    query: &str,
    params: &[RowValues],
) -> Result<DmlOutcome, StageError> {
    let sql_owned = query.to_owned();
    let converted = Params::convert(params);
    run_blocking(conn, move |guard| {
        let mut stmt = guard
            .prepare_cached(&sql_owned)
            .map_err(|e| StageError::new(Stage::Prepare, e))?;
        let affected = if stmt.column_count() == 0 {
            let n = stmt
                .execute(&converted.as_refs()[..])
                .map_err(|e| StageError::new(Stage::Execute, e))?;
            u64::try_from(n).unwrap_or(u64::MAX)
        } else {
            // Row-producing statement run for its side effects: drain and count changes.
            let before = total_changes(guard)?;
            let mut rows = stmt
                .query(&converted.as_refs()[..])
                .map_err(|e| StageError::new(Stage::Execute, e))?;
            while rows
                .next()
                .map_err(|e| StageError::new(Stage::Execute, e))?
                .is_some()
            {}
            drop(rows);
            total_changes(guard)?.saturating_sub(before)
        };
        drop(stmt);
        let rowid = guard.last_insert_rowid();
        Ok(DmlOutcome {
            rows_affected: affected,
            last_insert_id: if affected > 0 {
                u64::try_from(rowid).ok().filter(|id| *id > 0)
            } else {
                None
            },
        })
    })
    .await
}

fn total_changes(conn: &rusqlite::Connection) -> Result<u64, StageError> {
    conn.query_row("SELECT total_changes()", [], |row| row.get::<_, i64>(0))
        .map(|n| u64::try_from(n).unwrap_or(0))
        .map_err(|e| StageError::new(Stage::Execute, e))
}

/// Liveness check.
///
/// # Errors
/// Returns a ping-stage error if the trivial query fails.
pub(crate) async fn ping(conn: SharedSqliteConnection) -> Result<(), StageError> {
    run_blocking(conn, |guard| {
        guard
            .query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|e| StageError::new(Stage::Ping, e))
    })
    .await
}
