use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Row};

use crate::error::{Stage, StageError};
use crate::results::{DmlOutcome, ResultSet};
use crate::types::RowValues;

use super::params::to_mysql_params;
use super::query::build_result_set;

/// Run a row-producing statement (SELECT, or CALL with a result set).
///
/// Statements without bound values go over the text protocol, so statements the server
/// refuses to prepare still run; bound statements are prepared.
///
/// # Errors
/// Returns a stage-tagged error from preparation or execution.
pub(crate) async fn select(
    conn: &mut Conn,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, StageError> {
    if params.is_empty() {
        let rows: Vec<Row> = conn
            .query(query)
            .await
            .map_err(|e| StageError::new(Stage::Query, e))?;
        return Ok(build_result_set(rows));
    }
    let stmt = conn
        .prep(query)
        .await
        .map_err(|e| StageError::new(Stage::Prepare, e))?;
    let rows: Vec<Row> = conn
        .exec(&stmt, to_mysql_params(params))
        .await
        .map_err(|e| StageError::new(Stage::Query, e))?;
    Ok(build_result_set(rows))
}

/// Execute a write statement and report matched rows and the generated identity.
///
/// # Errors
/// Returns a stage-tagged error from preparation or execution.
pub(crate) async fn dml(
    conn: &mut Conn,
    query: &str,
    params: &[RowValues],
) -> Result<DmlOutcome, StageError> {
    if params.is_empty() {
        conn.query_drop(query)
            .await
            .map_err(|e| StageError::new(Stage::Execute, e))?;
    } else {
        let stmt = conn
            .prep(query)
            .await
            .map_err(|e| StageError::new(Stage::Prepare, e))?;
        conn.exec_drop(&stmt, to_mysql_params(params))
            .await
            .map_err(|e| StageError::new(Stage::Execute, e))?;
    }
    Ok(DmlOutcome {
        rows_affected: conn.affected_rows(),
        last_insert_id: conn.last_insert_id().filter(|id| *id > 0),
    })
}

/// Liveness check.
///
/// # Errors
/// Returns a ping-stage error if the server does not answer.
pub(crate) async fn ping(conn: &mut Conn) -> Result<(), StageError> {
    conn.ping()
        .await
        .map_err(|e| StageError::new(Stage::Ping, e))
}
