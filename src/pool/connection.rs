use std::sync::Arc;

use bb8::PooledConnection;

#[cfg(feature = "mysql")]
use crate::mysql::{self, MySqlManager};
#[cfg(feature = "sqlite")]
use crate::sqlite::{self, SqliteManager};

use crate::error::StageError;
use crate::results::{DmlOutcome, ResultSet};
use crate::types::RowValues;

/// A connection checked out of an [`AdapterPool`](super::AdapterPool).
///
/// Returned to the pool on drop.
pub enum PoolConnection {
    #[cfg(feature = "mysql")]
    MySql(PooledConnection<'static, MySqlManager>),
    #[cfg(feature = "sqlite")]
    Sqlite(PooledConnection<'static, SqliteManager>),
}

impl std::fmt::Debug for PoolConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "mysql")]
            Self::MySql(_) => f.debug_tuple("MySql").field(&"<Conn>").finish(),
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => f.debug_tuple("Sqlite").field(&"<Connection>").finish(),
        }
    }
}

impl PoolConnection {
    /// Run a row-producing statement and materialize every row.
    ///
    /// # Errors
    /// Returns a stage-tagged error from the backend.
    pub(crate) async fn select(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, StageError> {
        match self {
            #[cfg(feature = "mysql")]
            PoolConnection::MySql(conn) => mysql::executor::select(conn, query, params).await,
            #[cfg(feature = "sqlite")]
            PoolConnection::Sqlite(conn) => {
                sqlite::executor::select(Arc::clone(&**conn), query, params).await
            }
        }
    }

    /// Run a write statement.
    ///
    /// # Errors
    /// Returns a stage-tagged error from the backend.
    pub(crate) async fn dml(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<DmlOutcome, StageError> {
        match self {
            #[cfg(feature = "mysql")]
            PoolConnection::MySql(conn) => mysql::executor::dml(conn, query, params).await,
            #[cfg(feature = "sqlite")]
            PoolConnection::Sqlite(conn) => {
                sqlite::executor::dml(Arc::clone(&**conn), query, params).await
            }
        }
    }

    /// Round-trip liveness check.
    ///
    /// # Errors
    /// Returns a ping-stage error if the backend does not answer.
    pub(crate) async fn ping(&mut self) -> Result<(), StageError> {
        match self {
            #[cfg(feature = "mysql")]
            PoolConnection::MySql(conn) => mysql::executor::ping(conn).await,
            #[cfg(feature = "sqlite")]
            PoolConnection::Sqlite(conn) => sqlite::executor::ping(Arc::clone(&**conn)).await,
        }
    }
}
