use std::time::Duration;

use bb8::{Builder, ManageConnection, Pool};

#[cfg(feature = "mysql")]
use crate::mysql::{MySqlManager, build_opts};
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteManager;

use crate::config::AdapterConfig;
use crate::error::{BackendError, OpKind, SqlAdapterError, Stage};
use crate::translation::PlaceholderStyle;
use crate::types::BackendKind;

use super::connection::PoolConnection;

/// Connection pool for database access
///
/// Wraps the bb8 pool of whichever backend the adapter was created for. Cloning is cheap
/// and shares the same underlying connections.
#[derive(Clone)]
pub enum AdapterPool {
    /// `MySQL` connection pool
    #[cfg(feature = "mysql")]
    MySql(Pool<MySqlManager>),
    /// `SQLite` connection pool
    #[cfg(feature = "sqlite")]
    Sqlite(Pool<SqliteManager>),
}

// Manual Debug implementation because the managers hold driver options
impl std::fmt::Debug for AdapterPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "mysql")]
            Self::MySql(pool) => f.debug_tuple("MySql").field(&pool.state()).finish(),
            #[cfg(feature = "sqlite")]
            Self::Sqlite(pool) => f.debug_tuple("Sqlite").field(&pool.state()).finish(),
        }
    }
}

/// Apply the sizing policy shared by every backend.
fn pool_builder<M: ManageConnection>(cfg: &AdapterConfig) -> Builder<M> {
    let max_size = cfg.max_connections.max(1);
    let lifetime = (!cfg.conn_max_age.is_zero()).then_some(cfg.conn_max_age);
    Pool::builder()
        .max_size(max_size)
        .min_idle(Some(cfg.effective_max_idle().min(max_size)))
        .max_lifetime(lifetime)
        .connection_timeout(Duration::from_secs(10))
        .retry_connection(false)
        .test_on_check_out(false)
}

impl AdapterPool {
    /// Create the pool without opening any connection yet.
    ///
    /// Connections are opened lazily; the caller verifies liveness with a checkout and
    /// [`PoolConnection::ping`].
    #[must_use]
    pub fn build(kind: BackendKind, cfg: &AdapterConfig) -> Self {
        match kind {
            #[cfg(feature = "mysql")]
            BackendKind::MySql => {
                let manager = MySqlManager::new(build_opts(cfg));
                AdapterPool::MySql(pool_builder(cfg).build_unchecked(manager))
            }
            #[cfg(feature = "sqlite")]
            BackendKind::Sqlite => {
                let manager = SqliteManager::new(cfg.database.clone());
                AdapterPool::Sqlite(pool_builder(cfg).build_unchecked(manager))
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> BackendKind {
        match self {
            #[cfg(feature = "mysql")]
            AdapterPool::MySql(_) => BackendKind::MySql,
            #[cfg(feature = "sqlite")]
            AdapterPool::Sqlite(_) => BackendKind::Sqlite,
        }
    }

    /// Marker syntax of this pool's backend.
    #[must_use]
    pub fn placeholder_style(&self) -> PlaceholderStyle {
        match self {
            #[cfg(feature = "mysql")]
            AdapterPool::MySql(_) => PlaceholderStyle::MySql,
            #[cfg(feature = "sqlite")]
            AdapterPool::Sqlite(_) => PlaceholderStyle::Sqlite,
        }
    }

    /// Check a connection out of the pool.
    ///
    /// # Errors
    /// Returns an `ExecutionError` at the checkout stage if no connection can be obtained.
    pub async fn get_connection(&self, op: OpKind) -> Result<PoolConnection, SqlAdapterError> {
        let checkout = |msg: String| {
            SqlAdapterError::execution(op, Stage::Checkout, BackendError::Pool(msg))
        };
        match self {
            #[cfg(feature = "mysql")]
            AdapterPool::MySql(pool) => pool
                .get_owned()
                .await
                .map(PoolConnection::MySql)
                .map_err(|e| checkout(format!("mysql checkout error: {e}"))),
            #[cfg(feature = "sqlite")]
            AdapterPool::Sqlite(pool) => pool
                .get_owned()
                .await
                .map(PoolConnection::Sqlite)
                .map_err(|e| checkout(format!("sqlite checkout error: {e}"))),
        }
    }
}
