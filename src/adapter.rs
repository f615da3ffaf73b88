use std::sync::RwLock;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::{AdapterConfig, ConfigMap};
use crate::context::CallContext;
use crate::crud::{bulk_insert_statement, delete_statement, insert_statement, update_statement};
use crate::error::{OpKind, SqlAdapterError};
use crate::operation::{Action, Operation};
use crate::pool::AdapterPool;
use crate::record::{Identifier, Params, Record, RowLike};
use crate::results::{DmlOutcome, ResultSet};
use crate::translation::{BuiltStatement, build_statement};
use crate::types::{BackendKind, RowValues};

/// Result of a custom [`Action`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteOutcome {
    /// Rows produced by an action that declared a result shape.
    Rows(Vec<Record>),
    /// Rows affected by a mutation; 0 when the backend does not say.
    Affected(u64),
}

impl ExecuteOutcome {
    /// Flatten into records; a count becomes one `{"rows_affected": n}` record.
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        match self {
            ExecuteOutcome::Rows(rows) => rows,
            ExecuteOutcome::Affected(n) => {
                let n = i64::try_from(n).unwrap_or(i64::MAX);
                vec![Record::new().with("rows_affected", n)]
            }
        }
    }
}

enum ConnState {
    Idle,
    Connected(AdapterPool),
    Closed,
}

/// SQL adapter for the mapping engine.
///
/// One instance owns at most one pool for its whole life: `connect` opens it, `close`
/// releases it, and a closed adapter cannot be reconnected. All operations may be called
/// concurrently from many tasks; each round trip checks a connection out of the pool.
pub struct SqlAdapter {
    kind: BackendKind,
    state: RwLock<ConnState>,
}

impl std::fmt::Debug for SqlAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlAdapter")
            .field("kind", &self.kind)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl SqlAdapter {
    #[must_use]
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            state: RwLock::new(ConnState::Idle),
        }
    }

    #[cfg(feature = "mysql")]
    #[must_use]
    pub fn mysql() -> Self {
        Self::new(BackendKind::MySql)
    }

    #[cfg(feature = "sqlite")]
    #[must_use]
    pub fn sqlite() -> Self {
        Self::new(BackendKind::Sqlite)
    }

    /// Registration name, e.g. `"mysql"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    #[must_use]
    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(
            *self.state.read().unwrap_or_else(std::sync::PoisonError::into_inner),
            ConnState::Connected(_)
        )
    }

    /// Clone the live pool out of the state; the lock is never held across a round trip.
    fn pool(&self) -> Result<AdapterPool, SqlAdapterError> {
        let guard = self
            .state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match &*guard {
            ConnState::Connected(pool) => Ok(pool.clone()),
            ConnState::Idle | ConnState::Closed => Err(SqlAdapterError::NotConnected),
        }
    }

    /// Open the pool from an untyped config map and verify it with a ping.
    ///
    /// # Errors
    /// `ConnectionError` if the backend cannot be reached or the adapter was already
    /// connected or closed; `Cancelled`/`DeadlineExceeded` if `ctx` ends first.
    pub async fn connect(
        &self,
        ctx: &CallContext,
        config: &ConfigMap,
    ) -> Result<(), SqlAdapterError> {
        self.connect_with(ctx, AdapterConfig::from_map(config))
            .await
    }

    /// Open the pool from typed settings.
    ///
    /// # Errors
    /// See [`SqlAdapter::connect`]; additionally `ConfigError` when an `SQLite` adapter has no
    /// database path.
    pub async fn connect_with(
        &self,
        ctx: &CallContext,
        cfg: AdapterConfig,
    ) -> Result<(), SqlAdapterError> {
        {
            let guard = self
                .state
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            match &*guard {
                ConnState::Idle => {}
                ConnState::Connected(_) => {
                    return Err(SqlAdapterError::ConnectionError(
                        "adapter already connected".into(),
                    ));
                }
                ConnState::Closed => {
                    return Err(SqlAdapterError::ConnectionError(
                        "adapter has been closed".into(),
                    ));
                }
            }
        }

        #[cfg(feature = "sqlite")]
        if self.kind == BackendKind::Sqlite && cfg.database.is_empty() {
            return Err(SqlAdapterError::ConfigError(
                "sqlite backend requires a database path".into(),
            ));
        }

        let target = match self.kind {
            #[cfg(feature = "mysql")]
            BackendKind::MySql => cfg.redacted_url(),
            #[cfg(feature = "sqlite")]
            BackendKind::Sqlite => cfg.database.clone(),
        };

        let pool = AdapterPool::build(self.kind, &cfg);
        let verified = ctx
            .run(async {
                let mut conn = pool.get_connection(OpKind::Connect).await?;
                conn.ping().await.map_err(|e| e.with_op(OpKind::Connect))
            })
            .await;

        if let Err(err) = verified {
            warn!(backend = self.name(), %target, error = %err, "connect failed");
            return Err(match err {
                SqlAdapterError::Cancelled | SqlAdapterError::DeadlineExceeded => err,
                other => SqlAdapterError::ConnectionError(other.to_string()),
            });
        }

        let mut guard = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !matches!(*guard, ConnState::Idle) {
            return Err(SqlAdapterError::ConnectionError(
                "adapter state changed during connect".into(),
            ));
        }
        *guard = ConnState::Connected(pool);
        info!(
            backend = self.name(),
            %target,
            max_connections = cfg.max_connections,
            "connected"
        );
        Ok(())
    }

    /// Release the pool. Safe to call more than once.
    ///
    /// # Errors
    /// Never fails today; the `Result` is part of the adapter contract.
    pub async fn close(&self) -> Result<(), SqlAdapterError> {
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let ConnState::Connected(_) = &*guard {
            *guard = ConnState::Closed;
            info!(backend = self.name(), "closed");
        }
        Ok(())
    }

    async fn query(
        ctx: &CallContext,
        pool: &AdapterPool,
        op: OpKind,
        built: &BuiltStatement<'_>,
    ) -> Result<ResultSet, SqlAdapterError> {
        debug!(%op, sql = %built.sql, args = built.params.len(), "query");
        ctx.run(async {
            let mut conn = pool.get_connection(op).await?;
            conn.select(&built.sql, &built.params)
                .await
                .map_err(|e| e.with_op(op))
        })
        .await
    }

    async fn write(
        ctx: &CallContext,
        pool: &AdapterPool,
        op: OpKind,
        built: &BuiltStatement<'_>,
    ) -> Result<DmlOutcome, SqlAdapterError> {
        debug!(%op, sql = %built.sql, args = built.params.len(), "write");
        ctx.run(async {
            let mut conn = pool.get_connection(op).await?;
            conn.dml(&built.sql, &built.params)
                .await
                .map_err(|e| e.with_op(op))
        })
        .await
    }

    /// Run the operation's statement template and return every row.
    ///
    /// # Errors
    /// `NotFound` when no row matches and `op.multi` is false.
    pub async fn fetch(
        &self,
        ctx: &CallContext,
        op: &Operation,
        params: &Params,
    ) -> Result<Vec<Record>, SqlAdapterError> {
        let pool = self.pool()?;
        let built = build_statement(&op.statement, params, pool.placeholder_style());
        let rows = Self::query(ctx, &pool, OpKind::Fetch, &built).await?;
        if rows.is_empty() && !op.multi {
            return Err(SqlAdapterError::NotFound);
        }
        Ok(rows.into_records())
    }

    /// Insert objects in order, writing generated values back onto each one.
    ///
    /// With `op.bulk` and more than one object, the batch goes out as one multi-row
    /// statement and nothing is written back.
    ///
    /// # Errors
    /// Stops at the first failure; earlier objects stay inserted.
    pub async fn insert<R: RowLike>(
        &self,
        ctx: &CallContext,
        op: &Operation,
        objects: &mut [R],
    ) -> Result<(), SqlAdapterError> {
        let pool = self.pool()?;
        if objects.is_empty() {
            return Ok(());
        }
        let style = pool.placeholder_style();

        if op.bulk && objects.len() > 1 {
            let built = bulk_insert_statement(op, objects, style)?;
            let outcome = Self::write(ctx, &pool, OpKind::BulkInsert, &built).await?;
            debug!(table = %op.statement, rows = outcome.rows_affected, "bulk insert");
            return Ok(());
        }

        for obj in objects.iter_mut() {
            let built = insert_statement(op, &*obj, style);
            let outcome = Self::write(ctx, &pool, OpKind::Insert, &built).await?;
            if op.generated.is_empty() {
                continue;
            }
            let value = match outcome.last_insert_id {
                Some(id) => i64::try_from(id)
                    .map(RowValues::Int)
                    .unwrap_or_else(|_| RowValues::Text(id.to_string())),
                None => {
                    warn!(table = %op.statement, "backend reported no generated id");
                    RowValues::Int(0)
                }
            };
            for generated in &op.generated {
                obj.set_field(&generated.object_field, value.clone());
            }
        }
        Ok(())
    }

    /// Update objects in order, one statement each.
    ///
    /// # Errors
    /// `ValidationError` for a missing identifier field; `NotFound` when a statement matches
    /// no row (including a failed condition check).
    pub async fn update<R: RowLike + Sync>(
        &self,
        ctx: &CallContext,
        op: &Operation,
        objects: &[R],
    ) -> Result<(), SqlAdapterError> {
        let pool = self.pool()?;
        let style = pool.placeholder_style();
        for obj in objects {
            let built = update_statement(op, obj, style)?;
            let outcome = Self::write(ctx, &pool, OpKind::Update, &built).await?;
            if outcome.rows_affected == 0 {
                return Err(SqlAdapterError::NotFound);
            }
        }
        Ok(())
    }

    /// Delete one row per identifier, in order.
    ///
    /// # Errors
    /// `ValidationError` when an identifier does not fit the descriptor; `NotFound` when a
    /// statement matches no row.
    pub async fn delete(
        &self,
        ctx: &CallContext,
        op: &Operation,
        identifiers: &[Identifier],
    ) -> Result<(), SqlAdapterError> {
        let pool = self.pool()?;
        let style = pool.placeholder_style();
        for identifier in identifiers {
            let built = delete_statement(op, identifier, style)?;
            let outcome = Self::write(ctx, &pool, OpKind::Delete, &built).await?;
            if outcome.rows_affected == 0 {
                return Err(SqlAdapterError::NotFound);
            }
        }
        Ok(())
    }

    /// Run a custom statement or procedure call.
    ///
    /// An action with a declared result is run as a query; anything else as a mutation.
    ///
    /// # Errors
    /// Any backend failure as `ExecutionError`.
    pub async fn execute(
        &self,
        ctx: &CallContext,
        action: &Action,
        params: &Params,
    ) -> Result<ExecuteOutcome, SqlAdapterError> {
        let pool = self.pool()?;
        let built = build_statement(&action.statement, params, pool.placeholder_style());
        if action.returns_rows() {
            let rows = Self::query(ctx, &pool, OpKind::Execute, &built).await?;
            Ok(ExecuteOutcome::Rows(rows.into_records()))
        } else {
            let outcome = Self::write(ctx, &pool, OpKind::Execute, &built).await?;
            Ok(ExecuteOutcome::Affected(outcome.rows_affected))
        }
    }
}

/// Object-safe data-access contract used by the mapping engine.
#[async_trait]
pub trait Adapter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn connect(&self, ctx: &CallContext, config: &ConfigMap) -> Result<(), SqlAdapterError>;

    async fn close(&self) -> Result<(), SqlAdapterError>;

    async fn fetch(
        &self,
        ctx: &CallContext,
        op: &Operation,
        params: &Params,
    ) -> Result<Vec<Record>, SqlAdapterError>;

    /// Generated values are written back into `objects`.
    async fn insert(
        &self,
        ctx: &CallContext,
        op: &Operation,
        objects: &mut [Record],
    ) -> Result<(), SqlAdapterError>;

    async fn update(
        &self,
        ctx: &CallContext,
        op: &Operation,
        objects: &[Record],
    ) -> Result<(), SqlAdapterError>;

    async fn delete(
        &self,
        ctx: &CallContext,
        op: &Operation,
        identifiers: &[Identifier],
    ) -> Result<(), SqlAdapterError>;

    async fn execute(
        &self,
        ctx: &CallContext,
        action: &Action,
        params: &Params,
    ) -> Result<ExecuteOutcome, SqlAdapterError>;
}

#[async_trait]
impl Adapter for SqlAdapter {
    fn name(&self) -> &'static str {
        SqlAdapter::name(self)
    }

    async fn connect(&self, ctx: &CallContext, config: &ConfigMap) -> Result<(), SqlAdapterError> {
        SqlAdapter::connect(self, ctx, config).await
    }

    async fn close(&self) -> Result<(), SqlAdapterError> {
        SqlAdapter::close(self).await
    }

    async fn fetch(
        &self,
        ctx: &CallContext,
        op: &Operation,
        params: &Params,
    ) -> Result<Vec<Record>, SqlAdapterError> {
        SqlAdapter::fetch(self, ctx, op, params).await
    }

    async fn insert(
        &self,
        ctx: &CallContext,
        op: &Operation,
        objects: &mut [Record],
    ) -> Result<(), SqlAdapterError> {
        SqlAdapter::insert(self, ctx, op, objects).await
    }

    async fn update(
        &self,
        ctx: &CallContext,
        op: &Operation,
        objects: &[Record],
    ) -> Result<(), SqlAdapterError> {
        SqlAdapter::update(self, ctx, op, objects).await
    }

    async fn delete(
        &self,
        ctx: &CallContext,
        op: &Operation,
        identifiers: &[Identifier],
    ) -> Result<(), SqlAdapterError> {
        SqlAdapter::delete(self, ctx, op, identifiers).await
    }

    async fn execute(
        &self,
        ctx: &CallContext,
        action: &Action,
        params: &Params,
    ) -> Result<ExecuteOutcome, SqlAdapterError> {
        SqlAdapter::execute(self, ctx, action, params).await
    }
}
