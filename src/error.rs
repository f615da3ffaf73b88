use std::fmt;

use thiserror::Error;

/// Which adapter operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Connect,
    Fetch,
    Insert,
    BulkInsert,
    Update,
    Delete,
    Execute,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpKind::Connect => "connect",
            OpKind::Fetch => "fetch",
            OpKind::Insert => "insert",
            OpKind::BulkInsert => "bulk insert",
            OpKind::Update => "update",
            OpKind::Delete => "delete",
            OpKind::Execute => "execute",
        };
        f.write_str(s)
    }
}

/// The step of a round trip that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Checkout,
    Ping,
    Prepare,
    Query,
    Execute,
    Scan,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Checkout => "connection checkout",
            Stage::Ping => "ping",
            Stage::Prepare => "prepare",
            Stage::Query => "query",
            Stage::Execute => "execute",
            Stage::Scan => "row scan",
        };
        f.write_str(s)
    }
}

/// Raw failure reported by a driver, pool, or worker thread.
#[derive(Debug, Error)]
pub enum BackendError {
    #[cfg(feature = "mysql")]
    #[error(transparent)]
    MySql(#[from] mysql_async::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("pool error: {0}")]
    Pool(String),

    #[error("worker thread error: {0}")]
    Worker(String),
}

/// Error category, for callers that branch on the kind of failure only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotConnected,
    Connection,
    Validation,
    NotFound,
    Execution,
    Cancelled,
    DeadlineExceeded,
    Config,
}

#[derive(Debug, Error)]
pub enum SqlAdapterError {
    #[error("adapter not connected")]
    NotConnected,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("record not found")]
    NotFound,

    #[error("{op} failed during {stage}: {source}")]
    ExecutionError {
        op: OpKind,
        stage: Stage,
        #[source]
        source: BackendError,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SqlAdapterError {
    /// Wrap a driver failure with the operation and stage it happened in.
    pub fn execution(op: OpKind, stage: Stage, source: impl Into<BackendError>) -> Self {
        SqlAdapterError::ExecutionError {
            op,
            stage,
            source: source.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            SqlAdapterError::NotConnected => ErrorKind::NotConnected,
            SqlAdapterError::ConnectionError(_) => ErrorKind::Connection,
            SqlAdapterError::ValidationError(_) => ErrorKind::Validation,
            SqlAdapterError::NotFound => ErrorKind::NotFound,
            SqlAdapterError::ExecutionError { .. } => ErrorKind::Execution,
            SqlAdapterError::Cancelled => ErrorKind::Cancelled,
            SqlAdapterError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            SqlAdapterError::ConfigError(_) => ErrorKind::Config,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, SqlAdapterError::NotFound)
    }
}

/// Errors raised inside a backend executor before the adapter knows the operation kind.
/// The adapter attaches [`OpKind`] via [`StageError::with_op`].
#[derive(Debug)]
pub(crate) struct StageError {
    pub(crate) stage: Stage,
    pub(crate) source: BackendError,
}

impl StageError {
    pub(crate) fn new(stage: Stage, source: impl Into<BackendError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    pub(crate) fn with_op(self, op: OpKind) -> SqlAdapterError {
        SqlAdapterError::ExecutionError {
            op,
            stage: self.stage,
            source: self.source,
        }
    }
}
