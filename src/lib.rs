//! `MySQL` adapter for the datamapper object-mapping engine.
//!
//! The engine describes each action with an [`Operation`] or [`Action`] and hands the
//! adapter generic records; the adapter turns them into parameterized SQL, runs it on a
//! pooled connection and maps rows or affected counts back.
//!
//! ```rust,no_run
//! use datamapper_sql::prelude::*;
//!
//! # async fn demo() -> Result<(), SqlAdapterError> {
//! let adapter = SqlAdapter::mysql();
//! let ctx = CallContext::background();
//! let config: ConfigMap = serde_json::from_str(r#"{"host": "db", "database": "app"}"#)
//!     .map_err(|e| SqlAdapterError::ConfigError(e.to_string()))?;
//! adapter.connect(&ctx, &config).await?;
//!
//! let op = Operation::new("users")
//!     .property("Name", "name")
//!     .property("Email", "email")
//!     .generated("ID", "id");
//! let mut users = vec![Record::new().with("Name", "John").with("Email", "j@x.com")];
//! adapter.insert(&ctx, &op, &mut users).await?;
//! assert!(users[0].get("ID").is_some());
//! adapter.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Both backends are behind cargo features: `mysql` (the primary target) and `sqlite`
//! (file-backed, handy for tests and local tools). Both are on by default.

#[cfg(not(any(feature = "mysql", feature = "sqlite")))]
compile_error!("enable at least one backend feature: `mysql` or `sqlite`");

pub mod adapter;
pub mod config;
pub mod context;
pub mod crud;
pub mod error;
pub mod operation;
pub mod pool;
pub mod prelude;
pub mod record;
pub mod registry;
pub mod results;
pub mod translation;
pub mod types;

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use adapter::{Adapter, ExecuteOutcome, SqlAdapter};
pub use config::{AdapterConfig, ConfigMap, SslMode};
pub use context::CallContext;
pub use error::{ErrorKind, SqlAdapterError};
pub use operation::{Action, FieldMapping, Operation};
pub use record::{Identifier, Params, Record, RowLike};
pub use registry::AdapterRegistry;
pub use types::{BackendKind, RowValues};
