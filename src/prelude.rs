//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::adapter::{Adapter, ExecuteOutcome, SqlAdapter};
pub use crate::config::{AdapterConfig, ConfigMap, SslMode};
pub use crate::context::CallContext;
pub use crate::error::{ErrorKind, OpKind, SqlAdapterError, Stage};
pub use crate::operation::{Action, FieldMapping, Operation};
pub use crate::record::{Identifier, Params, Record, RowLike};
pub use crate::registry::AdapterRegistry;
pub use crate::translation::{BuiltStatement, PlaceholderStyle, build_statement};
pub use crate::types::{BackendKind, RowValues};

pub use tokio_util::sync::CancellationToken;
