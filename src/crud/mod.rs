//! SQL generation for the CRUD operations.
//!
//! Builders here never touch a connection: they turn an [`Operation`](crate::operation::Operation)
//! and the caller's objects into a [`BuiltStatement`](crate::translation::BuiltStatement), or
//! reject the input with a `ValidationError` before any round trip happens.

mod sql;

pub use sql::{bulk_insert_statement, delete_statement, insert_statement, update_statement};
