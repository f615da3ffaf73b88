// SQLite backend
//
// - config: bb8 connection manager and the blocking-worker bridge
// - params: RowValues -> rusqlite value conversion
// - query: row materialization
// - executor: select / dml / ping round trips

pub mod config;
pub(crate) mod executor;
pub mod params;
pub(crate) mod query;

pub use config::{SharedSqliteConnection, SqliteManager};
