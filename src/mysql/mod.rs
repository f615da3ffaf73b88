// MySQL backend
//
// - config: driver options from AdapterConfig and the bb8 connection manager
// - params: RowValues <-> mysql_async::Value conversion
// - query: row materialization
// - executor: select / dml / ping round trips

pub mod config;
pub(crate) mod executor;
pub mod params;
pub(crate) mod query;

pub use config::{MySqlManager, build_opts};
