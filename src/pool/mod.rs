pub mod connection;
pub mod types;

pub use connection::PoolConnection;
pub use types::AdapterPool;
