use std::fmt;
use std::time::Duration;

use serde_json::{Map, Value};

/// Untyped configuration as handed over by the mapping engine.
pub type ConfigMap = Map<String, Value>;

pub const CONFIG_HOST: &str = "host";
pub const CONFIG_PORT: &str = "port";
pub const CONFIG_USER: &str = "user";
pub const CONFIG_PASSWORD: &str = "password";
pub const CONFIG_DATABASE: &str = "database";
pub const CONFIG_SSL: &str = "ssl";
pub const CONFIG_MAX_CONN: &str = "max_connections";
pub const CONFIG_MAX_IDLE: &str = "max_idle";
pub const CONFIG_CONN_AGE: &str = "conn_max_age_seconds";

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: i64 = 3306;
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_SSL: &str = "false";
pub const DEFAULT_MAX_CONN: i64 = 10;
pub const DEFAULT_MAX_IDLE: i64 = 5;
pub const DEFAULT_CONN_AGE_SECS: i64 = 3600;

/// Read a string value, falling back to `default` when absent or not a string.
#[must_use]
pub fn get_string(config: &ConfigMap, key: &str, default: &str) -> String {
    match config.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => default.to_string(),
    }
}

/// Read an integer value, falling back to `default` when absent or not numeric.
///
/// Floating-point values are accepted and truncated toward zero.
#[must_use]
pub fn get_int(config: &ConfigMap, key: &str, default: i64) -> i64 {
    match config.get(key) {
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(f) = n.as_f64() {
                #[allow(clippy::cast_possible_truncation)]
                let truncated = f.trunc() as i64;
                truncated
            } else {
                default
            }
        }
        _ => default,
    }
}

/// TLS request passed to the driver. Negotiation details belong to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslMode {
    Disabled,
    Required,
    /// Encrypt but accept any server certificate.
    SkipVerify,
}

impl SslMode {
    /// Interpret the `ssl` config string. Unknown values disable TLS.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "true" | "required" | "require" | "preferred" => SslMode::Required,
            "skip-verify" | "skip_verify" => SslMode::SkipVerify,
            _ => SslMode::Disabled,
        }
    }
}

/// Typed connection settings owned by one adapter instance.
#[derive(Clone, PartialEq)]
pub struct AdapterConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Schema name for `MySQL`; file path or URI for `SQLite`.
    pub database: String,
    pub ssl: SslMode,
    pub max_connections: u32,
    pub max_idle: u32,
    pub conn_max_age: Duration,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self::from_map(&ConfigMap::new())
    }
}

impl AdapterConfig {
    /// Extract settings from an untyped map.
    ///
    /// Never fails: missing or mistyped values take their defaults, and out-of-range numbers
    /// are clamped. A bad setting surfaces later as a connection failure.
    #[must_use]
    pub fn from_map(config: &ConfigMap) -> Self {
        let port = get_int(config, CONFIG_PORT, DEFAULT_PORT);
        let max_connections = get_int(config, CONFIG_MAX_CONN, DEFAULT_MAX_CONN);
        let max_idle = get_int(config, CONFIG_MAX_IDLE, DEFAULT_MAX_IDLE);
        let conn_age = get_int(config, CONFIG_CONN_AGE, DEFAULT_CONN_AGE_SECS);

        Self {
            host: get_string(config, CONFIG_HOST, DEFAULT_HOST),
            port: u16::try_from(port).unwrap_or(u16::MAX),
            user: get_string(config, CONFIG_USER, DEFAULT_USER),
            password: get_string(config, CONFIG_PASSWORD, ""),
            database: get_string(config, CONFIG_DATABASE, ""),
            ssl: SslMode::parse(&get_string(config, CONFIG_SSL, DEFAULT_SSL)),
            max_connections: u32::try_from(max_connections.max(1)).unwrap_or(u32::MAX),
            max_idle: u32::try_from(max_idle.max(0)).unwrap_or(u32::MAX),
            conn_max_age: Duration::from_secs(u64::try_from(conn_age.max(0)).unwrap_or(0)),
        }
    }

    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Idle connections the pool keeps warm; never more than the pool size.
    #[must_use]
    pub fn effective_max_idle(&self) -> u32 {
        self.max_idle.min(self.max_connections)
    }

    /// Connection URL with the password masked, for logs.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        let pass = if self.password.is_empty() { "" } else { ":***" };
        format!(
            "mysql://{}{}@{}:{}/{}?ssl={:?}",
            self.user, pass, self.host, self.port, self.database, self.ssl
        )
    }
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("ssl", &self.ssl)
            .field("max_connections", &self.max_connections)
            .field("max_idle", &self.max_idle)
            .field("conn_max_age", &self.conn_max_age)
            .finish()
    }
}
