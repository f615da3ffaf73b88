use std::future::Future;

use bb8::ManageConnection;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts, OptsBuilder, SslOpts};

use crate::config::{AdapterConfig, SslMode};

/// Translate adapter settings into driver options.
///
/// Affected-row counts are requested as *matched* rows (`CLIENT_FOUND_ROWS`), so an UPDATE
/// that rewrites identical values still counts as having found its row.
#[must_use]
pub fn build_opts(cfg: &AdapterConfig) -> Opts {
    let password = (!cfg.password.is_empty()).then(|| cfg.password.clone());
    let database = (!cfg.database.is_empty()).then(|| cfg.database.clone());

    let builder = OptsBuilder::default()
        .ip_or_hostname(cfg.host.clone())
        .tcp_port(cfg.port)
        .user(Some(cfg.user.clone()))
        .pass(password)
        .db_name(database)
        .prefer_socket(false)
        .client_found_rows(true);

    let builder = match cfg.ssl {
        SslMode::Disabled => builder.ssl_opts(None::<SslOpts>),
        SslMode::Required => builder.ssl_opts(SslOpts::default()),
        SslMode::SkipVerify => {
            builder.ssl_opts(SslOpts::default().with_danger_accept_invalid_certs(true))
        }
    };

    Opts::from(builder)
}

/// bb8 manager for `MySQL` connections.
pub struct MySqlManager {
    opts: Opts,
}

impl MySqlManager {
    #[must_use]
    pub fn new(opts: Opts) -> Self {
        Self { opts }
    }
}

impl ManageConnection for MySqlManager {
    type Connection = Conn;
    type Error = mysql_async::Error;

    #[allow(clippy::manual_async_fn)]
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let opts = self.opts.clone();
        async move { Conn::new(opts).await }
    }

    #[allow(clippy::manual_async_fn)]
    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        async move { conn.ping().await }
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}
