#![allow(dead_code)]

use datamapper_sql::prelude::*;
use tempfile::TempDir;

pub const USERS_DDL: &str = "CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT UNIQUE,
    version INTEGER NOT NULL DEFAULT 1
)";

/// A connected `SQLite` adapter over a fresh file with the `users` table created.
///
/// Keep the returned `TempDir` alive for as long as the adapter is used.
pub async fn sqlite_users() -> Result<(SqlAdapter, TempDir), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("users.db");
    let adapter = SqlAdapter::sqlite();
    let ctx = CallContext::background();
    let mut config = ConfigMap::new();
    config.insert(
        "database".into(),
        serde_json::Value::String(path.to_string_lossy().into_owned()),
    );
    config.insert("max_connections".into(), serde_json::json!(4));
    adapter.connect(&ctx, &config).await?;
    adapter
        .execute(&ctx, &Action::new(USERS_DDL), &Params::new())
        .await?;
    Ok((adapter, dir))
}

/// Insert descriptor: `id` is generated by the backend.
pub fn insert_op() -> Operation {
    Operation::new("users")
        .property("Name", "name")
        .property("Email", "email")
        .generated("ID", "id")
}

/// Update/delete descriptor keyed on `id`, with `version` as an optimistic-lock condition.
pub fn update_op() -> Operation {
    Operation::new("users")
        .property("ID", "id")
        .property("Name", "name")
        .property("Email", "email")
        .identifier("ID", "id")
        .condition("Version", "version")
}

pub fn user(name: &str, email: &str) -> Record {
    Record::new().with("Name", name).with("Email", email)
}

pub fn params(pairs: &[(&str, RowValues)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

pub async fn count_users(adapter: &SqlAdapter) -> Result<i64, SqlAdapterError> {
    let rows = adapter
        .execute(
            &CallContext::background(),
            &Action::new("SELECT COUNT(*) AS n FROM users").with_result("Count"),
            &Params::new(),
        )
        .await?
        .into_records();
    Ok(rows
        .first()
        .and_then(|r| r.get("n"))
        .and_then(RowValues::as_int)
        .copied()
        .unwrap_or(-1))
}
