#![cfg(feature = "sqlite")]

mod common;

use common::{count_users, insert_op, params, sqlite_users, user};
use datamapper_sql::prelude::*;

#[test]
fn bulk_insert_adds_every_row() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let (adapter, _dir) = sqlite_users().await?;
        let ctx = CallContext::background();
        let op = insert_op().bulk(true);

        let mut batch: Vec<Record> = (0..25)
            .map(|i| user(&format!("user{i}"), &format!("user{i}@example.com")))
            .collect();
        adapter.insert(&ctx, &op, &mut batch).await?;
        assert_eq!(count_users(&adapter).await?, 25);
        // Generated ids are only written back for single-row inserts.
        assert!(batch.iter().all(|r| r.get("ID").is_none()));

        let fetch = Operation::new("SELECT name FROM users WHERE email = {email}");
        let rows = adapter
            .fetch(
                &ctx,
                &fetch,
                &params(&[("email", RowValues::Text("user24@example.com".into()))]),
            )
            .await?;
        assert_eq!(rows[0].get("name").and_then(RowValues::as_text), Some("user24"));

        // A single object in bulk mode goes through the regular path.
        let mut one = vec![user("solo", "solo@example.com")];
        adapter.insert(&ctx, &op, &mut one).await?;
        assert!(one[0].get("ID").is_some());

        let mut empty: Vec<Record> = Vec::new();
        adapter.insert(&ctx, &op, &mut empty).await?;
        assert_eq!(count_users(&adapter).await?, 26);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn bulk_insert_rejects_mismatched_objects() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let (adapter, _dir) = sqlite_users().await?;
        let ctx = CallContext::background();

        let mut batch = vec![
            user("a", "a@example.com"),
            Record::new().with("Name", "b"),
        ];
        let err = adapter
            .insert(&ctx, &insert_op().bulk(true), &mut batch)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(count_users(&adapter).await?, 0);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn execute_returns_rows_or_affected_count() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let (adapter, _dir) = sqlite_users().await?;
        let ctx = CallContext::background();

        let mut batch = vec![
            user("x", "x@example.com"),
            user("y", "y@example.com"),
            user("z", "z@example.com"),
        ];
        adapter
            .insert(&ctx, &insert_op().bulk(true), &mut batch)
            .await?;

        let bump = Action::new("UPDATE users SET version = version + {step} WHERE name <> {skip}");
        let outcome = adapter
            .execute(
                &ctx,
                &bump,
                &params(&[("step", RowValues::Int(2)), ("skip", RowValues::Text("z".into()))]),
            )
            .await?;
        assert_eq!(outcome, ExecuteOutcome::Affected(2));
        let records = outcome.into_records();
        assert_eq!(records[0].get("rows_affected"), Some(&RowValues::Int(2)));

        let report = Action::new(
            "SELECT name, version FROM users WHERE version > {min} ORDER BY name",
        )
        .with_result("VersionReport");
        let outcome = adapter
            .execute(&ctx, &report, &params(&[("min", RowValues::Int(1))]))
            .await?;
        let ExecuteOutcome::Rows(rows) = outcome else {
            panic!("expected rows");
        };
        let names: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.get("name").and_then(RowValues::as_text))
            .collect();
        assert_eq!(names, ["x", "y"]);
        assert_eq!(rows[0].get("version"), Some(&RowValues::Int(3)));

        // An empty result is still a valid row outcome.
        let none = Action::new("SELECT * FROM users WHERE 1 = 0").with_result("Empty");
        let outcome = adapter.execute(&ctx, &none, &Params::new()).await?;
        assert_eq!(outcome, ExecuteOutcome::Rows(Vec::new()));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn backend_errors_carry_operation_and_stage() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let (adapter, _dir) = sqlite_users().await?;
        let ctx = CallContext::background();

        let err = adapter
            .fetch(&ctx, &Operation::new("SELECT * FROM missing_table"), &Params::new())
            .await
            .unwrap_err();
        match &err {
            SqlAdapterError::ExecutionError { op, stage, .. } => {
                assert_eq!(*op, OpKind::Fetch);
                assert_eq!(*stage, Stage::Prepare);
            }
            other => panic!("expected execution error, got {other:?}"),
        }
        assert!(err.to_string().contains("fetch"));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn execute_counts_changes_for_row_producing_statements() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let (adapter, _dir) = sqlite_users().await?;
        let ctx = CallContext::background();

        let outcome = adapter
            .execute(&ctx, &Action::new("SELECT 1"), &Params::new())
            .await?;
        assert_eq!(outcome, ExecuteOutcome::Affected(0));

        let returning = Action::new("INSERT INTO users (name, email) VALUES ({name}, {email}) RETURNING id");
        let outcome = adapter
            .execute(
                &ctx,
                &returning,
                &params(&[
                    ("name", RowValues::Text("Ret".into())),
                    ("email", RowValues::Text("ret@example.com".into())),
                ]),
            )
            .await?;
        assert_eq!(outcome, ExecuteOutcome::Affected(1));
        assert_eq!(count_users(&adapter).await?, 1);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn bare_double_dash_comment_hides_placeholder() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let (adapter, _dir) = sqlite_users().await?;
        let ctx = CallContext::background();
        adapter
            .insert(&ctx, &insert_op(), &mut vec![user("John", "john@example.com")])
            .await?;

        let fetch = Operation::new("SELECT * FROM users --{id}\n WHERE 1=1");
        let rows = adapter
            .fetch(&ctx, &fetch, &params(&[("id", RowValues::Int(1))]))
            .await?;
        assert_eq!(rows.len(), 1);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn ignored_insert_does_not_reuse_previous_id() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let (adapter, _dir) = sqlite_users().await?;
        let ctx = CallContext::background();
        adapter
            .execute(
                &ctx,
                &Action::new(
                    "CREATE TRIGGER skip_blocked BEFORE INSERT ON users
                     WHEN NEW.name = 'blocked'
                     BEGIN SELECT RAISE(IGNORE); END",
                ),
                &Params::new(),
            )
            .await?;

        let mut kept = vec![user("kept", "kept@example.com")];
        adapter.insert(&ctx, &insert_op(), &mut kept).await?;
        assert_eq!(kept[0].get("ID"), Some(&RowValues::Int(1)));

        let mut skipped = vec![user("blocked", "blocked@example.com")];
        adapter.insert(&ctx, &insert_op(), &mut skipped).await?;
        assert_eq!(skipped[0].get("ID"), Some(&RowValues::Int(0)));
        assert_eq!(count_users(&adapter).await?, 1);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
