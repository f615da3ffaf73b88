use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use datamapper_sql::prelude::*;
use serde_json::Value;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run one statement through a datamapper SQL adapter")]
struct Args {
    #[arg(long, value_enum)]
    backend: BackendKind,
    /// JSON object with connection settings (host, port, user, database, ...).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides `database` from the config file.
    #[arg(long)]
    database: Option<String>,
    /// Statement template; `{name}` placeholders are bound from --param.
    #[arg(long)]
    statement: String,
    /// `name=value`; values are parsed as JSON scalars, falling back to text.
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, RowValues)>,
    /// Treat the statement as row-producing and print its rows.
    #[arg(long)]
    rows: bool,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(long)]
    verbose: bool,
}

fn parse_param(raw: &str) -> Result<(String, RowValues), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))?;
    if name.is_empty() {
        return Err(format!("empty parameter name in `{raw}`"));
    }
    let value = match serde_json::from_str::<Value>(value) {
        Ok(Value::Null) => RowValues::Null,
        Ok(Value::Bool(b)) => RowValues::Bool(b),
        Ok(Value::Number(n)) => match n.as_i64() {
            Some(i) => RowValues::Int(i),
            None => n
                .as_f64()
                .map_or_else(|| RowValues::Text(value.to_string()), RowValues::Float),
        },
        Ok(Value::String(s)) => RowValues::Text(s),
        _ => RowValues::Text(value.to_string()),
    };
    Ok((name.to_string(), value))
}

fn load_config(args: &Args) -> Result<ConfigMap, SqlAdapterError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                SqlAdapterError::ConfigError(format!("reading {}: {e}", path.display()))
            })?;
            serde_json::from_str::<ConfigMap>(&text).map_err(|e| {
                SqlAdapterError::ConfigError(format!("parsing {}: {e}", path.display()))
            })?
        }
        None => ConfigMap::new(),
    };
    if let Some(database) = &args.database {
        config.insert("database".into(), Value::String(database.clone()));
    }
    Ok(config)
}

async fn run(args: Args) -> Result<Value, SqlAdapterError> {
    let config = load_config(&args)?;
    let mut ctx = CallContext::background();
    if let Some(secs) = args.timeout_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }

    let adapter = SqlAdapter::new(args.backend);
    adapter.connect(&ctx, &config).await?;

    let params: Params = args.params.into_iter().collect();
    let mut action = Action::new(args.statement);
    if args.rows {
        action = action.with_result("rows");
    }
    let outcome = adapter.execute(&ctx, &action, &params).await;
    adapter.close().await?;

    let records = outcome?.into_records();
    Ok(Value::Array(records.iter().map(Record::to_json).collect()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();

    match run(args).await {
        Ok(json) => {
            let text = serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string());
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("sqlmap: {err}");
            ExitCode::FAILURE
        }
    }
}
