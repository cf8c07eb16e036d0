use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use litemodel_core::config::OrmConfig;
use litemodel_core::{Direction, Field, FieldType, ModelDescriptor, Query, Record, Value};
use litemodel_sqlite::Store;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "litemodel")]
#[command(about = "Synchronize and query SQLite tables declared in a litemodel config")]
struct Cli {
    /// Log generated SQL and schema changes to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create missing tables and add missing columns for every model.
    Sync(StoreArgs),
    /// Show the row count of every model.
    Status(StoreArgs),
    /// Insert a new record.
    Insert(InsertArgs),
    /// Update fields of an existing record.
    Update(UpdateArgs),
    /// Delete a record by id.
    Delete(IdArgs),
    /// Print a record by id.
    Get(IdArgs),
    /// List records, optionally filtered, ordered and paginated.
    List(ListArgs),
    /// Count records, optionally filtered.
    Count(CountArgs),
}

#[derive(Debug, Args)]
struct StoreArgs {
    /// Path to the litemodel YAML config.
    #[arg(long)]
    config: PathBuf,
    /// Database file path (overrides the config).
    #[arg(long)]
    db: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct InsertArgs {
    #[command(flatten)]
    store: StoreArgs,
    /// Model name.
    #[arg(long)]
    model: String,
    /// Field assignment as name=value (repeatable).
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    assignments: Vec<String>,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    #[command(flatten)]
    store: StoreArgs,
    /// Model name.
    #[arg(long)]
    model: String,
    /// Record id.
    #[arg(long)]
    id: i64,
    /// Field assignment as name=value (repeatable).
    #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
    assignments: Vec<String>,
}

#[derive(Debug, Args)]
struct IdArgs {
    #[command(flatten)]
    store: StoreArgs,
    /// Model name.
    #[arg(long)]
    model: String,
    /// Record id.
    #[arg(long)]
    id: i64,
}

#[derive(Debug, Args)]
struct FilterArgs {
    /// Raw SQL predicate with `?` placeholders (e.g. "age > ?").
    #[arg(long = "where", value_name = "SQL")]
    clause: Option<String>,
    /// Value bound to the next placeholder (repeatable).
    #[arg(long = "param", value_name = "VALUE", requires = "clause")]
    params: Vec<String>,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[command(flatten)]
    store: StoreArgs,
    /// Model name.
    #[arg(long)]
    model: String,
    #[command(flatten)]
    filter: FilterArgs,
    /// Ordering as column[:asc|desc].
    #[arg(long)]
    order: Option<String>,
    /// Maximum number of records.
    #[arg(long)]
    limit: Option<u64>,
    /// Number of records to skip.
    #[arg(long)]
    offset: Option<u64>,
}

#[derive(Debug, Args)]
struct CountArgs {
    #[command(flatten)]
    store: StoreArgs,
    /// Model name.
    #[arg(long)]
    model: String,
    #[command(flatten)]
    filter: FilterArgs,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Sync(args) => run_sync(args),
        Command::Status(args) => run_status(args),
        Command::Insert(args) => run_insert(args),
        Command::Update(args) => run_update(args),
        Command::Delete(args) => run_delete(args),
        Command::Get(args) => run_get(args),
        Command::List(args) => run_list(args),
        Command::Count(args) => run_count(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();
    // try_init only fails if a global subscriber is already set.
    let _ = subscriber.try_init();
}

fn run_sync(args: StoreArgs) -> Result<(), String> {
    let store = open_store(&args)?;
    for report in store.sync_reports() {
        let state = if report.created { "created" } else { "exists" };
        println!("{}: {state}", report.table);
        for column in &report.added_columns {
            println!("  added column: {column}");
        }
        for column in &report.stale_columns {
            println!("  stale column: {column}");
        }
    }
    Ok(())
}

fn run_status(args: StoreArgs) -> Result<(), String> {
    let store = open_store(&args)?;
    println!("Store Status:");
    for model in store.descriptors() {
        let count = store
            .count_records(model)
            .map_err(|e| format!("Failed to count '{}': {e}", model.name()))?;
        println!("  {} ({}): {count} rows", model.name(), model.table_name());
    }
    Ok(())
}

fn run_insert(args: InsertArgs) -> Result<(), String> {
    let store = open_store(&args.store)?;
    let model = lookup_model(&store, &args.model)?;
    let mut record = Record::new(Arc::clone(&model));
    apply_assignments(&mut record, &args.assignments)?;
    store
        .save_record(&mut record)
        .map_err(|e| format!("Insert failed: {e}"))?;
    print_json(&record_to_json(&record)?)
}

fn run_update(args: UpdateArgs) -> Result<(), String> {
    let store = open_store(&args.store)?;
    let model = lookup_model(&store, &args.model)?;
    let mut record = store
        .find_one_record(&model, args.id)
        .map_err(|e| format!("Lookup failed: {e}"))?
        .ok_or_else(|| format!("{} {} not found", model.name(), args.id))?;
    apply_assignments(&mut record, &args.assignments)?;
    store
        .save_record(&mut record)
        .map_err(|e| format!("Update failed: {e}"))?;
    print_json(&record_to_json(&record)?)
}

fn run_delete(args: IdArgs) -> Result<(), String> {
    let store = open_store(&args.store)?;
    let model = lookup_model(&store, &args.model)?;
    let mut record = Record::new(Arc::clone(&model));
    record.set_id(args.id);
    let deleted = store
        .delete_record(&record)
        .map_err(|e| format!("Delete failed: {e}"))?;
    println!("Deleted {deleted} row(s) from {}.", model.table_name());
    Ok(())
}

fn run_get(args: IdArgs) -> Result<(), String> {
    let store = open_store(&args.store)?;
    let model = lookup_model(&store, &args.model)?;
    let record = store
        .find_one_record(&model, args.id)
        .map_err(|e| format!("Lookup failed: {e}"))?
        .ok_or_else(|| format!("{} {} not found", model.name(), args.id))?;
    print_json(&record_to_json(&record)?)
}

fn run_list(args: ListArgs) -> Result<(), String> {
    let store = open_store(&args.store)?;
    let model = lookup_model(&store, &args.model)?;

    let mut query = build_filter(&args.filter);
    if let Some(order) = &args.order {
        let (column, direction) = parse_order(order)?;
        query = query.order_by(column, direction);
    }
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }
    if let Some(offset) = args.offset {
        query = query.offset(offset);
    }

    let records = store
        .find_many_records(&model, &query)
        .map_err(|e| format!("Query failed: {e}"))?;
    let rows = records
        .iter()
        .map(record_to_json)
        .collect::<Result<Vec<_>, _>>()?;
    print_json(&serde_json::Value::Array(rows))
}

fn run_count(args: CountArgs) -> Result<(), String> {
    let store = open_store(&args.store)?;
    let model = lookup_model(&store, &args.model)?;
    let query = build_filter(&args.filter);
    let count = store
        .count_records_by(&model, &query)
        .map_err(|e| format!("Count failed: {e}"))?;
    println!("{count}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_store(args: &StoreArgs) -> Result<Store, String> {
    let config = OrmConfig::load(&args.config)
        .map_err(|e| format!("Failed to load config '{}': {e}", args.config.display()))?;
    debug!(models = config.models.len(), "loaded config");
    Store::from_config(&config, args.db.as_deref())
        .map_err(|e| format!("Failed to open store: {e}"))
}

fn lookup_model(store: &Store, name: &str) -> Result<Arc<ModelDescriptor>, String> {
    store.descriptor(name).map_err(|e| e.to_string())
}

/// Applies `field=value` assignments, parsing each value by the field's type.
fn apply_assignments(record: &mut Record, assignments: &[String]) -> Result<(), String> {
    let descriptor = Arc::clone(record.descriptor());
    for assignment in assignments {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| format!("Invalid assignment '{assignment}': expected FIELD=VALUE"))?;
        let field = descriptor
            .field(name)
            .ok_or_else(|| format!("Model '{}' has no field '{name}'", descriptor.name()))?;
        let value = parse_field_value(field, raw)?;
        record.set(name, value).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Parses a command-line value for a typed field.
///
/// `null` is accepted for string fields.
fn parse_field_value(field: &Field, raw: &str) -> Result<Value, String> {
    match field.field_type {
        FieldType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Value::Boolean(true)),
            "false" | "0" => Ok(Value::Boolean(false)),
            _ => Err(format!("Field '{}' expects true or false, got '{raw}'", field.name)),
        },
        FieldType::Integer => raw
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| format!("Field '{}' expects an integer, got '{raw}'", field.name)),
        FieldType::String if raw == "null" => Ok(Value::Null),
        FieldType::String => Ok(Value::from(raw)),
    }
}

/// Parses an untyped filter parameter: booleans, integers, `null`, else text.
fn parse_param(raw: &str) -> Value {
    match raw {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        "null" => Value::Null,
        _ => raw
            .parse::<i64>()
            .map_or_else(|_| Value::from(raw), Value::Integer),
    }
}

fn build_filter(args: &FilterArgs) -> Query {
    match &args.clause {
        Some(clause) => Query::new().filter(clause.as_str(), args.params.iter().map(|p| parse_param(p))),
        None => Query::new(),
    }
}

fn parse_order(raw: &str) -> Result<(String, Direction), String> {
    match raw.split_once(':') {
        Some((column, direction)) => Ok((column.to_string(), direction.parse()?)),
        None => Ok((raw.to_string(), Direction::Asc)),
    }
}

fn record_to_json(record: &Record) -> Result<serde_json::Value, String> {
    let mut object = serde_json::Map::new();
    object.insert("id".to_string(), serde_json::Value::from(record.id()));
    for (field, value) in record.descriptor().fields().iter().zip(record.values()) {
        let value =
            serde_json::to_value(value).map_err(|e| format!("JSON serialization failed: {e}"))?;
        object.insert(field.name.clone(), value);
    }
    Ok(serde_json::Value::Object(object))
}

fn print_json(value: &serde_json::Value) -> Result<(), String> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))?;
    println!("{text}");
    Ok(())
}
