use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;
use tabula::output::format_records;
use tabula::{ColumnSpec, OutputFormat, Record, TableManager};

/// Arguments for the Init command
#[derive(Args)]
pub struct InitArgs {
    /// Delete and recreate the database if it already exists
    #[clap(long)]
    pub replace: bool,
}

/// Arguments for the CreateTable command
#[derive(Args)]
pub struct CreateTableArgs {
    /// Table name
    pub table: String,

    /// Column definition as name[:TYPE][:pk][:notnull], repeatable, e.g. student_id:TEXT:pk
    #[clap(short, long = "column", required = true)]
    pub columns: Vec<String>,
}

/// Arguments for the AddColumn command
#[derive(Args)]
pub struct AddColumnArgs {
    /// Table name
    pub table: String,

    /// Column definition as name[:TYPE][:notnull]; primary keys are rejected
    pub column: String,
}

#[derive(Debug, Serialize)]
struct ColumnInfo {
    name: String,
    storage_type: String,
    primary_key: bool,
}

pub fn run_init(manager: &mut TableManager, db_path: &str, args: InitArgs) {
    let InitArgs { replace } = args;

    if let Some(parent) = std::path::Path::new(db_path).parent() {
        let parent = parent.to_string_lossy();
        if !parent.is_empty() {
            if let Err(e) = tabula::database::ensure_data_dir(&parent) {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }
        }
    }

    match manager.create_database(db_path, replace) {
        Ok(()) => println!("Database created at {}", db_path),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = manager.close() {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}

pub fn run_tables(manager: &TableManager, output_format: OutputFormat) -> Result<()> {
    let tables = manager.all_tables()?;

    if output_format.is_json() {
        println!("{}", serde_json::to_string(&tables)?);
    } else {
        for table in tables {
            println!("{}", table);
        }
    }
    Ok(())
}

pub fn run_columns(
    manager: &TableManager,
    table: &str,
    output_format: OutputFormat,
) -> Result<()> {
    let schema = manager.get_all_column_types(table)?;
    let primary_key = manager.get_primary_key(table).ok();

    let columns: Vec<ColumnInfo> = schema
        .iter()
        .map(|(name, storage_type)| ColumnInfo {
            name: name.to_string(),
            storage_type: storage_type.to_string(),
            primary_key: primary_key.as_deref() == Some(name),
        })
        .collect();

    if output_format.is_json() {
        println!("{}", serde_json::to_string_pretty(&columns)?);
        return Ok(());
    }

    // Reuse the record renderer so every format lines up with record output
    let header = vec![
        "name".to_string(),
        "type".to_string(),
        "primary_key".to_string(),
    ];
    let rows: Vec<Record> = columns
        .into_iter()
        .map(|c| {
            Record::new()
                .with("name", c.name)
                .with("type", c.storage_type)
                .with("primary_key", if c.primary_key { "yes" } else { "" }.to_string())
        })
        .collect();
    println!("{}", format_records(&header, &rows, output_format));
    Ok(())
}

pub fn run_create_table(manager: &mut TableManager, args: CreateTableArgs) -> Result<()> {
    let CreateTableArgs { table, columns } = args;

    manager.clean();
    for column in &columns {
        manager.add_column(parse_column(column)?);
    }
    manager.create_table(&table)?;
    manager.clean();

    println!("Table {} created with {} columns", table, columns.len());
    Ok(())
}

pub fn run_add_column(manager: &TableManager, args: AddColumnArgs) -> Result<()> {
    let AddColumnArgs { table, column } = args;

    let spec = parse_column(&column)?;
    if spec.primary_key {
        return Err(anyhow!(
            "column '{}': a primary key cannot be added to an existing table",
            spec.name
        ));
    }
    manager.add_column_to(&table, &spec)?;
    println!("Column {} added to {}", spec.name, table);
    Ok(())
}

pub fn run_drop_table(manager: &TableManager, table: &str) -> Result<()> {
    manager.delete_table(table)?;
    println!("Table {} dropped", table);
    Ok(())
}

/// Parse `name[:TYPE][:pk][:notnull]` into a column spec
fn parse_column(definition: &str) -> Result<ColumnSpec> {
    let mut parts = definition.split(':');
    let name = parts.next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(anyhow!("column definition '{}' has no name", definition));
    }

    let mut spec = ColumnSpec::new(name);
    for part in parts.map(str::trim).filter(|p| !p.is_empty()) {
        spec = match part.to_lowercase().as_str() {
            "pk" | "primary_key" => spec.primary_key(),
            "notnull" | "not_null" => spec.not_null(),
            _ => spec.type_name(part)?,
        };
    }
    Ok(spec)
}
