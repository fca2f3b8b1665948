use anyhow::{anyhow, Result};
use clap::Args;
use tabula::output::{format_records, json_to_value, record_from_json};
use tabula::{OutputFormat, Predicate, TableManager};

use super::key_value;

/// Arguments for the Insert command
#[derive(Args)]
pub struct RecordArgs {
    /// Table name
    pub table: String,

    /// Record as a JSON object, e.g. '{"student_id": "1010", "mark": 10}'
    pub record: String,
}

/// Arguments for the Get and Delete commands
#[derive(Args)]
pub struct KeyArgs {
    /// Table name
    pub table: String,

    /// Primary key value
    pub key: String,
}

/// Arguments for the Update command
#[derive(Args)]
pub struct UpdateArgs {
    /// Table name
    pub table: String,

    /// Primary key value
    pub key: String,

    /// Fields to set as a JSON object
    pub record: String,
}

/// Arguments for the Filter command
#[derive(Args)]
pub struct FilterArgs {
    /// Table name
    pub table: String,

    /// Predicate as a JSON object; string values containing > < ! = are
    /// used as comparison fragments, e.g. '{"mark": "<= 100"}'
    pub predicate: String,
}

pub fn run_insert(manager: &TableManager, args: RecordArgs) -> Result<()> {
    let RecordArgs { table, record } = args;

    let json: serde_json::Value = serde_json::from_str(&record)?;
    manager.add_record(&table, &record_from_json(&json)?)?;
    println!("Record added to {}", table);
    Ok(())
}

pub fn run_get(manager: &TableManager, args: KeyArgs, output_format: OutputFormat) -> Result<()> {
    let KeyArgs { table, key } = args;

    let key = key_value(manager, &table, &key)?;
    let columns = manager.get_columns(&table)?;
    let records: Vec<_> = manager.get_record(&table, key)?.into_iter().collect();

    if records.is_empty() && !output_format.is_json() {
        println!("No record found");
        return Ok(());
    }
    println!("{}", format_records(&columns, &records, output_format));
    Ok(())
}

pub fn run_update(manager: &TableManager, args: UpdateArgs) -> Result<()> {
    let UpdateArgs { table, key, record } = args;

    let key = key_value(manager, &table, &key)?;
    let json: serde_json::Value = serde_json::from_str(&record)?;
    let changed = manager.update_record(&table, key, &record_from_json(&json)?)?;
    println!("{} record(s) updated", changed);
    Ok(())
}

pub fn run_delete(manager: &TableManager, args: KeyArgs) -> Result<()> {
    let KeyArgs { table, key } = args;

    let key = key_value(manager, &table, &key)?;
    let removed = manager.delete_record(&table, key)?;
    println!("{} record(s) deleted", removed);
    Ok(())
}

pub fn run_filter(
    manager: &TableManager,
    args: FilterArgs,
    output_format: OutputFormat,
) -> Result<()> {
    let FilterArgs { table, predicate } = args;

    let json: serde_json::Value = serde_json::from_str(&predicate)?;
    let object = json
        .as_object()
        .ok_or_else(|| anyhow!("predicate must be a JSON object"))?;

    let mut filter = Predicate::new();
    for (column, value) in object {
        filter = filter.field(column.as_str(), json_to_value(value)?);
    }

    let columns = manager.get_columns(&table)?;
    let records = manager.filter_records(&table, &filter)?;
    println!("{}", format_records(&columns, &records, output_format));
    Ok(())
}

pub fn run_dump(manager: &TableManager, table: &str, output_format: OutputFormat) -> Result<()> {
    let columns = manager.get_columns(table)?;
    let records = manager.get_all_records(table)?;
    println!("{}", format_records(&columns, &records, output_format));
    Ok(())
}
