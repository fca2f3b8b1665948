//! Output formatting for records
//!
//! Shared by the CLI commands: a unified [`OutputFormat`], conversions between
//! record values and JSON, and rendering a list of records in any format.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::database::Record;

/// Default maximum length for a cell in table output
pub const DEFAULT_CELL_MAX_LEN: usize = 40;

/// Unified output format for all commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty table with borders (default)
    #[default]
    Table,
    /// Markdown table format
    Markdown,
    /// Compact JSON (single line)
    Json,
    /// Pretty-printed JSON with indentation
    JsonPretty,
    /// JSON Lines format (one JSON object per line)
    JsonLine,
    /// Pipe-separated values with header
    Psv,
}

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty | Self::JsonLine)
    }

    /// Get a list of all format names for help text
    pub fn all_names() -> &'static [&'static str] {
        &[
            "table",
            "markdown",
            "json",
            "json-pretty",
            "json-line",
            "psv",
        ]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
            Self::JsonPretty => write!(f, "json-pretty"),
            Self::JsonLine => write!(f, "json-line"),
            Self::Psv => write!(f, "psv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "pretty" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "json-pretty" | "jsonpretty" => Ok(Self::JsonPretty),
            "json-line" | "jsonline" | "jsonl" | "ndjson" => Ok(Self::JsonLine),
            "psv" | "pipe" => Ok(Self::Psv),
            _ => Err(format!(
                "Unknown output format '{}'. Valid formats: {}",
                s,
                Self::all_names().join(", ")
            )),
        }
    }
}

/// Convert a stored value to JSON; blobs become arrays of bytes
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(n) => serde_json::Value::from(*n),
        Value::Real(r) => serde_json::Value::from(*r),
        Value::Text(s) => serde_json::Value::from(s.as_str()),
        Value::Blob(bytes) => serde_json::Value::from(bytes.clone()),
    }
}

/// Convert a JSON scalar to a storable value
pub fn json_to_value(json: &serde_json::Value) -> Result<Value> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Integer(i)),
            None => n
                .as_f64()
                .map(Value::Real)
                .ok_or_else(|| anyhow!("number out of range: {}", n)),
        },
        other => Err(anyhow!("unsupported JSON value: {}", other)),
    }
}

/// Build a record from a flat JSON object of scalars
pub fn record_from_json(json: &serde_json::Value) -> Result<Record> {
    let object = json
        .as_object()
        .ok_or_else(|| anyhow!("expected a JSON object, got: {}", json))?;

    let mut record = Record::new();
    for (column, value) in object {
        record.insert(column.as_str(), json_to_value(value)?);
    }
    Ok(record)
}

pub fn record_to_json(record: &Record) -> serde_json::Value {
    let object: serde_json::Map<String, serde_json::Value> = record
        .iter()
        .map(|(column, value)| (column.to_string(), value_to_json(value)))
        .collect();
    serde_json::Value::Object(object)
}

/// Plain-text rendering of a value for tables and PSV
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(n) => n.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(bytes) => format!("<{} bytes>", bytes.len()),
    }
}

/// Truncate a string to the specified length, adding "..." if truncated
pub fn truncate_cell(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Render `records` with the given column header in `format`
pub fn format_records(columns: &[String], records: &[Record], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = records.iter().map(record_to_json).collect();
            serde_json::to_string(&rows).unwrap_or_default()
        }
        OutputFormat::JsonPretty => {
            let rows: Vec<serde_json::Value> = records.iter().map(record_to_json).collect();
            serde_json::to_string_pretty(&rows).unwrap_or_default()
        }
        OutputFormat::JsonLine => records
            .iter()
            .map(|r| record_to_json(r).to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Psv => format_psv(columns, records),
        #[cfg(feature = "display")]
        OutputFormat::Table | OutputFormat::Markdown => {
            use tabled::builder::Builder;
            use tabled::settings::Style;

            let mut builder = Builder::default();
            builder.push_record(columns.iter().cloned());
            for record in records {
                builder.push_record(columns.iter().map(|c| {
                    let text = record.get(c).map(value_to_string).unwrap_or_default();
                    truncate_cell(&text, DEFAULT_CELL_MAX_LEN)
                }));
            }

            let mut table = builder.build();
            if format == OutputFormat::Markdown {
                table.with(Style::markdown());
            } else {
                table.with(Style::rounded());
            }
            table.to_string()
        }
        #[cfg(not(feature = "display"))]
        OutputFormat::Table | OutputFormat::Markdown => format_psv(columns, records),
    }
}

fn format_psv(columns: &[String], records: &[Record]) -> String {
    let mut output = columns.join("|");
    for record in records {
        output.push('\n');
        let cells: Vec<String> = columns
            .iter()
            .map(|c| record.get(c).map(value_to_string).unwrap_or_default())
            .collect();
        output.push_str(&cells.join("|"));
    }
    output
}
