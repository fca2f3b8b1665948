pub mod config;
pub mod record;
pub mod schema;

use anyhow::{anyhow, Result};
use tabula::{StorageType, TableManager, Value};

/// Convert a key given on the command line to the type of the table's primary key
pub(crate) fn key_value(manager: &TableManager, table: &str, key: &str) -> Result<Value> {
    let primary_key = manager.get_primary_key(table)?;
    let storage_type = manager
        .get_column_type(table, &primary_key)?
        .unwrap_or_default();
    parse_key(storage_type, key)
}

/// Parse `key` as a value of `storage_type`; blob keys are given as hex
fn parse_key(storage_type: StorageType, key: &str) -> Result<Value> {
    match storage_type {
        StorageType::Int | StorageType::Integer => key
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| anyhow!("key '{}' is not an integer", key)),
        StorageType::Real => key
            .parse::<f64>()
            .map(Value::Real)
            .map_err(|_| anyhow!("key '{}' is not a number", key)),
        StorageType::Text => Ok(Value::Text(key.to_string())),
        StorageType::Blob => parse_hex(key).map(Value::Blob),
    }
}

fn parse_hex(key: &str) -> Result<Vec<u8>> {
    let digits = key
        .strip_prefix("0x")
        .or_else(|| key.strip_prefix("0X"))
        .unwrap_or(key);
    if digits.len() % 2 != 0 || !digits.is_ascii() {
        return Err(anyhow!("blob key '{}' is not a hex string", key));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| anyhow!("blob key '{}' is not a hex string", key))
        })
        .collect()
}
