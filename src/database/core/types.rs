//! Storage type registry
//!
//! Maps each declared column type to the kind of in-memory value that may be
//! written to it. The registry is fixed; column definitions naming any other
//! type are rejected.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Declared type of a table column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StorageType {
    #[default]
    Text,
    Int,
    Integer,
    Real,
    Blob,
}

/// Runtime kind of a record value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl StorageType {
    /// The SQL keyword used in column definitions
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Int => "INT",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Blob => "BLOB",
        }
    }
}

/// The value kind a column of the given storage type accepts
pub fn compatible_value(storage_type: StorageType) -> ValueKind {
    match storage_type {
        StorageType::Text => ValueKind::Text,
        StorageType::Int | StorageType::Integer => ValueKind::Integer,
        StorageType::Real => ValueKind::Real,
        StorageType::Blob => ValueKind::Blob,
    }
}

/// Check whether `value` may be written to a column of `storage_type`
///
/// NULL is accepted for every column; NOT NULL is enforced by the engine.
pub fn accepts(storage_type: StorageType, value: &Value) -> bool {
    let kind = ValueKind::of(value);
    kind == ValueKind::Null || kind == compatible_value(storage_type)
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Integer(_) => Self::Integer,
            Value::Real(_) => Self::Real,
            Value::Text(_) => Self::Text,
            Value::Blob(_) => Self::Blob,
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Text => "text",
            Self::Blob => "blob",
        };
        f.write_str(name)
    }
}

impl FromStr for StorageType {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TEXT" => Ok(Self::Text),
            "INT" => Ok(Self::Int),
            "INTEGER" => Ok(Self::Integer),
            "REAL" => Ok(Self::Real),
            "BLOB" => Ok(Self::Blob),
            _ => Err(TableError::UnsupportedType(s.to_string())),
        }
    }
}
