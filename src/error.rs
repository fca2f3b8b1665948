//! Error types for table and record operations
//!
//! Every failure is reported synchronously as the outcome of the call that
//! caused it; nothing in this crate retries or recovers on its own.

use std::path::PathBuf;

use thiserror::Error;

use crate::database::core::{StorageType, ValueKind};

/// Errors returned by [`TableManager`](crate::TableManager) and its components
#[derive(Debug, Error)]
pub enum TableError {
    /// Database creation was asked for on a path that already exists
    #[error("'{0}' already exists; pass replace to overwrite it")]
    AlreadyExists(PathBuf),

    /// A column was declared with a type outside the type registry
    #[error("unsupported storage type: {0}")]
    UnsupportedType(String),

    /// A table was materialized from an empty column draft
    #[error("no columns staged for table creation")]
    SchemaNotStaged,

    /// A table-scoped operation named a table absent from the catalog
    #[error("no such table: {0}")]
    NoSuchTable(String),

    /// The table declares no primary key column
    #[error("table '{0}' has no primary key")]
    NoPrimaryKey(String),

    /// A record or predicate referenced a column the table does not have
    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    /// A record value disagrees with the declared type of its column
    #[error("column '{column}' is declared {expected} but got a {actual} value")]
    TypeMismatch {
        column: String,
        expected: StorageType,
        actual: ValueKind,
    },

    /// An operation needing a connection ran before one was opened, or after close
    #[error("no open database connection")]
    NotConnected,

    /// The storage engine could not open or create the database file
    #[error("failed to open database at '{path}': {source}")]
    StorageOpen {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Any other storage engine failure
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Filesystem failure while creating or replacing a database file
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for table and record operations
pub type Result<T> = std::result::Result<T, TableError>;
