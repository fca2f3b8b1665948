//! Core database infrastructure
//!
//! This module provides the foundational components every table operation
//! builds on:
//! - `DatabaseConn`: SQLite connection wrapper with configuration
//! - `types`: the storage type registry
//! - `SchemaDraft` / `ColumnSpec`: staged column definitions
//! - `CatalogInspector`: table and column metadata from the catalog

mod catalog;
mod connection;
mod schema;
mod types;

pub use catalog::{CatalogInspector, TableSchema};
pub use connection::{ConnectionOptions, DatabaseConn};
pub use schema::{add_column_sql, ColumnSpec, SchemaDraft};
pub use types::{accepts, compatible_value, StorageType, ValueKind};
