//! Database module
//!
//! This module provides all database functionality for tabula, organized into:
//!
//! - **core**: storage foundation (SQLite connection, type registry, column
//!   drafts, catalog inspection)
//! - **table**: typed records, statement construction and the
//!   [`TableManager`] entry point
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/            # Foundation
//! │   ├── connection   # SQLite DatabaseConn wrapper
//! │   ├── types        # StorageType registry
//! │   ├── schema       # ColumnSpec and SchemaDraft
//! │   └── catalog      # CatalogInspector over sqlite_master
//! │
//! └── table/           # Typed record layer
//!     ├── record       # Record and its codec
//!     ├── query        # QueryBuilder and Predicate
//!     └── manager      # TableManager
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use tabula::database::{ColumnSpec, Predicate, Record, StorageType, TableManager};
//!
//! let mut manager = TableManager::new();
//! manager.create_database("school.db", false)?;
//!
//! manager.add_column(ColumnSpec::new("student_id").primary_key());
//! manager.add_column(ColumnSpec::new("name").not_null());
//! manager.add_column(ColumnSpec::new("mark").storage_type(StorageType::Int));
//! manager.create_table("STUDENTS")?;
//! manager.clean();
//!
//! let record = Record::new()
//!     .with("student_id", "1010".to_string())
//!     .with("name", "ABC".to_string())
//!     .with("mark", 10i64);
//! manager.add_record("STUDENTS", &record)?;
//!
//! let passed = manager.filter_records(
//!     "STUDENTS",
//!     &Predicate::new().field("mark", ">= 50".to_string()),
//! )?;
//! ```

pub mod core;
pub mod table;

pub use core::{
    accepts, add_column_sql, compatible_value, CatalogInspector, ColumnSpec, ConnectionOptions,
    DatabaseConn, SchemaDraft, StorageType, TableSchema, ValueKind,
};

pub use table::{
    decode_row, encode_for_insert, encode_for_update, CompareOp, Condition, ManagerState,
    Predicate, QueryBuilder, Record, Statement, TableManager,
};

/// Ensure the data directory exists
pub fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", data_dir, e))
}
