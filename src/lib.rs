#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Tabula - a typed record store over embedded SQLite
//!
//! Tabula lets a caller stage column definitions, materialize tables from
//! them, and run type-checked CRUD and predicate-filtered queries without
//! writing SQL. It can be used as both a command-line application and a
//! library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (none) | Library: tables, records, queries | `rusqlite` |
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `cli` | CLI binary | All above + `clap`, `tracing-subscriber` |
//!
//! # Architecture
//!
//! - **[`database`]**: all database functionality
//!   - `core`: SQLite connection, type registry, column drafts, catalog
//!   - `table`: records, statement construction, [`TableManager`]
//! - **[`error`]**: the [`TableError`] taxonomy
//! - **[`config`]**: configuration management
//! - **[`output`]**: output formats and record/JSON conversion
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabula::{ColumnSpec, Record, StorageType, TableManager};
//!
//! let mut manager = TableManager::new();
//! manager.create_database("school.db", true)?;
//!
//! manager.add_column(ColumnSpec::new("student_id").primary_key());
//! manager.add_column(ColumnSpec::new("name").not_null());
//! manager.add_column(ColumnSpec::new("mark").storage_type(StorageType::Int));
//! manager.create_table("STUDENTS")?;
//!
//! manager.add_record(
//!     "STUDENTS",
//!     &Record::new()
//!         .with("student_id", "1010".to_string())
//!         .with("name", "ABC".to_string())
//!         .with("mark", 10i64),
//! )?;
//!
//! let found = manager.get_record("STUDENTS", "1010".to_string())?;
//! assert!(found.is_some());
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod output;

// =============================================================================
// Configuration
// =============================================================================

pub use config::TabulaConfig;

// =============================================================================
// Database Module - Re-export commonly used types
// =============================================================================

pub use database::{
    CatalogInspector, ColumnSpec, CompareOp, Condition, ConnectionOptions, DatabaseConn,
    ManagerState, Predicate, QueryBuilder, Record, SchemaDraft, Statement, StorageType,
    TableManager, TableSchema, ValueKind,
};

pub use error::{Result, TableError};

// Record values are rusqlite's dynamic value type
pub use rusqlite::types::Value;

// =============================================================================
// Output utilities
// =============================================================================

pub use output::OutputFormat;
