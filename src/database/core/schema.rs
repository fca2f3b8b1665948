//! Column definitions and staged table drafts
//!
//! A [`SchemaDraft`] collects [`ColumnSpec`]s in the order they are staged and
//! renders the `CREATE TABLE` statement that materializes them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::StorageType;
use crate::error::{Result, TableError};

/// Definition of a single column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub storage_type: StorageType,
    pub primary_key: bool,
    pub not_null: bool,
}

impl ColumnSpec {
    /// A nullable, non-key TEXT column
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage_type: StorageType::Text,
            primary_key: false,
            not_null: false,
        }
    }

    pub fn storage_type(mut self, storage_type: StorageType) -> Self {
        self.storage_type = storage_type;
        self
    }

    /// Set the storage type from its SQL name
    ///
    /// Fails with [`TableError::UnsupportedType`] for names outside the registry.
    pub fn type_name(mut self, type_name: &str) -> Result<Self> {
        self.storage_type = type_name.parse()?;
        Ok(self)
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Column fragment as used in `CREATE TABLE` and `ALTER TABLE`
    pub fn definition(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.storage_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        sql
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.definition())
    }
}

/// Ordered list of column definitions awaiting table creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDraft {
    columns: Vec<ColumnSpec>,
}

impl SchemaDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column; staging order becomes declaration order
    pub fn column(mut self, spec: ColumnSpec) -> Self {
        self.columns.push(spec);
        self
    }

    pub fn push(&mut self, spec: ColumnSpec) {
        self.columns.push(spec);
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Render the `CREATE TABLE` statement for this draft
    ///
    /// Fails with [`TableError::SchemaNotStaged`] when no column is staged.
    pub fn create_table_sql(&self, table: &str) -> Result<String> {
        if self.columns.is_empty() {
            return Err(TableError::SchemaNotStaged);
        }

        let columns: Vec<String> = self.columns.iter().map(ColumnSpec::definition).collect();
        Ok(format!("CREATE TABLE {} ({})", table, columns.join(", ")))
    }
}

/// Render the statement adding `spec` to an existing table
pub fn add_column_sql(table: &str, spec: &ColumnSpec) -> String {
    format!("ALTER TABLE {} ADD COLUMN {}", table, spec.definition())
}
