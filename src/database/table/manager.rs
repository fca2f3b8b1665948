//! Table manager: the public entry point for schema and record operations
//!
//! A [`TableManager`] owns at most one open database connection and routes
//! every table, schema and record operation through it.
//!
//! # Connection lifecycle
//!
//! ```text
//! Unopened --open/create_database--> Open --close--> Closed
//!                                     ^                |
//!                                     +------open------+
//! ```
//!
//! Opening while already `Open` closes the prior connection before the new
//! one takes its place. Operations that need a connection fail with
//! [`TableError::NotConnected`] from `Unopened` and `Closed`.
//!
//! # Threading
//!
//! The manager is `Send` but not `Sync`: every call blocks on the engine and
//! the connection assumes a single writer. Sharing one manager across threads
//! requires external mutual exclusion.

use std::path::Path;

use rusqlite::types::Value;
use tracing::{debug, info, warn};

use super::query::{Predicate, QueryBuilder, Statement};
use super::record::{decode_row, encode_for_insert, encode_for_update, Record};
use crate::database::core::{
    add_column_sql, CatalogInspector, ColumnSpec, ConnectionOptions, DatabaseConn, SchemaDraft,
    StorageType, TableSchema,
};
use crate::error::{Result, TableError};

/// Connection state of a [`TableManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Unopened,
    Open,
    Closed,
}

enum Connection {
    Unopened,
    Open(DatabaseConn),
    Closed,
}

/// Typed table and record operations over one SQLite database
///
/// Columns can either be staged on the manager with [`add_column`] and
/// materialized with [`create_table`], or collected in an explicit
/// [`SchemaDraft`] passed to [`create_table_from`]. The staged draft is
/// **not** cleared by table creation; call [`clean`] before staging the
/// columns of an unrelated table, or both column sets end up in the second
/// table.
///
/// [`add_column`]: TableManager::add_column
/// [`create_table`]: TableManager::create_table
/// [`create_table_from`]: TableManager::create_table_from
/// [`clean`]: TableManager::clean
pub struct TableManager {
    connection: Connection,
    staged: SchemaDraft,
    options: ConnectionOptions,
}

impl Default for TableManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TableManager {
    pub fn new() -> Self {
        Self::with_options(ConnectionOptions::default())
    }

    /// Create a manager whose connections use the given pragmas
    pub fn with_options(options: ConnectionOptions) -> Self {
        Self {
            connection: Connection::Unopened,
            staged: SchemaDraft::new(),
            options,
        }
    }

    pub fn state(&self) -> ManagerState {
        match self.connection {
            Connection::Unopened => ManagerState::Unopened,
            Connection::Open(_) => ManagerState::Open,
            Connection::Closed => ManagerState::Closed,
        }
    }

    // =========================================================================
    // Connection lifecycle
    // =========================================================================

    /// Create a new database file and open it
    ///
    /// Fails with [`TableError::AlreadyExists`] if `path` exists, unless
    /// `replace` is set, in which case the existing file is deleted first.
    pub fn create_database(&mut self, path: impl AsRef<Path>, replace: bool) -> Result<()> {
        let path = path.as_ref();

        if path.exists() {
            if !replace {
                return Err(TableError::AlreadyExists(path.to_path_buf()));
            }

            if self.open_path() == Some(path) {
                self.close()?;
            }
            remove_database_files(path)?;
            info!("replaced existing database at {}", path.display());
        }

        self.open(path)?;
        info!("created database at {}", path.display());
        Ok(())
    }

    /// Open (or create) the database at `path`
    ///
    /// An already open connection is closed first.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let conn = DatabaseConn::open(Some(path), self.options)?;
        self.install(conn);
        info!("opened database at {}", path.display());
        Ok(())
    }

    /// Open an in-memory database, replacing any open connection
    pub fn open_in_memory(&mut self) -> Result<()> {
        let conn = DatabaseConn::open(None, self.options)?;
        self.install(conn);
        Ok(())
    }

    /// Make sure `path` is the open database, opening it if needed
    ///
    /// Returns the manager so a call can be chained:
    /// `manager.use_database("school.db")?.all_tables()`.
    pub fn use_database(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = path.as_ref();
        if self.open_path() != Some(path) {
            self.open(path)?;
        }
        Ok(self)
    }

    /// Close the open connection
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.connection, Connection::Closed) {
            Connection::Open(conn) => {
                conn.close()?;
                info!("closed database connection");
                Ok(())
            }
            prior => {
                self.connection = prior;
                Err(TableError::NotConnected)
            }
        }
    }

    fn install(&mut self, conn: DatabaseConn) {
        let prior = std::mem::replace(&mut self.connection, Connection::Open(conn));
        if let Connection::Open(prior) = prior {
            debug!("releasing prior connection to {:?}", prior.path());
            if let Err(e) = prior.close() {
                warn!("failed to close prior connection: {}", e);
            }
        }
    }

    fn open_path(&self) -> Option<&Path> {
        match &self.connection {
            Connection::Open(conn) => conn.path(),
            _ => None,
        }
    }

    fn conn(&self) -> Result<&DatabaseConn> {
        match &self.connection {
            Connection::Open(conn) => Ok(conn),
            _ => Err(TableError::NotConnected),
        }
    }

    fn catalog(&self) -> Result<CatalogInspector<'_>> {
        Ok(CatalogInspector::new(self.conn()?))
    }

    // =========================================================================
    // Schema
    // =========================================================================

    /// Stage a column for the next [`create_table`](Self::create_table)
    pub fn add_column(&mut self, spec: ColumnSpec) {
        self.staged.push(spec);
    }

    /// Add a column to an existing table right away, bypassing the stage
    pub fn add_column_to(&self, table: &str, spec: &ColumnSpec) -> Result<()> {
        let catalog = self.catalog()?;
        if !catalog.table_exists(table)? {
            return Err(TableError::NoSuchTable(table.to_string()));
        }

        self.conn()?.execute(&add_column_sql(table, spec), &[])?;
        info!("added column {} to table {}", spec.name, table);
        Ok(())
    }

    /// Discard all staged columns
    pub fn clean(&mut self) {
        self.staged.clear();
    }

    pub fn staged(&self) -> &SchemaDraft {
        &self.staged
    }

    /// Create `table` from the staged columns, in staging order
    ///
    /// The stage is left as it is; see the type-level docs.
    pub fn create_table(&self, table: &str) -> Result<()> {
        self.create_table_from(table, &self.staged)
    }

    /// Create `table` from an explicit draft
    pub fn create_table_from(&self, table: &str, draft: &SchemaDraft) -> Result<()> {
        let sql = draft.create_table_sql(table)?;
        self.conn()?.execute(&sql, &[])?;
        info!("created table {} with {} columns", table, draft.len());
        Ok(())
    }

    /// Drop `table`; fails with [`TableError::NoSuchTable`] if it is absent
    pub fn delete_table(&self, table: &str) -> Result<()> {
        if !self.catalog()?.table_exists(table)? {
            return Err(TableError::NoSuchTable(table.to_string()));
        }

        self.conn()?.execute(&format!("DROP TABLE {}", table), &[])?;
        info!("dropped table {}", table);
        Ok(())
    }

    pub fn all_tables(&self) -> Result<Vec<String>> {
        self.catalog()?.list_tables()
    }

    pub fn is_table(&self, table: &str) -> Result<bool> {
        self.catalog()?.table_exists(table)
    }

    pub fn get_all_column_types(&self, table: &str) -> Result<TableSchema> {
        self.catalog()?.column_types(table)
    }

    pub fn get_column_type(&self, table: &str, column: &str) -> Result<Option<StorageType>> {
        self.catalog()?.column_type(table, column)
    }

    pub fn get_columns(&self, table: &str) -> Result<Vec<String>> {
        self.catalog()?.column_names(table)
    }

    pub fn get_primary_key(&self, table: &str) -> Result<String> {
        self.catalog()?.primary_key(table)
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Insert `record` into `table`
    ///
    /// Field values are checked against the declared column types before
    /// anything is written; a rejected record commits nothing.
    pub fn add_record(&self, table: &str, record: &Record) -> Result<()> {
        let schema = self.get_all_column_types(table)?;
        let values = encode_for_insert(table, &schema, record)?;
        let stmt = QueryBuilder::new(table, &schema).insert(values);
        self.write(&stmt)?;
        Ok(())
    }

    /// Fetch the record whose primary key equals `key`
    ///
    /// A missing row is `Ok(None)`, not an error.
    pub fn get_record(&self, table: &str, key: impl Into<Value>) -> Result<Option<Record>> {
        let schema = self.get_all_column_types(table)?;
        let primary_key = self.get_primary_key(table)?;
        let stmt = QueryBuilder::new(table, &schema).get_by_key(&primary_key, key.into());
        Ok(self.read(&schema, &stmt)?.into_iter().next())
    }

    pub fn get_all_records(&self, table: &str) -> Result<Vec<Record>> {
        let schema = self.get_all_column_types(table)?;
        let stmt = QueryBuilder::new(table, &schema).select_all();
        self.read(&schema, &stmt)
    }

    /// Overwrite the fields present in `record` on the row keyed by `key`
    ///
    /// Returns the number of rows changed.
    pub fn update_record(
        &self,
        table: &str,
        key: impl Into<Value>,
        record: &Record,
    ) -> Result<usize> {
        let schema = self.get_all_column_types(table)?;
        let primary_key = self.get_primary_key(table)?;
        let assignments = encode_for_update(table, &schema, record)?;
        if assignments.is_empty() {
            return Ok(0);
        }

        let stmt =
            QueryBuilder::new(table, &schema).update_by_key(&primary_key, assignments, key.into());
        self.write(&stmt)
    }

    /// Delete the row keyed by `key`, returning the number of rows removed
    pub fn delete_record(&self, table: &str, key: impl Into<Value>) -> Result<usize> {
        let schema = self.get_all_column_types(table)?;
        let primary_key = self.get_primary_key(table)?;
        let stmt = QueryBuilder::new(table, &schema).delete_by_key(&primary_key, key.into());
        self.write(&stmt)
    }

    /// Records matching every condition of `predicate`
    ///
    /// Text conditions containing `>`, `<`, `!` or `=` are spliced into the
    /// query verbatim and must come from a trusted caller; see
    /// [`Condition`](super::query::Condition).
    pub fn filter_records(&self, table: &str, predicate: &Predicate) -> Result<Vec<Record>> {
        let schema = self.get_all_column_types(table)?;
        let stmt = QueryBuilder::new(table, &schema).filter(predicate)?;
        self.read(&schema, &stmt)
    }

    fn write(&self, stmt: &Statement) -> Result<usize> {
        self.conn()?.execute_in_transaction(&stmt.sql, &stmt.params)
    }

    fn read(&self, schema: &TableSchema, stmt: &Statement) -> Result<Vec<Record>> {
        let columns = schema.names();
        let rows = self.conn()?.query(&stmt.sql, &stmt.params)?;
        Ok(rows
            .into_iter()
            .map(|row| decode_row(&columns, row))
            .collect())
    }
}

/// Delete a database file along with its WAL side files
fn remove_database_files(path: &Path) -> Result<()> {
    std::fs::remove_file(path)?;
    for suffix in ["-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        let side = Path::new(&side);
        if side.exists() {
            std::fs::remove_file(side)?;
        }
    }
    Ok(())
}
