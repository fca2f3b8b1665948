//! Database connection management
//!
//! This module provides the storage-engine wrapper every table operation runs
//! through: open, execute, query, commit and close.

use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use crate::error::{Result, TableError};

/// Pragmas applied to every connection when it is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Use WAL journaling instead of the rollback journal
    pub journal_wal: bool,
    /// Enforce foreign key constraints
    pub foreign_keys: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            journal_wal: true,
            foreign_keys: true,
        }
    }
}

/// Core database connection wrapper
///
/// `DatabaseConn` is a thin wrapper around a SQLite connection, handling both
/// file-based and in-memory databases with consistent configuration and
/// error handling. Statements are plain text plus positional parameters.
pub struct DatabaseConn {
    conn: Connection,
    path: Option<PathBuf>,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None`, an in-memory database is created. A file that
    /// does not exist yet is created.
    pub fn open(path: Option<&Path>, options: ConnectionOptions) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p).map_err(|e| TableError::StorageOpen {
                path: p.display().to_string(),
                source: e,
            })?,
            None => Connection::open_in_memory().map_err(|e| TableError::StorageOpen {
                path: ":memory:".to_string(),
                source: e,
            })?,
        };

        let db = DatabaseConn {
            conn,
            path: path.map(Path::to_path_buf),
        };
        db.configure(options)?;
        Ok(db)
    }

    /// Create an in-memory database with default options
    pub fn open_in_memory() -> Result<Self> {
        Self::open(None, ConnectionOptions::default())
    }

    /// Path of the database file, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn configure(&self, options: ConnectionOptions) -> Result<()> {
        let journal_mode = if options.journal_wal { "WAL" } else { "DELETE" };
        // journal_mode reports the resulting mode as a row
        let _: String = self.conn.query_row(
            &format!("PRAGMA journal_mode={}", journal_mode),
            [],
            |row| row.get(0),
        )?;

        let foreign_keys = if options.foreign_keys { "ON" } else { "OFF" };
        self.conn
            .execute(&format!("PRAGMA foreign_keys={}", foreign_keys), [])?;

        Ok(())
    }

    /// Execute a DDL or DML statement, returning the number of affected rows
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        debug!(sql, params = params.len(), "execute");
        Ok(self.conn.execute(sql, params_from_iter(params.iter()))?)
    }

    /// Execute a mutating statement inside a transaction and commit it
    pub fn execute_in_transaction(&self, sql: &str, params: &[Value]) -> Result<usize> {
        debug!(sql, params = params.len(), "execute in transaction");
        let tx = self.conn.unchecked_transaction()?;
        let affected = tx.execute(sql, params_from_iter(params.iter()))?;
        tx.commit()?;
        Ok(affected)
    }

    /// Run a query and return every row as an ordered list of raw values
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>> {
        debug!(sql, params = params.len(), "query");
        let mut stmt = self.conn.prepare(sql)?;
        let width = stmt.column_count();

        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<Value>>>()
        })?;

        let rows = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Close the connection, surfacing any error the engine reports
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| TableError::Storage(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());
        assert!(db.unwrap().path().is_none());
    }

    #[test]
    fn test_execute_and_query() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT)", &[])
            .unwrap();
        let inserted = db
            .execute_in_transaction(
                "INSERT INTO test VALUES (?, ?)",
                &[Value::Integer(1), Value::Text("one".into())],
            )
            .unwrap();
        assert_eq!(inserted, 1);

        let rows = db
            .query("SELECT id, name FROM test WHERE id = ?", &[Value::Integer(1)])
            .unwrap();
        assert_eq!(
            rows,
            vec![vec![Value::Integer(1), Value::Text("one".into())]]
        );
    }

    #[test]
    fn test_open_invalid_path() {
        let result = DatabaseConn::open(
            Some(Path::new("/nonexistent-dir/nested/db.sqlite3")),
            ConnectionOptions::default(),
        );
        assert!(matches!(result, Err(TableError::StorageOpen { .. })));
    }

    #[test]
    fn test_close() {
        let db = DatabaseConn::open_in_memory().unwrap();
        assert!(db.close().is_ok());
    }
}
