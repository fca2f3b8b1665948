//! Catalog inspection
//!
//! Reads table and column metadata from the engine's own catalog
//! (`sqlite_master` and `pragma_table_info`). Column order is always the
//! declaration order reported by the catalog.

use rusqlite::types::Value;

use super::connection::DatabaseConn;
use super::types::StorageType;
use crate::error::{Result, TableError};

/// Column names and declared types of a table, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<(String, StorageType)>,
}

impl TableSchema {
    pub fn new(columns: Vec<(String, StorageType)>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Declared type of `column`, if the table has it
    pub fn get(&self, column: &str) -> Option<StorageType> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, t)| *t)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, StorageType)> {
        self.columns.iter().map(|(name, t)| (name.as_str(), *t))
    }
}

/// Read-only view over the catalog of an open database
pub struct CatalogInspector<'a> {
    db: &'a DatabaseConn,
}

impl<'a> CatalogInspector<'a> {
    pub fn new(db: &'a DatabaseConn) -> Self {
        Self { db }
    }

    /// Check if a table exists in the database
    ///
    /// Table names compare case-insensitively, as they do in the engine.
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let rows = self.db.query(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type='table' AND name = ?1 COLLATE NOCASE",
            &[Value::Text(table.to_string())],
        )?;
        let count = match rows.first().and_then(|row| row.first()) {
            Some(Value::Integer(n)) => *n,
            _ => 0,
        };
        Ok(count > 0)
    }

    /// Names of all user tables, in the order the catalog returns them
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let rows = self.db.query(
            "SELECT name FROM sqlite_master \
             WHERE type='table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'",
            &[],
        )?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next().and_then(into_text))
            .collect())
    }

    /// Column names and declared types of `table`
    pub fn column_types(&self, table: &str) -> Result<TableSchema> {
        let columns = self
            .table_info(table)?
            .into_iter()
            .map(|info| {
                let storage_type = info.declared_type.parse::<StorageType>()?;
                Ok((info.name, storage_type))
            })
            .collect::<Result<Vec<(String, StorageType)>>>()?;
        Ok(TableSchema::new(columns))
    }

    pub fn column_names(&self, table: &str) -> Result<Vec<String>> {
        Ok(self.column_types(table)?.names())
    }

    /// Declared type of one column; `None` when the table has no such column
    pub fn column_type(&self, table: &str, column: &str) -> Result<Option<StorageType>> {
        Ok(self.column_types(table)?.get(column))
    }

    /// The primary key column of `table`
    ///
    /// With a composite key the first flagged column in declaration order wins.
    pub fn primary_key(&self, table: &str) -> Result<String> {
        self.table_info(table)?
            .into_iter()
            .find(|info| info.pk)
            .map(|info| info.name)
            .ok_or_else(|| TableError::NoPrimaryKey(table.to_string()))
    }

    fn table_info(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        if !self.table_exists(table)? {
            return Err(TableError::NoSuchTable(table.to_string()));
        }

        let rows = self.db.query(
            "SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid",
            &[Value::Text(table.to_string())],
        )?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let mut cells = row.into_iter();
                let name = cells.next().and_then(into_text)?;
                let declared_type = cells.next().and_then(into_text).unwrap_or_default();
                let pk = matches!(cells.next(), Some(Value::Integer(n)) if n != 0);
                Some(ColumnInfo {
                    name,
                    declared_type,
                    pk,
                })
            })
            .collect())
    }
}

struct ColumnInfo {
    name: String,
    declared_type: String,
    pk: bool,
}

fn into_text(value: Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_db() -> DatabaseConn {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute(
            "CREATE TABLE STUDENTS (student_id TEXT PRIMARY KEY, name TEXT NOT NULL, mark INT)",
            &[],
        )
        .unwrap();
        db.execute("CREATE TABLE LOG (line TEXT)", &[]).unwrap();
        db
    }

    #[test]
    fn test_table_exists() {
        let db = create_test_db();
        let catalog = CatalogInspector::new(&db);

        assert!(catalog.table_exists("STUDENTS").unwrap());
        assert!(!catalog.table_exists("NON").unwrap());
    }

    #[test]
    fn test_table_exists_ignores_case() {
        let db = create_test_db();
        let catalog = CatalogInspector::new(&db);

        assert!(catalog.table_exists("students").unwrap());
        assert!(catalog.table_exists("Log").unwrap());
        assert_eq!(catalog.primary_key("students").unwrap(), "student_id");
    }

    #[test]
    fn test_list_tables_in_catalog_order() {
        let db = create_test_db();
        let catalog = CatalogInspector::new(&db);

        assert_eq!(catalog.list_tables().unwrap(), vec!["STUDENTS", "LOG"]);
    }

    #[test]
    fn test_list_tables_keeps_sqlite_prefixed_user_tables() {
        let db = create_test_db();
        db.execute("CREATE TABLE SQLiteCache (key TEXT)", &[]).unwrap();
        db.execute("CREATE TABLE sqlitex (key TEXT)", &[]).unwrap();
        // AUTOINCREMENT makes the engine create its internal sqlite_sequence table
        db.execute(
            "CREATE TABLE counters (id INTEGER PRIMARY KEY AUTOINCREMENT)",
            &[],
        )
        .unwrap();
        let catalog = CatalogInspector::new(&db);

        assert!(catalog.table_exists("sqlite_sequence").unwrap());
        assert_eq!(
            catalog.list_tables().unwrap(),
            vec!["STUDENTS", "LOG", "SQLiteCache", "sqlitex", "counters"]
        );
    }

    #[test]
    fn test_column_types() {
        let db = create_test_db();
        let catalog = CatalogInspector::new(&db);

        let schema = catalog.column_types("STUDENTS").unwrap();
        let columns: Vec<(&str, StorageType)> = schema.iter().collect();
        assert_eq!(
            columns,
            vec![
                ("student_id", StorageType::Text),
                ("name", StorageType::Text),
                ("mark", StorageType::Int),
            ]
        );
        assert_eq!(
            catalog.column_names("STUDENTS").unwrap(),
            vec!["student_id", "name", "mark"]
        );
    }

    #[test]
    fn test_column_type() {
        let db = create_test_db();
        let catalog = CatalogInspector::new(&db);

        assert_eq!(
            catalog.column_type("STUDENTS", "mark").unwrap(),
            Some(StorageType::Int)
        );
        assert_eq!(catalog.column_type("STUDENTS", "address").unwrap(), None);
    }

    #[test]
    fn test_missing_table() {
        let db = create_test_db();
        let catalog = CatalogInspector::new(&db);

        assert!(matches!(
            catalog.column_types("NON"),
            Err(TableError::NoSuchTable(t)) if t == "NON"
        ));
        assert!(matches!(
            catalog.primary_key("NON"),
            Err(TableError::NoSuchTable(_))
        ));
    }

    #[test]
    fn test_primary_key() {
        let db = create_test_db();
        let catalog = CatalogInspector::new(&db);

        assert_eq!(catalog.primary_key("STUDENTS").unwrap(), "student_id");
        assert!(matches!(
            catalog.primary_key("LOG"),
            Err(TableError::NoPrimaryKey(t)) if t == "LOG"
        ));
    }

    #[test]
    fn test_composite_primary_key_takes_first_declared() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute(
            "CREATE TABLE pairs (a INT, b INT, c TEXT, PRIMARY KEY (b, a))",
            &[],
        )
        .unwrap();
        let catalog = CatalogInspector::new(&db);

        assert_eq!(catalog.primary_key("pairs").unwrap(), "a");
    }

    #[test]
    fn test_unsupported_declared_type() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE legacy (id INT, created DATETIME)", &[])
            .unwrap();
        let catalog = CatalogInspector::new(&db);

        assert!(matches!(
            catalog.column_types("legacy"),
            Err(TableError::UnsupportedType(t)) if t == "DATETIME"
        ));
    }
}
