//! Records and their conversion to and from statement parameters
//!
//! A [`Record`] is a loosely-typed mapping of column name to value. Before a
//! record reaches the engine its values are checked against the declared
//! column types and laid out in the table's declaration order.

use rusqlite::types::Value;

use crate::database::core::{accepts, TableSchema, ValueKind};
use crate::error::{Result, TableError};

/// Mapping of column name to value, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set `column` to `value`, replacing any earlier value in place
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Check every field of `record` against the schema of `table`
fn validate(table: &str, schema: &TableSchema, record: &Record) -> Result<()> {
    for (column, value) in record.iter() {
        let storage_type = schema
            .get(column)
            .ok_or_else(|| TableError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })?;

        if !accepts(storage_type, value) {
            return Err(TableError::TypeMismatch {
                column: column.to_string(),
                expected: storage_type,
                actual: ValueKind::of(value),
            });
        }
    }
    Ok(())
}

/// Lay out `record` as positional insert parameters
///
/// Parameters follow the table's declaration order, not the record's. Columns
/// the record omits are bound as NULL.
pub fn encode_for_insert(table: &str, schema: &TableSchema, record: &Record) -> Result<Vec<Value>> {
    validate(table, schema, record)?;

    Ok(schema
        .iter()
        .map(|(column, _)| record.get(column).cloned().unwrap_or(Value::Null))
        .collect())
}

/// Validate `record` and return its `column = value` assignments in record order
pub fn encode_for_update(
    table: &str,
    schema: &TableSchema,
    record: &Record,
) -> Result<Vec<(String, Value)>> {
    validate(table, schema, record)?;
    Ok(record.clone().into_iter().collect())
}

/// Zip column names with a raw row positionally
pub fn decode_row(columns: &[String], row: Vec<Value>) -> Record {
    columns.iter().cloned().zip(row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::StorageType;

    fn students() -> TableSchema {
        TableSchema::new(vec![
            ("student_id".to_string(), StorageType::Text),
            ("name".to_string(), StorageType::Text),
            ("mark".to_string(), StorageType::Int),
        ])
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = Record::new()
            .with("a", 1i64)
            .with("b", "x".to_string());
        record.insert("a", 2i64);

        let fields: Vec<(&str, &Value)> = record.iter().collect();
        assert_eq!(
            fields,
            vec![("a", &Value::Integer(2)), ("b", &Value::Text("x".into()))]
        );
    }

    #[test]
    fn test_encode_follows_declaration_order() {
        let record = Record::new()
            .with("mark", 10i64)
            .with("name", "ABC".to_string())
            .with("student_id", "1010".to_string());

        let params = encode_for_insert("STUDENTS", &students(), &record).unwrap();
        assert_eq!(
            params,
            vec![
                Value::Text("1010".into()),
                Value::Text("ABC".into()),
                Value::Integer(10),
            ]
        );
    }

    #[test]
    fn test_encode_missing_column_is_null() {
        let record = Record::new().with("student_id", "1010".to_string());

        let params = encode_for_insert("STUDENTS", &students(), &record).unwrap();
        assert_eq!(params[1], Value::Null);
        assert_eq!(params[2], Value::Null);
    }

    #[test]
    fn test_encode_unknown_column() {
        let record = Record::new().with("address", "nowhere".to_string());

        let err = encode_for_insert("STUDENTS", &students(), &record).unwrap_err();
        assert!(matches!(
            err,
            TableError::UnknownColumn { table, column } if table == "STUDENTS" && column == "address"
        ));
    }

    #[test]
    fn test_encode_type_mismatch() {
        let record = Record::new()
            .with("student_id", 10i64)
            .with("name", "ABC".to_string());

        let err = encode_for_insert("STUDENTS", &students(), &record).unwrap_err();
        match err {
            TableError::TypeMismatch {
                column,
                expected,
                actual,
            } => {
                assert_eq!(column, "student_id");
                assert_eq!(expected, StorageType::Text);
                assert_eq!(actual, ValueKind::Integer);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_encode_for_update_keeps_record_order() {
        let record = Record::new()
            .with("mark", 20i64)
            .with("name", "DEF".to_string());

        let assignments = encode_for_update("STUDENTS", &students(), &record).unwrap();
        assert_eq!(assignments[0].0, "mark");
        assert_eq!(assignments[1].0, "name");
    }

    #[test]
    fn test_decode_row() {
        let columns = students().names();
        let record = decode_row(
            &columns,
            vec![
                Value::Text("1010".into()),
                Value::Text("ABC".into()),
                Value::Integer(10),
            ],
        );

        assert_eq!(record.get("mark"), Some(&Value::Integer(10)));
        assert_eq!(
            record.columns().collect::<Vec<_>>(),
            vec!["student_id", "name", "mark"]
        );
    }
}
