//! Statement construction for record reads and writes
//!
//! [`QueryBuilder`] turns a table name plus its catalog schema into
//! [`Statement`]s: point lookups and deletes by primary key, inserts,
//! updates, and predicate-filtered scans.
//!
//! # Trust boundary
//!
//! The legacy predicate form ([`Condition::Match`]) splices any text value
//! containing `>`, `<`, `!` or `=` verbatim after the column name, so
//! `"<= 100"` on column `mark` becomes `mark<= 100`. That fragment is not
//! escaped or parameterized; predicate values passed this way must come from
//! a trusted caller. Use [`Condition::Compare`] for a bound-parameter
//! comparison instead.

use std::fmt;

use rusqlite::types::Value;

use crate::database::core::TableSchema;
use crate::error::{Result, TableError};

/// Characters that mark a text predicate value as a comparison fragment
const OPERATOR_CHARS: [char; 4] = ['>', '<', '!', '='];

/// Statement text plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }
}

/// Comparison operator for structured predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Condition on a single column
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Equality on the value, or, for text containing an operator character,
    /// the text itself spliced verbatim after the column name
    Match(Value),
    /// `column op ?` with the value bound as a parameter
    Compare { op: CompareOp, value: Value },
}

/// Column conditions combined with `AND`, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<(String, Condition)>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a legacy condition: equality, or a verbatim comparison fragment
    pub fn field(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push((column.into(), Condition::Match(value.into())));
        self
    }

    /// Add a parameterized comparison
    pub fn compare(
        mut self,
        column: impl Into<String>,
        op: CompareOp,
        value: impl Into<Value>,
    ) -> Self {
        self.conditions.push((
            column.into(),
            Condition::Compare {
                op,
                value: value.into(),
            },
        ));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions.iter().map(|(c, cond)| (c.as_str(), cond))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Predicate {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Predicate::new(), |p, (column, value)| p.field(column, value))
    }
}

/// Builds statements against one table
pub struct QueryBuilder<'a> {
    table: &'a str,
    schema: &'a TableSchema,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(table: &'a str, schema: &'a TableSchema) -> Self {
        Self { table, schema }
    }

    fn select_prefix(&self) -> String {
        format!(
            "SELECT {} FROM {}",
            self.schema.names().join(", "),
            self.table
        )
    }

    /// Every row of the table
    pub fn select_all(&self) -> Statement {
        Statement::new(self.select_prefix(), vec![])
    }

    /// The row whose primary key equals `key`
    pub fn get_by_key(&self, primary_key: &str, key: Value) -> Statement {
        Statement::new(
            format!("{} WHERE {} = ?", self.select_prefix(), primary_key),
            vec![key],
        )
    }

    pub fn delete_by_key(&self, primary_key: &str, key: Value) -> Statement {
        Statement::new(
            format!("DELETE FROM {} WHERE {} = ?", self.table, primary_key),
            vec![key],
        )
    }

    /// Positional insert with one placeholder per declared column
    pub fn insert(&self, values: Vec<Value>) -> Statement {
        let placeholders = vec!["?"; self.schema.len()].join(", ");
        Statement::new(
            format!("INSERT INTO {} VALUES ({})", self.table, placeholders),
            values,
        )
    }

    /// Set the given columns on the row whose primary key equals `key`
    pub fn update_by_key(
        &self,
        primary_key: &str,
        assignments: Vec<(String, Value)>,
        key: Value,
    ) -> Statement {
        let mut sets = Vec::with_capacity(assignments.len());
        let mut params = Vec::with_capacity(assignments.len() + 1);
        for (column, value) in assignments {
            sets.push(format!("{} = ?", column));
            params.push(value);
        }
        params.push(key);

        Statement::new(
            format!(
                "UPDATE {} SET {} WHERE {} = ?",
                self.table,
                sets.join(", "),
                primary_key
            ),
            params,
        )
    }

    /// Rows matching every condition of `predicate`
    ///
    /// Fails with [`TableError::UnknownColumn`] if a condition names a column
    /// the table does not have. See the module docs for the trust boundary of
    /// [`Condition::Match`].
    pub fn filter(&self, predicate: &Predicate) -> Result<Statement> {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        for (column, condition) in predicate.iter() {
            if !self.schema.contains(column) {
                return Err(TableError::UnknownColumn {
                    table: self.table.to_string(),
                    column: column.to_string(),
                });
            }

            match condition {
                // Non-finite reals have no SQL literal form
                Condition::Match(Value::Real(r)) if !r.is_finite() => {
                    clauses.push(format!("{} = ?", column));
                    params.push(Value::Real(*r));
                }
                Condition::Match(value) => clauses.push(match_clause(column, value)),
                Condition::Compare { op, value } => {
                    clauses.push(format!("{} {} ?", column, op));
                    params.push(value.clone());
                }
            }
        }

        let mut sql = self.select_prefix();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        Ok(Statement::new(sql, params))
    }
}

fn match_clause(column: &str, value: &Value) -> String {
    match value {
        Value::Text(text) if text.contains(&OPERATOR_CHARS[..]) => format!("{}{}", column, text),
        Value::Text(text) => format!("{} = '{}'", column, text.replace('\'', "''")),
        Value::Integer(n) => format!("{} = {}", column, n),
        Value::Real(r) => format!("{} = {}", column, r),
        Value::Null => format!("{} IS NULL", column),
        Value::Blob(bytes) => {
            let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
            format!("{} = X'{}'", column, hex)
        }
    }
}
