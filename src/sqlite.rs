use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue};
use rusqlite::{params_from_iter, Connection, Params, Result};
use std::path::{Path, PathBuf};

/// Core value types for SQLite operations
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl ToSql for Value {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(f) => ToSqlOutput::from(*f),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
            Value::Blob(b) => ToSqlOutput::from(b.as_slice()),
            Value::Boolean(b) => ToSqlOutput::from(*b),
        })
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Positional parameter bindings, bound in order as `?1..?n`
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParamTuple {
    pub values: Vec<Value>,
}

impl ParamTuple {
    /// Create an empty tuple
    pub fn new() -> Self {
        Self::default()
    }
    /// Append the next positional value
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }
}

impl<V: Into<Value>> FromIterator<V> for ParamTuple {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// SQL statement with typed parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub statement: String,
    pub params: ParamTuple,
}

impl SqlQuery {
    pub fn new(statement: &str) -> Self {
        Self {
            statement: statement.to_string(),
            params: ParamTuple::new(),
        }
    }
    pub fn with_params(mut self, params: ParamTuple) -> Self {
        self.params = params;
        self
    }
}

/// Where a session's database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
}

impl SqliteConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Open a session on the configured file
    pub fn open(&self) -> Result<SqliteSession> {
        SqliteSession::open(&self.db_path)
    }
}

/// A connection paired with its open transaction.
///
/// Every statement runs inside a transaction that only [`commit`] makes
/// durable. [`close`] discards uncommitted work and reports close errors;
/// dropping the session on any other path closes the connection and SQLite
/// rolls the open transaction back.
///
/// [`commit`]: SqliteSession::commit
/// [`close`]: SqliteSession::close
#[derive(Debug)]
pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening sqlite session");
        Self::begin(Connection::open(path)?)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::begin(Connection::open_in_memory()?)
    }

    fn begin(conn: Connection) -> Result<Self> {
        conn.execute_batch("BEGIN DEFERRED")?;
        Ok(Self { conn })
    }

    /// Make pending writes durable and start a fresh transaction
    pub fn commit(&mut self) -> Result<()> {
        // An engine error may already have rolled the transaction back.
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        tracing::debug!("sqlite session committed");
        self.conn.execute_batch("BEGIN DEFERRED")
    }

    /// Run one statement with natively bound parameters, returning the
    /// number of changed rows
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        self.conn.execute(sql, params)
    }

    /// Run a [`SqlQuery`], binding its values positionally
    pub fn execute_query(&self, query: &SqlQuery) -> Result<usize> {
        self.execute(&query.statement, params_from_iter(query.params.values.iter()))
    }

    /// Direct access for reads
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Discard uncommitted work and release the connection
    pub fn close(self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        self.conn.close().map_err(|(_, e)| e)?;
        tracing::debug!("sqlite session closed");
        Ok(())
    }
}

/// Open a session on `path`, run `f`, then close the session whether `f`
/// succeeded or not. Nothing is committed unless `f` calls
/// [`SqliteSession::commit`].
pub fn with_session<T, F>(path: impl AsRef<Path>, f: F) -> Result<T>
where
    F: FnOnce(&mut SqliteSession) -> Result<T>,
{
    let mut session = SqliteSession::open(path)?;
    match f(&mut session) {
        Ok(value) => {
            session.close()?;
            Ok(value)
        }
        Err(e) => {
            if let Err(close_err) = session.close() {
                tracing::warn!(error = %close_err, "failed to close sqlite session after error");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(session: &SqliteSession) -> i64 {
        session
            .connection()
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn value_conversions() {
        assert_eq!(Value::from(3), Value::Integer(3));
        assert_eq!(Value::from("a"), Value::Text("a".to_string()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(true)), Value::Boolean(true));
    }

    #[test]
    fn param_tuple_keeps_order() {
        let params = ParamTuple::new().with_value(1).with_value("x").with_value(2.5);
        assert_eq!(
            params.values,
            vec![Value::Integer(1), Value::Text("x".into()), Value::Real(2.5)]
        );
    }

    #[test]
    fn execute_query_binds_every_value_type() {
        let session = SqliteSession::open_in_memory().unwrap();
        session
            .execute(
                "CREATE TABLE items (i INTEGER, r REAL, t TEXT, b BLOB, f INTEGER, n TEXT)",
                [],
            )
            .unwrap();

        let query = SqlQuery::new("INSERT INTO items VALUES (?1, ?2, ?3, ?4, ?5, ?6)").with_params(
            ParamTuple::new()
                .with_value(7)
                .with_value(1.5)
                .with_value("text")
                .with_value(vec![0u8, 1, 2])
                .with_value(true)
                .with_value(Value::Null),
        );
        assert_eq!(session.execute_query(&query).unwrap(), 1);

        let row: (i64, f64, String, Vec<u8>, bool, Option<String>) = session
            .connection()
            .query_row("SELECT i, r, t, b, f, n FROM items", [], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })
            .unwrap();
        assert_eq!(row, (7, 1.5, "text".to_string(), vec![0, 1, 2], true, None));
    }

    #[test]
    fn session_starts_inside_transaction() {
        let mut session = SqliteSession::open_in_memory().unwrap();
        assert!(!session.connection().is_autocommit());
        session.commit().unwrap();
        assert!(!session.connection().is_autocommit());
    }

    #[test]
    fn commit_recovers_after_rolled_back_transaction() {
        let mut session = SqliteSession::open_in_memory().unwrap();
        session.execute("CREATE TABLE items (id INTEGER)", []).unwrap();
        session.connection().execute_batch("ROLLBACK").unwrap();

        session.commit().unwrap();
        session
            .execute("CREATE TABLE items (id INTEGER)", [])
            .unwrap();
        session.execute("INSERT INTO items VALUES (1)", []).unwrap();
        assert_eq!(count(&session), 1);
    }
}
