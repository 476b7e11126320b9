use crate::core::filter::search_regex;
use crate::{NotefulError, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::Path;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

const REQUIRED_TABLES: [&str; 4] = ["notes", "folders", "tags", "note_tags"];

/// An open SQLite connection with the Noteful schema applied.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Creates (or re-initialises) a database at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Opens an existing database, refusing files without the expected tables.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type='table'
             AND name IN ('notes', 'folders', 'tags', 'note_tags')",
            [],
            |row| row.get(0),
        )?;

        if table_count != REQUIRED_TABLES.len() as i64 {
            return Err(NotefulError::InvalidDatabase(
                "Not a valid Noteful database".to_string(),
            ));
        }

        Self::configure(&conn)?;
        Ok(Self { conn })
    }

    /// Opens `path` if it already holds a Noteful database, otherwise creates one.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let exists = path
            .as_ref()
            .metadata()
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        if exists {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Creates a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        Self::configure(&conn)?;
        Ok(Self { conn })
    }

    fn configure(conn: &Connection) -> Result<()> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        // iregexp(value, pattern): the pattern is compiled once per statement.
        conn.create_scalar_function(
            "iregexp",
            2,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let re = ctx.get_or_create_aux(1, |vr| -> std::result::Result<_, BoxError> {
                    Ok(search_regex(vr.as_str()?)?)
                })?;
                let haystack: Option<String> = ctx.get(0)?;
                Ok(haystack.is_some_and(|h| re.is_match(&h)))
            },
        )?;
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
