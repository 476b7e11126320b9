//! The persistent store seam and its SQLite implementation.
//!
//! Handlers depend only on [`NoteStore`]; the concrete store is injected at
//! construction time as an `Arc<dyn NoteStore>`. [`SqliteStore`] runs every
//! operation on tokio's blocking pool so callers never block an async worker.
//!
//! Every method is atomic on its own: a single statement, or a single SQLite
//! transaction where a note's tag rows have to change alongside it. No
//! method spans more than one logical step, so multi-step workflows (such as
//! cleanup followed by removal) are *not* atomic as a whole.

use crate::core::filter::Query;
use crate::core::note::{from_millis, NoteChanges};
use crate::{Folder, Note, NotefulError, Result, Storage, Tag};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Asynchronous access to the three entity collections.
///
/// Lookups that find nothing return `Ok(None)` / `Ok(false)` rather than an
/// error; only genuine store failures and name-uniqueness violations
/// ([`NotefulError::DuplicateName`]) are reported as `Err`.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn find_notes(&self, query: Query) -> Result<Vec<Note>>;
    async fn find_note(&self, id: &str) -> Result<Option<Note>>;
    async fn insert_note(&self, note: Note) -> Result<Note>;
    /// Replaces title, content, folder and tags of `id`; `None` if absent.
    async fn replace_note(
        &self,
        id: &str,
        changes: NoteChanges,
        at: DateTime<Utc>,
    ) -> Result<Option<Note>>;
    async fn remove_note(&self, id: &str) -> Result<bool>;

    async fn find_folders(&self, query: Query) -> Result<Vec<Folder>>;
    async fn find_folder(&self, id: &str) -> Result<Option<Folder>>;
    async fn insert_folder(&self, folder: Folder) -> Result<Folder>;
    async fn rename_folder(&self, id: &str, name: String, at: DateTime<Utc>) -> Result<Option<Folder>>;
    async fn remove_folder(&self, id: &str) -> Result<bool>;

    async fn find_tags(&self, query: Query) -> Result<Vec<Tag>>;
    async fn find_tag(&self, id: &str) -> Result<Option<Tag>>;
    async fn insert_tag(&self, tag: Tag) -> Result<Tag>;
    async fn rename_tag(&self, id: &str, name: String, at: DateTime<Utc>) -> Result<Option<Tag>>;
    async fn remove_tag(&self, id: &str) -> Result<bool>;

    /// Unsets `folderId` on every note filed in `folder_id`. Returns the number of notes touched.
    async fn clear_folder_refs(&self, folder_id: &str, at: DateTime<Utc>) -> Result<usize>;
    /// Removes `tag_id` from every note's tag list. Returns the number of notes touched.
    async fn pull_tag_refs(&self, tag_id: &str, at: DateTime<Utc>) -> Result<usize>;

    /// Deletes every record in every collection.
    async fn clear_all(&self) -> Result<()>;
}

/// [`NoteStore`] backed by a single SQLite connection.
#[derive(Clone)]
pub struct SqliteStore {
    storage: Arc<Mutex<Storage>>,
}

impl SqliteStore {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    /// Opens the database at `path`, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Storage::open_or_create(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Storage::open_in_memory()?))
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || {
            let mut guard = storage
                .lock()
                .map_err(|_| NotefulError::InvalidDatabase("storage lock poisoned".to_string()))?;
            f(guard.connection_mut())
        })
        .await?
    }
}

#[async_trait]
impl NoteStore for SqliteStore {
    async fn find_notes(&self, query: Query) -> Result<Vec<Note>> {
        self.run(move |conn| {
            let mut binds = Vec::new();
            let where_sql = query.predicate.to_sql(&mut binds);
            log::debug!("notes query: WHERE {where_sql} {binds:?}");
            select_notes(conn, &where_sql, query.order.to_sql(), &binds)
        })
        .await
    }

    async fn find_note(&self, id: &str) -> Result<Option<Note>> {
        let id = id.to_string();
        self.run(move |conn| {
            Ok(select_notes(conn, "id = ?", "rowid", &[id])?.into_iter().next())
        })
        .await
    }

    async fn insert_note(&self, note: Note) -> Result<Note> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO notes (id, title, content, folder_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    note.id,
                    note.title,
                    note.content,
                    note.folder_id,
                    note.created_at.timestamp_millis(),
                    note.updated_at.timestamp_millis(),
                ],
            )?;
            write_tags(&tx, &note.id, &note.tags)?;
            tx.commit()?;
            Ok(note)
        })
        .await
    }

    async fn replace_note(
        &self,
        id: &str,
        changes: NoteChanges,
        at: DateTime<Utc>,
    ) -> Result<Option<Note>> {
        let id = id.to_string();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let updated = tx.execute(
                "UPDATE notes SET title = ?1, content = ?2, folder_id = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![changes.title, changes.content, changes.folder_id, at.timestamp_millis(), id],
            )?;
            // Nothing to replace: dropping the transaction rolls back.
            if updated == 0 {
                return Ok(None);
            }
            tx.execute("DELETE FROM note_tags WHERE note_id = ?1", [&id])?;
            write_tags(&tx, &id, &changes.tags)?;
            tx.commit()?;
            Ok(select_notes(conn, "id = ?", "rowid", &[id])?.into_iter().next())
        })
        .await
    }

    async fn remove_note(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.run(move |conn| Ok(conn.execute("DELETE FROM notes WHERE id = ?1", [id])? > 0))
            .await
    }

    async fn find_folders(&self, query: Query) -> Result<Vec<Folder>> {
        self.run(move |conn| find_named(conn, &query)).await
    }

    async fn find_folder(&self, id: &str) -> Result<Option<Folder>> {
        let id = id.to_string();
        self.run(move |conn| get_named(conn, &id)).await
    }

    async fn insert_folder(&self, folder: Folder) -> Result<Folder> {
        self.run(move |conn| insert_named(conn, folder)).await
    }

    async fn rename_folder(&self, id: &str, name: String, at: DateTime<Utc>) -> Result<Option<Folder>> {
        let id = id.to_string();
        self.run(move |conn| rename_named(conn, &id, name, at)).await
    }

    async fn remove_folder(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.run(move |conn| remove_named::<Folder>(conn, &id)).await
    }

    async fn find_tags(&self, query: Query) -> Result<Vec<Tag>> {
        self.run(move |conn| find_named(conn, &query)).await
    }

    async fn find_tag(&self, id: &str) -> Result<Option<Tag>> {
        let id = id.to_string();
        self.run(move |conn| get_named(conn, &id)).await
    }

    async fn insert_tag(&self, tag: Tag) -> Result<Tag> {
        self.run(move |conn| insert_named(conn, tag)).await
    }

    async fn rename_tag(&self, id: &str, name: String, at: DateTime<Utc>) -> Result<Option<Tag>> {
        let id = id.to_string();
        self.run(move |conn| rename_named(conn, &id, name, at)).await
    }

    async fn remove_tag(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.run(move |conn| remove_named::<Tag>(conn, &id)).await
    }

    async fn clear_folder_refs(&self, folder_id: &str, at: DateTime<Utc>) -> Result<usize> {
        let folder_id = folder_id.to_string();
        self.run(move |conn| {
            let touched = conn.execute(
                "UPDATE notes SET folder_id = NULL, updated_at = ?1 WHERE folder_id = ?2",
                params![at.timestamp_millis(), folder_id],
            )?;
            Ok(touched)
        })
        .await
    }

    async fn pull_tag_refs(&self, tag_id: &str, at: DateTime<Utc>) -> Result<usize> {
        let tag_id = tag_id.to_string();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let touched = tx.execute(
                "UPDATE notes SET updated_at = ?1
                 WHERE id IN (SELECT note_id FROM note_tags WHERE tag_id = ?2)",
                params![at.timestamp_millis(), tag_id],
            )?;
            tx.execute("DELETE FROM note_tags WHERE tag_id = ?1", [&tag_id])?;
            tx.commit()?;
            Ok(touched)
        })
        .await
    }

    async fn clear_all(&self) -> Result<()> {
        self.run(|conn| {
            conn.execute_batch(
                "BEGIN;
                 DELETE FROM note_tags;
                 DELETE FROM notes;
                 DELETE FROM folders;
                 DELETE FROM tags;
                 COMMIT;",
            )?;
            Ok(())
        })
        .await
    }
}

/// Raw 6-column tuple extracted from a `notes` row.
type NoteRow = (String, String, Option<String>, Option<String>, i64, i64);

fn map_note_row(row: &rusqlite::Row) -> rusqlite::Result<NoteRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn select_notes(
    conn: &Connection,
    where_sql: &str,
    order_sql: &str,
    binds: &[String],
) -> Result<Vec<Note>> {
    let sql = format!(
        "SELECT id, title, content, folder_id, created_at, updated_at
         FROM notes WHERE {where_sql} ORDER BY {order_sql}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(binds.iter()), map_note_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(id, title, content, folder_id, created_at, updated_at)| {
            let tags = load_tags(conn, &id)?;
            Ok(Note {
                id,
                title,
                content,
                folder_id,
                tags,
                created_at: from_millis(created_at),
                updated_at: from_millis(updated_at),
            })
        })
        .collect()
}

fn load_tags(conn: &Connection, note_id: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare_cached("SELECT tag_id FROM note_tags WHERE note_id = ?1 ORDER BY position")?;
    let tags = stmt
        .query_map([note_id], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tags)
}

fn write_tags(conn: &Connection, note_id: &str, tags: &[String]) -> Result<()> {
    let mut stmt =
        conn.prepare_cached("INSERT INTO note_tags (note_id, tag_id, position) VALUES (?1, ?2, ?3)")?;
    for (position, tag_id) in tags.iter().enumerate() {
        stmt.execute(params![note_id, tag_id, position as i64])?;
    }
    Ok(())
}

/// Folders and tags share one table shape; this maps each onto its table.
trait NamedRecord: Sized {
    const TABLE: &'static str;
    const KIND: &'static str;

    fn from_parts(id: String, name: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self;
    fn name(&self) -> &str;
    fn parts(&self) -> (&str, &str, i64, i64);
}

impl NamedRecord for Folder {
    const TABLE: &'static str = "folders";
    const KIND: &'static str = "folder";

    fn from_parts(id: String, name: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self { id, name, created_at, updated_at }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parts(&self) -> (&str, &str, i64, i64) {
        (&self.id, &self.name, self.created_at.timestamp_millis(), self.updated_at.timestamp_millis())
    }
}

impl NamedRecord for Tag {
    const TABLE: &'static str = "tags";
    const KIND: &'static str = "tag";

    fn from_parts(id: String, name: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        Self { id, name, created_at, updated_at }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parts(&self) -> (&str, &str, i64, i64) {
        (&self.id, &self.name, self.created_at.timestamp_millis(), self.updated_at.timestamp_millis())
    }
}

fn map_named_row<T: NamedRecord>(row: &rusqlite::Row) -> rusqlite::Result<T> {
    Ok(T::from_parts(
        row.get(0)?,
        row.get(1)?,
        from_millis(row.get(2)?),
        from_millis(row.get(3)?),
    ))
}

fn find_named<T: NamedRecord>(conn: &Connection, query: &Query) -> Result<Vec<T>> {
    let mut binds = Vec::new();
    let where_sql = query.predicate.to_sql(&mut binds);
    log::debug!("{} query: WHERE {where_sql} {binds:?}", T::TABLE);
    let sql = format!(
        "SELECT id, name, created_at, updated_at FROM {} WHERE {where_sql} ORDER BY {}",
        T::TABLE,
        query.order.to_sql()
    );
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map(params_from_iter(binds.iter()), map_named_row::<T>)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

fn get_named<T: NamedRecord>(conn: &Connection, id: &str) -> Result<Option<T>> {
    let sql = format!("SELECT id, name, created_at, updated_at FROM {} WHERE id = ?1", T::TABLE);
    Ok(conn.query_row(&sql, [id], map_named_row::<T>).optional()?)
}

fn insert_named<T: NamedRecord>(conn: &Connection, record: T) -> Result<T> {
    let sql = format!(
        "INSERT INTO {} (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
        T::TABLE
    );
    let (id, name, created_at, updated_at) = record.parts();
    conn.execute(&sql, params![id, name, created_at, updated_at])
        .map_err(|e| unique_violation(e, T::KIND, record.name()))?;
    Ok(record)
}

fn rename_named<T: NamedRecord>(
    conn: &Connection,
    id: &str,
    name: String,
    at: DateTime<Utc>,
) -> Result<Option<T>> {
    let sql = format!("UPDATE {} SET name = ?1, updated_at = ?2 WHERE id = ?3", T::TABLE);
    let updated = conn
        .execute(&sql, params![name, at.timestamp_millis(), id])
        .map_err(|e| unique_violation(e, T::KIND, &name))?;
    if updated == 0 {
        return Ok(None);
    }
    get_named(conn, id)
}

fn remove_named<T: NamedRecord>(conn: &Connection, id: &str) -> Result<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", T::TABLE);
    Ok(conn.execute(&sql, [id])? > 0)
}

/// Translates a UNIQUE constraint failure on `name` into [`NotefulError::DuplicateName`].
fn unique_violation(err: rusqlite::Error, kind: &'static str, name: &str) -> NotefulError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            NotefulError::DuplicateName {
                kind,
                name: name.to_string(),
            }
        }
        _ => err.into(),
    }
}
