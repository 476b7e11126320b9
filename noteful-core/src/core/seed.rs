//! Bulk loading of fixture data into a store.
//!
//! A seed document is JSON with three optional arrays:
//!
//! ```json
//! {
//!   "folders": [{ "id": "111111111111111111111100", "name": "Archive" }],
//!   "tags":    [{ "id": "222222222222222222222200", "name": "foo" }],
//!   "notes":   [{ "id": "000000000000000000000000", "title": "Cats",
//!                 "folderId": "111111111111111111111100",
//!                 "tags": ["222222222222222222222200"] }]
//! }
//! ```
//!
//! Ids are supplied by the document (`_id` is accepted as an alias) and must
//! be well-formed; they are stored lowercase. Timestamps are optional and default
//! to the load time.

use crate::core::note::now_millis;
use crate::{ensure_valid_id, Folder, Note, NoteStore, Result, Tag};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub folders: Vec<SeedNamed>,
    pub tags: Vec<SeedNamed>,
    pub notes: Vec<SeedNote>,
}

/// A folder or tag entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedNamed {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedNote {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub content: Option<String>,
    pub folder_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Counts of inserted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub folders: usize,
    pub tags: usize,
    pub notes: usize,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks every id in the document without touching any store, returning
    /// a copy with all ids in canonical form.
    fn canonical(&self) -> Result<Self> {
        let named = |items: &[SeedNamed]| -> Result<Vec<SeedNamed>> {
            items
                .iter()
                .map(|n| -> Result<SeedNamed> {
                    Ok(SeedNamed { id: ensure_valid_id("id", &n.id)?, ..n.clone() })
                })
                .collect()
        };
        let mut notes = Vec::with_capacity(self.notes.len());
        for note in &self.notes {
            let folder_id = match note.folder_id.as_deref().filter(|f| !f.is_empty()) {
                Some(folder_id) => Some(ensure_valid_id("folderId", folder_id)?),
                None => None,
            };
            let tags = note
                .tags
                .iter()
                .map(|tag_id| ensure_valid_id("tags", tag_id))
                .collect::<Result<Vec<_>>>()?;
            notes.push(SeedNote {
                id: ensure_valid_id("id", &note.id)?,
                folder_id,
                tags,
                ..note.clone()
            });
        }
        Ok(Self { folders: named(&self.folders)?, tags: named(&self.tags)?, notes })
    }
}

/// Inserts the folders, tags and notes of `data`, in that order.
///
/// The whole document is validated before the first insert. Inserts are not
/// transactional as a group; a duplicate name part way through leaves the
/// earlier records in place.
///
/// # Errors
///
/// [`InvalidId`](crate::NotefulError::InvalidId) for a malformed id,
/// [`DuplicateName`](crate::NotefulError::DuplicateName) on a name clash, or
/// any store failure.
pub async fn seed_store(store: &dyn NoteStore, data: &SeedData) -> Result<SeedReport> {
    let data = data.canonical()?;
    let now = now_millis();
    let mut report = SeedReport::default();

    for f in &data.folders {
        let (created_at, updated_at) = stamps(f.created_at, f.updated_at, now);
        store
            .insert_folder(Folder { id: f.id.clone(), name: f.name.clone(), created_at, updated_at })
            .await?;
        report.folders += 1;
    }

    for t in &data.tags {
        let (created_at, updated_at) = stamps(t.created_at, t.updated_at, now);
        store
            .insert_tag(Tag { id: t.id.clone(), name: t.name.clone(), created_at, updated_at })
            .await?;
        report.tags += 1;
    }

    for n in &data.notes {
        let (created_at, updated_at) = stamps(n.created_at, n.updated_at, now);
        let note = Note {
            id: n.id.clone(),
            title: n.title.clone(),
            content: n.content.clone(),
            folder_id: n.folder_id.clone(),
            tags: n.tags.clone(),
            created_at,
            updated_at,
        };
        store.insert_note(note).await?;
        report.notes += 1;
    }

    log::info!(
        "seeded {} folder(s), {} tag(s), {} note(s)",
        report.folders,
        report.tags,
        report.notes
    );
    Ok(report)
}

/// Millisecond-truncated timestamps, defaulting to `now`.
fn stamps(
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let truncate = |at: DateTime<Utc>| crate::core::note::from_millis(at.timestamp_millis());
    let created = created_at.map_or(now, truncate);
    let updated = updated_at.map_or(created, truncate);
    (created, updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::{build_filter, EntityKind, ListParams};
    use crate::core::store::testing::CountingStore;
    use crate::{NotefulError, SqliteStore};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOC: &str = r#"{
        "folders": [
            { "_id": "111111111111111111111100", "name": "Archive" },
            { "_id": "111111111111111111111101", "name": "Drafts" }
        ],
        "tags": [
            { "_id": "222222222222222222222200", "name": "foo" }
        ],
        "notes": [
            {
                "_id": "000000000000000000000000",
                "title": "5 life lessons learned from cats",
                "content": "Lorem ipsum dolor sit amet",
                "folderId": "111111111111111111111100",
                "tags": ["222222222222222222222200"],
                "createdAt": "2018-01-01T10:00:00.123Z"
            },
            {
                "id": "000000000000000000000001",
                "title": "What the government doesn't want you to know about cats"
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_seed_inserts_everything() {
        let store = SqliteStore::open_in_memory().unwrap();
        let data = SeedData::from_json(DOC).unwrap();

        let report = seed_store(&store, &data).await.unwrap();
        assert_eq!(report, SeedReport { folders: 2, tags: 1, notes: 2 });

        let first = store.find_note("000000000000000000000000").await.unwrap().unwrap();
        assert_eq!(first.folder_id.as_deref(), Some("111111111111111111111100"));
        assert_eq!(first.tags, ["222222222222222222222200"]);
        assert_eq!(first.created_at.to_rfc3339(), "2018-01-01T10:00:00.123+00:00");
        assert_eq!(first.updated_at, first.created_at);

        let folders = store.find_folders(build_filter(EntityKind::Folder, &ListParams::default()).unwrap()).await.unwrap();
        assert_eq!(folders.len(), 2);
    }

    #[tokio::test]
    async fn test_seed_rejects_bad_ids_before_any_insert() {
        let store = CountingStore::new();
        let mut data = SeedData::from_json(DOC).unwrap();
        data.notes[1].tags.push("not-an-id".to_string());

        let err = seed_store(&store, &data).await.unwrap_err();
        assert!(matches!(err, NotefulError::InvalidId { ref field, .. } if field == "tags"));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_seed_duplicate_name_fails() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut data = SeedData::from_json(DOC).unwrap();
        data.folders[1].name = "Archive".to_string();

        let err = seed_store(&store, &data).await.unwrap_err();
        assert!(matches!(err, NotefulError::DuplicateName { kind: "folder", .. }));
    }

    #[test]
    fn test_from_file_and_empty_document() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DOC.as_bytes()).unwrap();
        let data = SeedData::from_file(file.path()).unwrap();
        assert_eq!(data.notes.len(), 2);

        let empty = SeedData::from_json("{}").unwrap();
        assert!(empty.folders.is_empty() && empty.tags.is_empty() && empty.notes.is_empty());

        assert!(matches!(SeedData::from_json("[1, 2"), Err(NotefulError::Json(_))));
    }

    #[tokio::test]
    async fn test_seed_stores_ids_lowercased() {
        let store = SqliteStore::open_in_memory().unwrap();
        let data = SeedData::from_json(
            r#"{
                "folders": [{ "id": "ABCDEF000000000000000000", "name": "Upper" }],
                "notes": [{ "id": "ABCDEF000000000000000001", "title": "t",
                            "folderId": "ABCDEF000000000000000000" }]
            }"#,
        )
        .unwrap();

        seed_store(&store, &data).await.unwrap();
        let note = store.find_note("abcdef000000000000000001").await.unwrap().unwrap();
        assert_eq!(note.folder_id.as_deref(), Some("abcdef000000000000000000"));
        assert!(store.find_folder("abcdef000000000000000000").await.unwrap().is_some());
    }
}
