//! Reference cleanup run before a folder or tag is removed.
//!
//! Both functions are the first half of a two-step delete: cleanup, then
//! removal of the parent record. The two steps are separate store calls and
//! are not wrapped in a transaction. If the process dies in between, the
//! references are already gone but the folder or tag row survives; a repeated
//! delete finishes the job.

use crate::core::note::now_millis;
use crate::{NoteStore, Result};

/// Unsets `folderId` on every note filed in `folder_id`.
///
/// Runs whether or not the folder exists; with no matching notes it is a
/// no-op. Returns the number of notes touched.
///
/// # Errors
///
/// Propagates any store failure unchanged.
pub async fn release_folder(store: &dyn NoteStore, folder_id: &str) -> Result<usize> {
    let touched = store.clear_folder_refs(folder_id, now_millis()).await?;
    if touched > 0 {
        log::info!("cleared folder {folder_id} from {touched} note(s)");
    }
    Ok(touched)
}

/// Pulls `tag_id` out of every note's tag list.
///
/// Scans all notes, not only those known to carry the tag. Returns the
/// number of notes touched.
///
/// # Errors
///
/// Propagates any store failure unchanged.
pub async fn release_tag(store: &dyn NoteStore, tag_id: &str) -> Result<usize> {
    let touched = store.pull_tag_refs(tag_id, now_millis()).await?;
    if touched > 0 {
        log::info!("removed tag {tag_id} from {touched} note(s)");
    }
    Ok(touched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{new_id, Note, SqliteStore};

    fn note(folder_id: Option<&str>, tags: &[&str]) -> Note {
        let at = now_millis();
        Note {
            id: new_id(),
            title: "n".to_string(),
            content: None,
            folder_id: folder_id.map(str::to_string),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_release_folder_without_references_is_noop() {
        let store = SqliteStore::open_in_memory().unwrap();
        let untouched = store.insert_note(note(Some("f2"), &[])).await.unwrap();

        assert_eq!(release_folder(&store, "f1").await.unwrap(), 0);

        let after = store.find_note(&untouched.id).await.unwrap().unwrap();
        assert_eq!(after, untouched);
    }

    #[tokio::test]
    async fn test_release_folder_refreshes_updated_at() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut filed = note(Some("f1"), &[]);
        filed.updated_at = crate::core::note::from_millis(0);
        let filed = store.insert_note(filed).await.unwrap();

        assert_eq!(release_folder(&store, "f1").await.unwrap(), 1);

        let after = store.find_note(&filed.id).await.unwrap().unwrap();
        assert!(after.folder_id.is_none());
        assert!(after.updated_at > filed.updated_at);
    }

    #[tokio::test]
    async fn test_release_tag_touches_every_carrier() {
        let store = SqliteStore::open_in_memory().unwrap();
        let n1 = store.insert_note(note(None, &["t", "x"])).await.unwrap();
        let n2 = store.insert_note(note(None, &["t"])).await.unwrap();
        let n3 = store.insert_note(note(None, &["x"])).await.unwrap();

        assert_eq!(release_tag(&store, "t").await.unwrap(), 2);

        assert_eq!(store.find_note(&n1.id).await.unwrap().unwrap().tags, ["x"]);
        assert!(store.find_note(&n2.id).await.unwrap().unwrap().tags.is_empty());
        assert_eq!(store.find_note(&n3.id).await.unwrap().unwrap(), n3);
    }
}
