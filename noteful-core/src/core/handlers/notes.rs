use super::{required, Outcome};
use crate::core::filter::{build_filter, EntityKind, ListParams};
use crate::core::note::{now_millis, NoteChanges};
use crate::{ensure_valid_id, new_id, Note, NoteInput, NoteStore, Result};
use std::sync::Arc;

/// Notes resource: search/filter listing, CRUD, tag- and folder-aware writes.
pub struct NotesHandler {
    store: Arc<dyn NoteStore>,
}

impl NotesHandler {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    /// Lists notes matching `params`, oldest first.
    pub async fn list(&self, params: &ListParams) -> Result<Outcome<Vec<Note>>> {
        let query = build_filter(EntityKind::Note, params)?;
        Ok(Outcome::Ok(self.store.find_notes(query).await?))
    }

    pub async fn get(&self, id: &str) -> Result<Outcome<Note>> {
        let id = ensure_valid_id("id", id)?;
        Ok(Outcome::found(self.store.find_note(&id).await?))
    }

    /// Creates a note with a server-assigned id and timestamps.
    ///
    /// # Errors
    ///
    /// [`MissingField`](crate::NotefulError::MissingField) without a title,
    /// [`InvalidId`](crate::NotefulError::InvalidId) for a malformed
    /// `folderId` or tag id. Referenced folders and tags are not required to
    /// exist.
    pub async fn create(&self, input: NoteInput) -> Result<Outcome<Note>> {
        let changes = validate(input)?;
        let now = now_millis();
        let note = Note {
            id: new_id(),
            title: changes.title,
            content: changes.content,
            folder_id: changes.folder_id,
            tags: changes.tags,
            created_at: now,
            updated_at: now,
        };
        let created = self.store.insert_note(note).await?;
        log::info!("created note {}", created.id);
        Ok(Outcome::Created(created))
    }

    /// Replaces title, content, folder and tags of an existing note.
    ///
    /// Fields omitted from `input` are cleared, not preserved.
    pub async fn update(&self, id: &str, input: NoteInput) -> Result<Outcome<Note>> {
        let id = ensure_valid_id("id", id)?;
        let changes = validate(input)?;
        Ok(Outcome::found(self.store.replace_note(&id, changes, now_millis()).await?))
    }

    pub async fn delete(&self, id: &str) -> Result<Outcome<()>> {
        let id = ensure_valid_id("id", id)?;
        if self.store.remove_note(&id).await? {
            log::info!("deleted note {id}");
            Ok(Outcome::NoContent)
        } else {
            Ok(Outcome::NotFound)
        }
    }
}

fn validate(input: NoteInput) -> Result<NoteChanges> {
    let title = required("title", input.title)?;

    let folder_id = match input.folder_id.filter(|f| !f.is_empty()) {
        Some(folder_id) => Some(ensure_valid_id("folderId", &folder_id)?),
        None => None,
    };

    let tags = input
        .tags
        .unwrap_or_default()
        .iter()
        .map(|tag_id| ensure_valid_id("tags", tag_id))
        .collect::<Result<Vec<_>>>()?;

    Ok(NoteChanges {
        title,
        content: input.content,
        folder_id,
        tags,
    })
}
