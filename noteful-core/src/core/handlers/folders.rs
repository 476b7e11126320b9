use super::{required, Outcome};
use crate::core::filter::{build_filter, EntityKind, ListParams};
use crate::core::integrity::release_folder;
use crate::core::note::now_millis;
use crate::{ensure_valid_id, new_id, Folder, NameInput, NoteStore, Result};
use std::sync::Arc;

/// Folders resource. Deleting a folder unfiles its notes; it never deletes them.
pub struct FoldersHandler {
    store: Arc<dyn NoteStore>,
}

impl FoldersHandler {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    /// Lists folders matching `params`, by name.
    pub async fn list(&self, params: &ListParams) -> Result<Outcome<Vec<Folder>>> {
        let query = build_filter(EntityKind::Folder, params)?;
        Ok(Outcome::Ok(self.store.find_folders(query).await?))
    }

    pub async fn get(&self, id: &str) -> Result<Outcome<Folder>> {
        let id = ensure_valid_id("id", id)?;
        Ok(Outcome::found(self.store.find_folder(&id).await?))
    }

    /// # Errors
    ///
    /// [`MissingField`](crate::NotefulError::MissingField) without a name,
    /// [`DuplicateName`](crate::NotefulError::DuplicateName) when the name is taken.
    pub async fn create(&self, input: NameInput) -> Result<Outcome<Folder>> {
        let name = required("name", input.name)?;
        let now = now_millis();
        let folder = Folder {
            id: new_id(),
            name,
            created_at: now,
            updated_at: now,
        };
        let created = self.store.insert_folder(folder).await?;
        log::info!("created folder {} ({})", created.id, created.name);
        Ok(Outcome::Created(created))
    }

    pub async fn update(&self, id: &str, input: NameInput) -> Result<Outcome<Folder>> {
        let id = ensure_valid_id("id", id)?;
        let name = required("name", input.name)?;
        Ok(Outcome::found(self.store.rename_folder(&id, name, now_millis()).await?))
    }

    /// Unfiles every note in the folder, then removes the folder.
    ///
    /// The cleanup runs even when the folder does not exist, in which case
    /// the result is still [`Outcome::NotFound`].
    pub async fn delete(&self, id: &str) -> Result<Outcome<()>> {
        let id = ensure_valid_id("id", id)?;
        release_folder(self.store.as_ref(), &id).await?;
        if self.store.remove_folder(&id).await? {
            log::info!("deleted folder {id}");
            Ok(Outcome::NoContent)
        } else {
            Ok(Outcome::NotFound)
        }
    }
}
