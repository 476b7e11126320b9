use super::{required, Outcome};
use crate::core::filter::{build_filter, EntityKind, ListParams};
use crate::core::integrity::release_tag;
use crate::core::note::now_millis;
use crate::{ensure_valid_id, new_id, NameInput, NoteStore, Result, Tag};
use std::sync::Arc;

/// Tags resource. Deleting a tag strips it from every note first.
pub struct TagsHandler {
    store: Arc<dyn NoteStore>,
}

impl TagsHandler {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, params: &ListParams) -> Result<Outcome<Vec<Tag>>> {
        let query = build_filter(EntityKind::Tag, params)?;
        Ok(Outcome::Ok(self.store.find_tags(query).await?))
    }

    pub async fn get(&self, id: &str) -> Result<Outcome<Tag>> {
        let id = ensure_valid_id("id", id)?;
        Ok(Outcome::found(self.store.find_tag(&id).await?))
    }

    pub async fn create(&self, input: NameInput) -> Result<Outcome<Tag>> {
        let name = required("name", input.name)?;
        let now = now_millis();
        let tag = Tag {
            id: new_id(),
            name,
            created_at: now,
            updated_at: now,
        };
        let created = self.store.insert_tag(tag).await?;
        log::info!("created tag {} ({})", created.id, created.name);
        Ok(Outcome::Created(created))
    }

    pub async fn update(&self, id: &str, input: NameInput) -> Result<Outcome<Tag>> {
        let id = ensure_valid_id("id", id)?;
        let name = required("name", input.name)?;
        Ok(Outcome::found(self.store.rename_tag(&id, name, now_millis()).await?))
    }

    /// Pulls the tag from every note, then removes it.
    pub async fn delete(&self, id: &str) -> Result<Outcome<()>> {
        let id = ensure_valid_id("id", id)?;
        release_tag(self.store.as_ref(), &id).await?;
        if self.store.remove_tag(&id).await? {
            log::info!("deleted tag {id}");
            Ok(Outcome::NoContent)
        } else {
            Ok(Outcome::NotFound)
        }
    }
}
