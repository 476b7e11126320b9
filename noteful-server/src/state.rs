use std::sync::Arc;

use noteful_core::{FoldersHandler, NoteStore, NotesHandler, TagsHandler};

/// Shared router state: one handler per resource over a single store.
pub struct AppState {
    pub notes: NotesHandler,
    pub folders: FoldersHandler,
    pub tags: TagsHandler,
}

impl AppState {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self {
            notes: NotesHandler::new(Arc::clone(&store)),
            folders: FoldersHandler::new(Arc::clone(&store)),
            tags: TagsHandler::new(store),
        }
    }
}
