//! Core library for Noteful, a small notes service with folders and tags.
//!
//! The entry points are the three resource handlers, [`NotesHandler`],
//! [`FoldersHandler`] and [`TagsHandler`], each constructed over an injected
//! [`NoteStore`]. [`SqliteStore`] is the bundled store implementation.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    error::{NotefulError, Result},
    filter::{build_filter, EntityKind, ListParams, Predicate, Query, SortOrder},
    handlers::{FoldersHandler, NotesHandler, Outcome, TagsHandler},
    id::{ensure_valid_id, is_valid_id, new_id},
    integrity::{release_folder, release_tag},
    note::{Folder, Identified, NameInput, Note, NoteChanges, NoteInput, Tag},
    seed::{seed_store, SeedData, SeedReport},
    storage::Storage,
    store::{NoteStore, SqliteStore},
};
