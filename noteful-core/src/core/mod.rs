//! Internal domain modules for the Noteful core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod error;
pub mod filter;
pub mod handlers;
pub mod id;
pub mod integrity;
pub mod note;
pub mod seed;
pub mod storage;
pub mod store;

#[doc(inline)]
pub use error::{NotefulError, Result};
#[doc(inline)]
pub use filter::{build_filter, EntityKind, ListParams, Predicate, Query, SortOrder};
#[doc(inline)]
pub use handlers::{FoldersHandler, NotesHandler, Outcome, TagsHandler};
#[doc(inline)]
pub use id::{ensure_valid_id, is_valid_id, new_id};
#[doc(inline)]
pub use integrity::{release_folder, release_tag};
#[doc(inline)]
pub use note::{Folder, Identified, NameInput, Note, NoteChanges, NoteInput, Tag};
#[doc(inline)]
pub use seed::{seed_store, SeedData, SeedReport};
#[doc(inline)]
pub use storage::Storage;
#[doc(inline)]
pub use store::{NoteStore, SqliteStore};
