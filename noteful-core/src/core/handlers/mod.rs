//! Resource handlers for notes, folders and tags.
//!
//! Each handler owns an injected `Arc<dyn NoteStore>` and exposes the same
//! five operations: `list`, `get`, `create`, `update` and `delete`. A call
//! validates its input first and returns before touching the store when
//! validation fails. Otherwise it issues its store calls and yields exactly
//! one terminal value: an [`Outcome`] or an error.

pub mod folders;
pub mod notes;
pub mod tags;

use crate::{NotefulError, Result};

#[doc(inline)]
pub use folders::FoldersHandler;
#[doc(inline)]
pub use notes::NotesHandler;
#[doc(inline)]
pub use tags::TagsHandler;

/// The successful (non-error) result of a handler call, shaped like an HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// 200 with a body.
    Ok(T),
    /// 201 with the new entity.
    Created(T),
    /// 204, no body.
    NoContent,
    /// 404; the addressed record does not exist.
    NotFound,
}

impl<T> Outcome<T> {
    /// `Ok(value)` when present, `NotFound` otherwise.
    pub fn found(value: Option<T>) -> Self {
        value.map_or(Self::NotFound, Self::Ok)
    }

    /// HTTP status code for this outcome.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Ok(_) => 200,
            Self::Created(_) => 201,
            Self::NoContent => 204,
            Self::NotFound => 404,
        }
    }

    /// The carried entity, if any.
    pub fn into_body(self) -> Option<T> {
        match self {
            Self::Ok(value) | Self::Created(value) => Some(value),
            Self::NoContent | Self::NotFound => None,
        }
    }
}

/// Returns the value of a required body field, treating `""` as missing.
fn required(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(NotefulError::MissingField(field.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_status_codes() {
        assert_eq!(Outcome::Ok(()).status(), 200);
        assert_eq!(Outcome::Created(()).status(), 201);
        assert_eq!(Outcome::<()>::NoContent.status(), 204);
        assert_eq!(Outcome::<()>::NotFound.status(), 404);
    }

    #[test]
    fn test_found() {
        assert_eq!(Outcome::found(Some(3)), Outcome::Ok(3));
        assert_eq!(Outcome::<i32>::found(None), Outcome::NotFound);
        assert_eq!(Outcome::Created(1).into_body(), Some(1));
        assert_eq!(Outcome::<i32>::NoContent.into_body(), None);
    }

    #[test]
    fn test_required_rejects_missing_and_empty() {
        assert!(matches!(required("title", None), Err(NotefulError::MissingField(f)) if f == "title"));
        assert!(required("title", Some(String::new())).is_err());
        assert_eq!(required("title", Some("T".into())).unwrap(), "T");
    }
}
