//! Error types for the Noteful core library.

use thiserror::Error;

/// All errors that can occur within the Noteful core library.
///
/// The first four variants are client errors raised before any store access
/// (or, for [`DuplicateName`](Self::DuplicateName), translated from a storage
/// constraint). Everything else is a store failure passed through unchanged.
#[derive(Debug, Error)]
pub enum NotefulError {
    /// A path parameter or foreign-key value is not a well-formed identifier.
    #[error("Invalid `{field}` identifier: {value}")]
    InvalidId { field: String, value: String },

    /// A required body field was absent or empty.
    #[error("Missing `{0}` in request body")]
    MissingField(String),

    /// A Folder or Tag with the same name already exists.
    #[error("The {kind} name already exists")]
    DuplicateName { kind: &'static str, name: String },

    /// The search term is not a valid regular expression.
    #[error("Invalid `searchTerm`: {0}")]
    InvalidSearch(String),

    /// A SQLite operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The opened file is not a valid Noteful database.
    #[error("Invalid database: {0}")]
    InvalidDatabase(String),

    /// A blocking store task panicked or was cancelled.
    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Seed or request data could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`NotefulError`].
pub type Result<T> = std::result::Result<T, NotefulError>;

impl NotefulError {
    /// Builds an [`InvalidId`](Self::InvalidId) error for `field`.
    pub fn invalid_id(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidId {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns the HTTP status code this error maps to.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidId { .. }
            | Self::MissingField(_)
            | Self::DuplicateName { .. }
            | Self::InvalidSearch(_) => 400,
            _ => 500,
        }
    }

    /// Returns a short, human-readable message suitable for an API response body.
    ///
    /// Store failures collapse to a generic message; the full error is meant
    /// for the log, not the client.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidId { field, .. } if field == "id" => "Invalid ':id'".to_string(),
            Self::InvalidId { field, .. } => format!("Invalid `{field}` ':id'"),
            Self::MissingField(_) | Self::DuplicateName { .. } | Self::InvalidSearch(_) => {
                self.to_string()
            }
            _ => "Internal Server Error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        assert_eq!(NotefulError::invalid_id("id", "nope").status(), 400);
        assert_eq!(NotefulError::MissingField("title".into()).status(), 400);
        let dup = NotefulError::DuplicateName { kind: "folder", name: "Work".into() };
        assert_eq!(dup.status(), 400);
        assert_eq!(NotefulError::InvalidSearch("unclosed group".into()).status(), 400);
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(NotefulError::invalid_id("id", "x").user_message(), "Invalid ':id'");
        assert_eq!(
            NotefulError::invalid_id("folderId", "x").user_message(),
            "Invalid `folderId` ':id'"
        );
        assert_eq!(
            NotefulError::MissingField("name".into()).user_message(),
            "Missing `name` in request body"
        );
        let dup = NotefulError::DuplicateName { kind: "folder", name: "Work".into() };
        assert_eq!(dup.user_message(), "The folder name already exists");
        assert_eq!(
            NotefulError::InvalidSearch("lo(em".into()).user_message(),
            "Invalid `searchTerm`: lo(em"
        );
    }

    #[test]
    fn test_store_errors_are_opaque() {
        let e = NotefulError::InvalidDatabase("missing tables".into());
        assert_eq!(e.status(), 500);
        assert_eq!(e.user_message(), "Internal Server Error");
    }
}
