//! Translates list query parameters into store predicates.
//!
//! [`build_filter`] is the only constructor the handlers use. The resulting
//! [`Query`] is interpreted by the store (see
//! [`SqliteStore`](crate::SqliteStore), which compiles it to SQL).
//!
//! ## Semantics
//!
//! - A search term is a case-insensitive regular expression tested against
//!   `name` (folders, tags) or against `title` OR `content` (notes). An
//!   unanchored pattern matches anywhere in the value.
//! - `folderId` and `tagId` only apply to notes and are ANDed with the search.
//!   Well-formed ids are compared in lowercase.
//! - Empty-string parameters count as absent.
//! - Notes are ordered by creation time, folders and tags by name.

use crate::{NotefulError, Result};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

/// The three entity collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Note,
    Folder,
    Tag,
}

impl EntityKind {
    /// Lowercase singular name used in messages and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Folder => "folder",
            Self::Tag => "tag",
        }
    }
}

/// Optional list parameters, as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub search_term: Option<String>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub tag_id: Option<String>,
}

impl ListParams {
    /// Parameters carrying only a search term.
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search_term: Some(term.into()),
            ..Self::default()
        }
    }
}

/// Entity attributes a predicate can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Content,
    Name,
    FolderId,
}

impl Field {
    /// Column holding this attribute.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Name => "name",
            Self::FolderId => "folder_id",
        }
    }
}

/// A structured selection condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every entity.
    All,
    /// Case-insensitive regular expression search; absent values never match.
    Matches { field: Field, pattern: String },
    /// Exact equality; absent values never match.
    Equals { field: Field, value: String },
    /// The note's tag list contains this id.
    HasTag(String),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Creation time ascending, insertion order on ties.
    CreatedAsc,
    /// Name ascending by codepoint (case-sensitive).
    NameAsc,
}

/// A predicate with its ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub predicate: Predicate,
    pub order: SortOrder,
}

/// Builds the query for listing `kind` with `params`.
///
/// # Errors
///
/// [`InvalidSearch`](NotefulError::InvalidSearch) when the search term does
/// not compile.
pub fn build_filter(kind: EntityKind, params: &ListParams) -> Result<Query> {
    let mut clauses = Vec::new();

    if let Some(term) = present(&params.search_term) {
        search_regex(term)?;
        let matches = |field: Field| Predicate::Matches { field, pattern: term.to_string() };
        let clause = match kind {
            EntityKind::Note => Predicate::Or(vec![matches(Field::Title), matches(Field::Content)]),
            EntityKind::Folder | EntityKind::Tag => matches(Field::Name),
        };
        clauses.push(clause);
    }

    if kind == EntityKind::Note {
        if let Some(folder_id) = present(&params.folder_id) {
            let value = folder_id.to_ascii_lowercase();
            clauses.push(Predicate::Equals { field: Field::FolderId, value });
        }
        if let Some(tag_id) = present(&params.tag_id) {
            clauses.push(Predicate::HasTag(tag_id.to_ascii_lowercase()));
        }
    }

    let predicate = match clauses.len() {
        0 => Predicate::All,
        1 => clauses.remove(0),
        _ => Predicate::And(clauses),
    };
    let order = match kind {
        EntityKind::Note => SortOrder::CreatedAsc,
        EntityKind::Folder | EntityKind::Tag => SortOrder::NameAsc,
    };

    Ok(Query { predicate, order })
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Compiles a search term the way list queries interpret it.
///
/// # Errors
///
/// [`InvalidSearch`](NotefulError::InvalidSearch) for a malformed pattern.
pub fn search_regex(term: &str) -> Result<Regex> {
    RegexBuilder::new(term)
        .case_insensitive(true)
        .build()
        .map_err(|_| NotefulError::InvalidSearch(term.to_string()))
}

impl Predicate {
    /// Renders this predicate as an SQL condition over the `notes`, `folders`
    /// or `tags` table, pushing bind values onto `params` in order.
    ///
    /// `Matches` relies on the `iregexp` function registered by
    /// [`Storage`](crate::Storage).
    pub fn to_sql(&self, params: &mut Vec<String>) -> String {
        match self {
            Self::All => "1".to_string(),
            Self::Matches { field, pattern } => {
                params.push(pattern.clone());
                format!("iregexp({}, ?)", field.column())
            }
            Self::Equals { field, value } => {
                params.push(value.clone());
                format!("{} = ?", field.column())
            }
            Self::HasTag(tag_id) => {
                params.push(tag_id.clone());
                "EXISTS (SELECT 1 FROM note_tags nt WHERE nt.note_id = notes.id AND nt.tag_id = ?)"
                    .to_string()
            }
            Self::And(parts) => join_sql(parts, " AND ", "1", params),
            Self::Or(parts) => join_sql(parts, " OR ", "0", params),
        }
    }
}

fn join_sql(parts: &[Predicate], sep: &str, empty: &str, params: &mut Vec<String>) -> String {
    if parts.is_empty() {
        return empty.to_string();
    }
    let rendered: Vec<String> = parts.iter().map(|p| p.to_sql(params)).collect();
    format!("({})", rendered.join(sep))
}

impl SortOrder {
    /// SQL `ORDER BY` clause body.
    #[must_use]
    pub fn to_sql(self) -> &'static str {
        match self {
            Self::CreatedAsc => "created_at ASC, rowid ASC",
            Self::NameAsc => "name ASC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(kind: EntityKind, params: &ListParams) -> Query {
        build_filter(kind, params).unwrap()
    }

    #[test]
    fn test_no_params_matches_all() {
        for kind in [EntityKind::Note, EntityKind::Folder, EntityKind::Tag] {
            assert_eq!(query(kind, &ListParams::default()).predicate, Predicate::All);
        }
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let params = ListParams {
            search_term: Some(String::new()),
            folder_id: Some(String::new()),
            tag_id: Some(String::new()),
        };
        assert_eq!(query(EntityKind::Note, &params).predicate, Predicate::All);
    }

    #[test]
    fn test_note_search_is_title_or_content() {
        let query = query(EntityKind::Note, &ListParams::search("lorem"));
        assert_eq!(
            query.predicate,
            Predicate::Or(vec![
                Predicate::Matches { field: Field::Title, pattern: "lorem".into() },
                Predicate::Matches { field: Field::Content, pattern: "lorem".into() },
            ])
        );
        assert_eq!(query.order, SortOrder::CreatedAsc);
    }

    #[test]
    fn test_folder_search_is_name_and_sorted_by_name() {
        let query = query(EntityKind::Folder, &ListParams::search("wo"));
        assert_eq!(query.predicate, Predicate::Matches { field: Field::Name, pattern: "wo".into() });
        assert_eq!(query.order, SortOrder::NameAsc);
    }

    #[test]
    fn test_folder_and_tag_ids_ignored_for_named_kinds() {
        let params = ListParams {
            search_term: None,
            folder_id: Some("000000000000000000000001".into()),
            tag_id: Some("000000000000000000000002".into()),
        };
        assert_eq!(query(EntityKind::Tag, &params).predicate, Predicate::All);
    }

    #[test]
    fn test_all_note_params_combine_conjunctively() {
        let params = ListParams {
            search_term: Some("cats".into()),
            folder_id: Some("ABCDEF000000000000000001".into()),
            tag_id: Some("ABCDEF000000000000000002".into()),
        };
        match query(EntityKind::Note, &params).predicate {
            Predicate::And(parts) => {
                assert_eq!(parts.len(), 3);
                assert!(matches!(parts[0], Predicate::Or(_)));
                assert_eq!(
                    parts[1],
                    Predicate::Equals { field: Field::FolderId, value: "abcdef000000000000000001".into() }
                );
                assert_eq!(parts[2], Predicate::HasTag("abcdef000000000000000002".into()));
            }
            other => panic!("expected conjunction, got {other:?}"),
        }
    }

    #[test]
    fn test_search_term_is_a_case_insensitive_regex() {
        let re = search_regex("lo.em").unwrap();
        assert!(re.is_match("LOREM ipsum"));
        assert!(!re.is_match("lo em"));
        assert!(search_regex("^cats$").unwrap().is_match("Cats"));
    }

    #[test]
    fn test_malformed_search_term_is_rejected() {
        let err = build_filter(EntityKind::Note, &ListParams::search("lo(em")).unwrap_err();
        assert!(matches!(err, NotefulError::InvalidSearch(ref term) if term == "lo(em"));
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_to_sql_orders_params() {
        let params = ListParams {
            search_term: Some("x".into()),
            folder_id: Some("f".into()),
            tag_id: Some("t".into()),
        };
        let mut binds = Vec::new();
        let sql = query(EntityKind::Note, &params).predicate.to_sql(&mut binds);
        assert_eq!(binds, ["x", "x", "f", "t"]);
        assert!(sql.starts_with("((iregexp(title, ?) OR iregexp(content, ?)) AND folder_id = ?"));
        assert!(sql.contains("nt.tag_id = ?"));
    }

    #[test]
    fn test_all_to_sql_has_no_params() {
        let mut binds = Vec::new();
        assert_eq!(Predicate::All.to_sql(&mut binds), "1");
        assert!(binds.is_empty());
    }
}
