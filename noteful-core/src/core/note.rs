//! Entity records and request payloads.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A note, optionally filed in one folder and carrying an ordered list of tag ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A uniquely named folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A uniquely named tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Anything addressable by its identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Note {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Folder {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Tag {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Create/update body for a note. Every field is optional at the wire level;
/// the handler decides what is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Create/update body for a folder or tag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameInput {
    #[serde(default)]
    pub name: Option<String>,
}

/// The validated replacement state for an existing note.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteChanges {
    pub title: String,
    pub content: Option<String>,
    pub folder_id: Option<String>,
    pub tags: Vec<String>,
}

/// Current time truncated to whole milliseconds, the precision the store keeps.
#[must_use]
pub fn now_millis() -> DateTime<Utc> {
    from_millis(Utc::now().timestamp_millis())
}

/// Converts stored epoch milliseconds back into a timestamp.
#[must_use]
pub fn from_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_note() -> Note {
        let at = from_millis(1_700_000_000_123);
        Note {
            id: "000000000000000000000001".to_string(),
            title: "Test Note".to_string(),
            content: None,
            folder_id: None,
            tags: vec![],
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_note_serializes_camel_case_without_absent_fields() {
        let json = serde_json::to_value(sample_note()).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["createdAt", "id", "tags", "title", "updatedAt"]);
    }

    #[test]
    fn test_note_with_folder_serializes_folder_id() {
        let mut note = sample_note();
        note.folder_id = Some("111111111111111111111111".to_string());
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["folderId"], "111111111111111111111111");
    }

    #[test]
    fn test_folder_keys() {
        let at = now_millis();
        let folder = Folder { id: "a".repeat(24), name: "Work".into(), created_at: at, updated_at: at };
        let json = serde_json::to_value(&folder).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["createdAt", "id", "name", "updatedAt"]);
    }

    #[test]
    fn test_note_input_accepts_partial_body() {
        let input: NoteInput = serde_json::from_str(r#"{"title":"T","folderId":null}"#).unwrap();
        assert_eq!(input.title.as_deref(), Some("T"));
        assert!(input.folder_id.is_none());
        assert!(input.tags.is_none());
    }

    #[test]
    fn test_now_millis_round_trips_through_millis() {
        let now = now_millis();
        assert_eq!(from_millis(now.timestamp_millis()), now);
    }
}
