//! Note model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::FolderId;
use crate::editor::html_to_plain_text;

/// Title given to notes created from the sidebar.
pub const DEFAULT_NOTE_TITLE: &str = "Untitled";

/// Type label given to notes created from the sidebar.
pub const DEFAULT_NOTE_TYPE: &str = "doc";

/// A note identifier. The backend generates these (`gen_random_uuid()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Generate a random note ID (in-memory store and tests)
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// A note row as stored in the `notes` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Owner (auth user id)
    pub user_id: String,
    pub title: String,
    /// Editor HTML
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// Free-form type label ("doc" by default)
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub note_type: String,
    /// Per-user ordering integer
    pub position: i64,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Plain-text preview of the HTML content, truncated to `max_chars`
    #[must_use]
    pub fn plain_text_preview(&self, max_chars: usize) -> String {
        let text = html_to_plain_text(&self.content);
        let first_line = text.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
        let char_count = first_line.chars().count();
        if char_count <= max_chars {
            return first_line.trim().to_string();
        }
        let truncated = first_line
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        format!("{}...", truncated.trim_end())
    }

    /// Title for display; blank titles fall back to the default title
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_NOTE_TITLE
        } else {
            &self.title
        }
    }

    #[must_use]
    pub fn is_in_folder(&self, folder_id: &FolderId) -> bool {
        self.folder_id.as_ref() == Some(folder_id)
    }
}

/// Insert payload for a new note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub note_type: String,
    pub user_id: String,
    pub position: i64,
    pub folder_id: Option<FolderId>,
}

impl NewNote {
    /// An empty "Untitled" doc for `user_id` at `position`
    pub fn untitled(user_id: impl Into<String>, position: i64, folder_id: Option<FolderId>) -> Self {
        Self {
            title: DEFAULT_NOTE_TITLE.to_string(),
            content: String::new(),
            note_type: DEFAULT_NOTE_TYPE.to_string(),
            user_id: user_id.into(),
            position,
            folder_id,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Sparse update payload for the `notes` table.
///
/// Unset fields are left out of the request body. `folder_id: Some(None)`
/// is sent as `null`, which detaches the note from its folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub note_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<Option<FolderId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl NotePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn note_type(note_type: impl Into<String>) -> Self {
        Self {
            note_type: Some(note_type.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn position(position: i64) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn folder(folder_id: Option<FolderId>) -> Self {
        Self {
            folder_id: Some(folder_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Self::default()
        }
    }

    /// Check if the patch carries no changes
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.note_type.is_none()
            && self.position.is_none()
            && self.folder_id.is_none()
            && self.is_favorite.is_none()
    }

    /// Apply the patch to a local copy of the row
    pub fn apply_to(&self, note: &mut Note, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            note.title.clone_from(title);
        }
        if let Some(content) = &self.content {
            note.content.clone_from(content);
        }
        if let Some(note_type) = &self.note_type {
            note.note_type.clone_from(note_type);
        }
        if let Some(position) = self.position {
            note.position = position;
        }
        if let Some(folder_id) = self.folder_id {
            note.folder_id = folder_id;
        }
        if let Some(is_favorite) = self.is_favorite {
            note.is_favorite = is_favorite;
        }
        note.updated_at = now;
    }
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_note(content: &str) -> Note {
        let now = Utc::now();
        Note {
            id: NoteId::new(),
            user_id: "user-1".to_string(),
            title: "Untitled".to_string(),
            content: content.to_string(),
            note_type: "doc".to_string(),
            position: 1,
            folder_id: None,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_note_id_parse() {
        let id = NoteId::new();
        let parsed: NoteId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<NoteId>().is_err());
    }

    #[test]
    fn deserializes_backend_row() {
        let row = r#"{
            "id": "6c1f2f4e-8a42-4d0b-9b1e-2d6f7b9a0c11",
            "user_id": "user-1",
            "title": "Groceries",
            "content": null,
            "type": "doc",
            "created_at": "2024-03-01T10:00:00.123456+00:00",
            "updated_at": "2024-03-01T10:05:00+00:00",
            "position": 3,
            "folder_id": null
        }"#;

        let note: Note = serde_json::from_str(row).unwrap();
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "");
        assert_eq!(note.note_type, "doc");
        assert_eq!(note.position, 3);
        assert_eq!(note.folder_id, None);
        assert!(!note.is_favorite);
    }

    #[test]
    fn new_note_defaults_match_sidebar_insert() {
        let payload = NewNote::untitled("user-1", 4, None);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Untitled",
                "content": "",
                "type": "doc",
                "user_id": "user-1",
                "position": 4,
                "folder_id": null
            })
        );
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let json = serde_json::to_value(NotePatch::title("Renamed")).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "Renamed" }));
    }

    #[test]
    fn patch_detach_serializes_null_folder() {
        let json = serde_json::to_value(NotePatch::folder(None)).unwrap();
        assert_eq!(json, serde_json::json!({ "folder_id": null }));
    }

    #[test]
    fn patch_apply_updates_fields() {
        let mut note = sample_note("");
        let folder = FolderId::new();
        let mut patch = NotePatch::folder(Some(folder));
        patch.is_favorite = Some(true);
        patch.apply_to(&mut note, Utc::now());
        assert_eq!(note.folder_id, Some(folder));
        assert!(note.is_favorite);
        assert!(NotePatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn plain_text_preview_strips_markup_and_truncates() {
        let note = sample_note("<p><strong>Hello</strong> world, this is long</p>");
        assert_eq!(note.plain_text_preview(80), "Hello world, this is long");
        assert_eq!(note.plain_text_preview(10), "Hello w...");
    }

    #[test]
    fn display_title_falls_back_for_blank_titles() {
        let mut note = sample_note("");
        note.title = "   ".to_string();
        assert_eq!(note.display_title(), "Untitled");
    }
}
