//! Sidebar filtering: title search, folder scope, type and favorites.

use serde::{Deserialize, Serialize};

use crate::models::{FolderId, Note};

/// Active list filters. The default shows every note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFilter {
    /// Case-insensitive title substring, matched as typed; empty matches
    /// everything
    pub query: String,
    /// `None` is the "All Notes" view
    pub folder: Option<FolderId>,
    pub note_type: Option<String>,
    pub favorites_only: bool,
}

impl NoteFilter {
    #[must_use]
    pub fn matches(&self, note: &Note) -> bool {
        self.matches_with_query(note, &self.query.to_lowercase())
    }

    fn matches_with_query(&self, note: &Note, lowered_query: &str) -> bool {
        if !lowered_query.is_empty() && !note.title.to_lowercase().contains(lowered_query) {
            return false;
        }
        if let Some(folder) = &self.folder {
            if !note.is_in_folder(folder) {
                return false;
            }
        }
        if let Some(note_type) = &self.note_type {
            if note.note_type.to_lowercase() != note_type.trim().to_lowercase() {
                return false;
            }
        }
        !self.favorites_only || note.is_favorite
    }

    /// Notes passing every filter, in their original order
    #[must_use]
    pub fn apply<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        let query = self.query.to_lowercase();
        notes
            .iter()
            .filter(|note| self.matches_with_query(note, &query))
            .collect()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
            || self.folder.is_some()
            || self.note_type.is_some()
            || self.favorites_only
    }
}

/// Distinct note types, sorted, for the type filter picker
#[must_use]
pub fn collect_note_types(notes: &[Note]) -> Vec<String> {
    let mut types = notes
        .iter()
        .map(|note| note.note_type.trim())
        .filter(|note_type| !note_type.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    types.sort();
    types.dedup();
    types
}
