//! Drag-and-drop resolution for the sidebar.
//!
//! Notes are draggable; notes, folders and the "All Notes" entry are drop
//! targets. Dropping a note on a folder files it there, dropping it on
//! "All Notes" unfiles it, and dropping it on another note reorders.

use crate::models::{Folder, FolderId, NoteId};

/// Droppable id of the "All Notes" sidebar entry
pub const ALL_NOTES_DROP_ID: &str = "all-notes";

/// Pointer travel, in pixels, before a press turns into a drag
pub const ACTIVATION_DISTANCE_PX: f64 = 5.0;

/// Tracks whether a pointer press has moved far enough to start dragging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragActivation {
    origin: (f64, f64),
}

impl DragActivation {
    #[must_use]
    pub const fn start(x: f64, y: f64) -> Self {
        Self { origin: (x, y) }
    }

    #[must_use]
    pub fn has_activated(&self, x: f64, y: f64) -> bool {
        let (dx, dy) = (x - self.origin.0, y - self.origin.1);
        dx.hypot(dy) >= ACTIVATION_DISTANCE_PX
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    AllNotes,
    Folder(FolderId),
    Note(NoteId),
}

impl DropTarget {
    /// Classify a droppable id. Folder ids are checked against the known
    /// folders; anything else that parses as an id is a note.
    #[must_use]
    pub fn parse(over_id: &str, folders: &[Folder]) -> Option<Self> {
        let over_id = over_id.trim();
        if over_id == ALL_NOTES_DROP_ID {
            return Some(Self::AllNotes);
        }
        if let Some(folder) = folders
            .iter()
            .find(|folder| folder.id.to_string() == over_id)
        {
            return Some(Self::Folder(folder.id));
        }
        over_id.parse().ok().map(Self::Note)
    }
}

/// What a finished drag should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    MoveToFolder {
        note: NoteId,
        folder: Option<FolderId>,
    },
    Reorder {
        active: NoteId,
        over: NoteId,
    },
}

/// Resolve a drag end. Dropping outside any target, or onto the dragged
/// note itself, does nothing.
#[must_use]
pub fn resolve_drag_end(active: NoteId, over: Option<DropTarget>) -> Option<DragOutcome> {
    match over? {
        DropTarget::AllNotes => Some(DragOutcome::MoveToFolder {
            note: active,
            folder: None,
        }),
        DropTarget::Folder(folder) => Some(DragOutcome::MoveToFolder {
            note: active,
            folder: Some(folder),
        }),
        DropTarget::Note(over) if over == active => None,
        DropTarget::Note(over) => Some(DragOutcome::Reorder { active, over }),
    }
}

/// Move the item at `from` to `to`, shifting the items in between.
/// Out-of-range indices leave the list unchanged.
#[must_use]
pub fn array_move<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut moved = items.to_vec();
    if from >= moved.len() || to >= moved.len() {
        return moved;
    }
    let item = moved.remove(from);
    moved.insert(to, item);
    moved
}
