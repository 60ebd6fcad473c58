//! Data models for Folio

mod folder;
mod note;

pub use folder::{normalize_folder_name, Folder, FolderId, FolderPatch, NewFolder};
pub use note::{NewNote, Note, NoteId, NotePatch, DEFAULT_NOTE_TITLE, DEFAULT_NOTE_TYPE};
