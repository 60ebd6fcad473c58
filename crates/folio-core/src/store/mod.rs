//! Backend access for notes and folders.
//!
//! [`NoteStore`] is a thin pass-through to the hosted tables: rows are
//! filtered by owner and ordered by position, and nothing is cached.

mod memory;
mod rest;

pub use memory::{MemoryStore, StoreOperation};
pub use rest::RestStore;

use crate::models::{Folder, FolderId, FolderPatch, NewFolder, NewNote, Note, NoteId, NotePatch};
use crate::Result;

/// Trait for note and folder storage operations
#[allow(async_fn_in_trait)]
pub trait NoteStore {
    /// List a user's notes, lowest position first
    async fn list_notes(&self, user_id: &str) -> Result<Vec<Note>>;

    /// Get a single note by ID (used by the shared view)
    async fn get_note(&self, id: &NoteId) -> Result<Option<Note>>;

    /// Insert a note and return the stored row
    async fn insert_note(&self, note: &NewNote) -> Result<Note>;

    /// Apply a sparse update to a note
    async fn update_note(&self, id: &NoteId, patch: &NotePatch) -> Result<()>;

    async fn delete_note(&self, id: &NoteId) -> Result<()>;

    /// Set `folder_id = null` on every note filed in the folder
    async fn detach_folder_notes(&self, folder_id: &FolderId) -> Result<()>;

    /// List a user's folders, lowest position first
    async fn list_folders(&self, user_id: &str) -> Result<Vec<Folder>>;

    /// Insert a folder and return the stored row
    async fn insert_folder(&self, folder: &NewFolder) -> Result<Folder>;

    async fn update_folder(&self, id: &FolderId, patch: &FolderPatch) -> Result<()>;

    async fn delete_folder(&self, id: &FolderId) -> Result<()>;
}
