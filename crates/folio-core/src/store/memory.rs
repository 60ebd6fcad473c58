//! In-process [`NoteStore`] used by tests and offline demos.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use super::NoteStore;
use crate::models::{Folder, FolderId, FolderPatch, NewFolder, NewNote, Note, NoteId, NotePatch};
use crate::{Error, Result};

/// Store operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    ListNotes,
    GetNote,
    InsertNote,
    UpdateNote,
    DeleteNote,
    DetachFolderNotes,
    ListFolders,
    InsertFolder,
    UpdateFolder,
    DeleteFolder,
}

#[derive(Default)]
struct MemoryState {
    notes: Vec<Note>,
    folders: Vec<Folder>,
    failures: HashMap<StoreOperation, InjectedFailure>,
}

struct InjectedFailure {
    /// Calls that still succeed before the failure fires
    skip: usize,
    message: String,
}

impl MemoryState {
    fn take_failure(&mut self, operation: StoreOperation) -> Result<()> {
        let Some(failure) = self.failures.get_mut(&operation) else {
            return Ok(());
        };
        if failure.skip > 0 {
            failure.skip -= 1;
            return Ok(());
        }
        let message = self
            .failures
            .remove(&operation)
            .map(|failure| failure.message)
            .unwrap_or_default();
        Err(Error::Backend(message))
    }

    /// Mirrors `notes.folder_id references folders(id)` plus the
    /// same-owner row policy.
    fn check_folder_reference(&self, user_id: &str, folder_id: Option<&FolderId>) -> Result<()> {
        let Some(folder_id) = folder_id else {
            return Ok(());
        };
        if self
            .folders
            .iter()
            .any(|folder| &folder.id == folder_id && folder.user_id == user_id)
        {
            Ok(())
        } else {
            Err(Error::Backend(
                "insert or update on table \"notes\" violates foreign key constraint \"notes_folder_id_fkey\" (409)"
                    .to_string(),
            ))
        }
    }
}

/// Owner-scoped rows behind a `tokio` mutex. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call to `operation` fail with `message`.
    pub async fn fail_next(&self, operation: StoreOperation, message: impl Into<String>) {
        self.fail_nth(operation, 1, message).await;
    }

    /// Make the `nth` call (1-based) to `operation` fail once; earlier
    /// calls succeed.
    pub async fn fail_nth(&self, operation: StoreOperation, nth: usize, message: impl Into<String>) {
        self.state.lock().await.failures.insert(
            operation,
            InjectedFailure {
                skip: nth.saturating_sub(1),
                message: message.into(),
            },
        );
    }

    /// Every stored note regardless of owner, in position order
    pub async fn all_notes(&self) -> Vec<Note> {
        let mut notes = self.state.lock().await.notes.clone();
        notes.sort_by_key(|note| note.position);
        notes
    }

    pub async fn all_folders(&self) -> Vec<Folder> {
        let mut folders = self.state.lock().await.folders.clone();
        folders.sort_by_key(|folder| folder.position);
        folders
    }
}

impl NoteStore for MemoryStore {
    async fn list_notes(&self, user_id: &str) -> Result<Vec<Note>> {
        let mut state = self.state.lock().await;
        state.take_failure(StoreOperation::ListNotes)?;
        let mut notes = state
            .notes
            .iter()
            .filter(|note| note.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        notes.sort_by_key(|note| note.position);
        Ok(notes)
    }

    async fn get_note(&self, id: &NoteId) -> Result<Option<Note>> {
        let mut state = self.state.lock().await;
        state.take_failure(StoreOperation::GetNote)?;
        Ok(state.notes.iter().find(|note| &note.id == id).cloned())
    }

    async fn insert_note(&self, note: &NewNote) -> Result<Note> {
        let mut state = self.state.lock().await;
        state.take_failure(StoreOperation::InsertNote)?;
        state.check_folder_reference(&note.user_id, note.folder_id.as_ref())?;

        let now = Utc::now();
        let stored = Note {
            id: NoteId::new(),
            user_id: note.user_id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            note_type: note.note_type.clone(),
            position: note.position,
            folder_id: note.folder_id,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        };
        state.notes.push(stored.clone());
        Ok(stored)
    }

    async fn update_note(&self, id: &NoteId, patch: &NotePatch) -> Result<()> {
        let mut state = self.state.lock().await;
        state.take_failure(StoreOperation::UpdateNote)?;
        let Some(index) = state.notes.iter().position(|note| &note.id == id) else {
            // PostgREST answers an update that matches no rows with success
            return Ok(());
        };
        if let Some(folder_id) = &patch.folder_id {
            let user_id = state.notes[index].user_id.clone();
            state.check_folder_reference(&user_id, folder_id.as_ref())?;
        }
        patch.apply_to(&mut state.notes[index], Utc::now());
        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.take_failure(StoreOperation::DeleteNote)?;
        state.notes.retain(|note| &note.id != id);
        Ok(())
    }

    async fn detach_folder_notes(&self, folder_id: &FolderId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.take_failure(StoreOperation::DetachFolderNotes)?;
        let now = Utc::now();
        for note in state
            .notes
            .iter_mut()
            .filter(|note| note.is_in_folder(folder_id))
        {
            note.folder_id = None;
            note.updated_at = now;
        }
        Ok(())
    }

    async fn list_folders(&self, user_id: &str) -> Result<Vec<Folder>> {
        let mut state = self.state.lock().await;
        state.take_failure(StoreOperation::ListFolders)?;
        let mut folders = state
            .folders
            .iter()
            .filter(|folder| folder.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        folders.sort_by_key(|folder| folder.position);
        Ok(folders)
    }

    async fn insert_folder(&self, folder: &NewFolder) -> Result<Folder> {
        let mut state = self.state.lock().await;
        state.take_failure(StoreOperation::InsertFolder)?;
        let now = Utc::now();
        let stored = Folder {
            id: FolderId::new(),
            user_id: folder.user_id.clone(),
            name: folder.name.clone(),
            position: folder.position,
            created_at: now,
            updated_at: now,
        };
        state.folders.push(stored.clone());
        Ok(stored)
    }

    async fn update_folder(&self, id: &FolderId, patch: &FolderPatch) -> Result<()> {
        let mut state = self.state.lock().await;
        state.take_failure(StoreOperation::UpdateFolder)?;
        if let Some(folder) = state.folders.iter_mut().find(|folder| &folder.id == id) {
            patch.apply_to(folder, Utc::now());
        }
        Ok(())
    }

    async fn delete_folder(&self, id: &FolderId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.take_failure(StoreOperation::DeleteFolder)?;
        if state.notes.iter().any(|note| note.is_in_folder(id)) {
            return Err(Error::Backend(
                "update or delete on table \"folders\" violates foreign key constraint \"notes_folder_id_fkey\" on table \"notes\" (409)"
                    .to_string(),
            ));
        }
        state.folders.retain(|folder| &folder.id != id);
        Ok(())
    }
}
