//! The notes page controller.
//!
//! A [`Workspace`] holds what the sidebar and editor show for one signed-in
//! user: notes and folders in position order, the selected note, the note
//! whose title is being edited, filters, expanded folders and pending
//! toasts. Remote-backed actions call the store first and only touch local
//! state once the call succeeds; a failure raises an error toast and is
//! returned to the caller.

mod toast;


use std::collections::HashSet;

use chrono::Utc;

pub use toast::{Toast, ToastLevel};

use crate::dnd::{array_move, resolve_drag_end, DragOutcome, DropTarget};
use crate::editor::{append_html, render_blocks, Block, ResizableImage};
use crate::filter::{collect_note_types, NoteFilter};
use crate::import::{ImportMode, ImportedDocument};
use crate::models::{
    normalize_folder_name, Folder, FolderId, FolderPatch, NewFolder, NewNote, Note, NoteId,
    NotePatch,
};
use crate::store::NoteStore;
use crate::{Error, Result};

const FETCH_NOTES: &str = "Error fetching notes";
const FETCH_FOLDERS: &str = "Error fetching folders";
const CREATE_NOTE: &str = "Error creating note";
const UPDATE_TITLE: &str = "Error updating note title";
const DELETE_NOTE: &str = "Error deleting note";
const REORDER_NOTES: &str = "Error reordering notes";
const CREATE_FOLDER: &str = "Error creating folder";
const RENAME_FOLDER: &str = "Error renaming folder";
const DETACH_NOTES: &str = "Error updating notes";
const DELETE_FOLDER: &str = "Error deleting folder";
const MOVE_NOTE: &str = "Error moving note";
const SAVE_NOTE: &str = "Error saving note";
const UPDATE_TYPE: &str = "Error updating note type";
const UPDATE_FAVORITE: &str = "Error updating favorite";

pub const NOTE_MOVED_MESSAGE: &str = "Note moved successfully";
pub const SHARE_LINK_MESSAGE: &str = "Share link ready";
pub const ALL_NOTES_HEADING: &str = "All Notes";

pub struct Workspace<S: NoteStore> {
    store: S,
    user_id: String,
    notes: Vec<Note>,
    folders: Vec<Folder>,
    selected_note: Option<NoteId>,
    editing_note: Option<NoteId>,
    filter: NoteFilter,
    expanded_folders: HashSet<FolderId>,
    toasts: Vec<Toast>,
}

impl<S: NoteStore> Workspace<S> {
    /// An empty workspace; call [`Workspace::refresh`] to fill it.
    pub fn new(store: S, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            notes: Vec::new(),
            folders: Vec::new(),
            selected_note: None,
            editing_note: None,
            filter: NoteFilter::default(),
            expanded_folders: HashSet::new(),
            toasts: Vec::new(),
        }
    }

    /// Build a workspace and fetch the user's notes and folders.
    pub async fn load(store: S, user_id: impl Into<String>) -> Result<Self> {
        let mut workspace = Self::new(store, user_id);
        workspace.refresh().await?;
        Ok(workspace)
    }

    /// Re-fetch notes and folders concurrently. Each list is replaced only
    /// when its own fetch succeeds.
    pub async fn refresh(&mut self) -> Result<()> {
        let (notes, folders) = tokio::join!(
            self.store.list_notes(&self.user_id),
            self.store.list_folders(&self.user_id)
        );

        let mut first_error = None;
        match self.settle(FETCH_NOTES, notes) {
            Ok(notes) => self.notes = notes,
            Err(error) => first_error = Some(error),
        }
        match self.settle(FETCH_FOLDERS, folders) {
            Ok(folders) => self.folders = folders,
            Err(error) => {
                first_error.get_or_insert(error);
            }
        }
        self.drop_stale_references();

        first_error.map_or(Ok(()), Err)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Notes in position order
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Folders in position order
    #[must_use]
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    #[must_use]
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    #[must_use]
    pub fn folder(&self, id: &FolderId) -> Option<&Folder> {
        self.folders.iter().find(|folder| &folder.id == id)
    }

    #[must_use]
    pub fn selected_note(&self) -> Option<&Note> {
        self.selected_note.as_ref().and_then(|id| self.note(id))
    }

    /// Note whose title is in edit mode
    #[must_use]
    pub const fn editing_note(&self) -> Option<NoteId> {
        self.editing_note
    }

    #[must_use]
    pub const fn filter(&self) -> &NoteFilter {
        &self.filter
    }

    #[must_use]
    pub const fn selected_folder(&self) -> Option<FolderId> {
        self.filter.folder
    }

    /// Drain pending notifications, oldest first
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    /// Create an "Untitled" note at the end of the list, select it and put
    /// its title in edit mode.
    pub async fn add_note(&mut self, folder: Option<FolderId>) -> Result<NoteId> {
        let payload = NewNote::untitled(self.user_id.clone(), self.next_note_position(), folder);
        let result = self.store.insert_note(&payload).await;
        let note = self.settle(CREATE_NOTE, result)?;

        let id = note.id;
        tracing::info!("Created note {}", id);
        self.notes.push(note);
        self.selected_note = Some(id);
        self.editing_note = Some(id);
        Ok(id)
    }

    /// Create a note in the currently selected folder (or unfiled when the
    /// "All Notes" view is active).
    pub async fn add_note_here(&mut self) -> Result<NoteId> {
        self.add_note(self.filter.folder).await
    }

    pub fn select_note(&mut self, id: &NoteId) -> Result<()> {
        self.require_note(id)?;
        self.selected_note = Some(*id);
        self.editing_note = None;
        Ok(())
    }

    pub fn start_editing(&mut self, id: &NoteId) -> Result<()> {
        self.require_note(id)?;
        self.editing_note = Some(*id);
        Ok(())
    }

    pub fn stop_editing(&mut self) {
        self.editing_note = None;
    }

    pub async fn rename_note(&mut self, id: &NoteId, title: &str) -> Result<()> {
        self.patch_note(id, NotePatch::title(title), UPDATE_TITLE)
            .await
    }

    pub async fn delete_note(&mut self, id: &NoteId) -> Result<()> {
        self.require_note(id)?;
        let result = self.store.delete_note(id).await;
        self.settle(DELETE_NOTE, result)?;

        tracing::info!("Deleted note {}", id);
        self.notes.retain(|note| &note.id != id);
        if self.selected_note.as_ref() == Some(id) {
            self.selected_note = None;
        }
        if self.editing_note.as_ref() == Some(id) {
            self.editing_note = None;
        }
        Ok(())
    }

    /// Move `active` to the index `over` occupies in the full list and
    /// renumber positions from 1. Only rows whose position changed are
    /// written. When a write fails, local state falls back to the previous
    /// order with just the already persisted positions applied.
    pub async fn reorder_notes(&mut self, active: &NoteId, over: &NoteId) -> Result<()> {
        let from = self.note_index(active)?;
        let to = self.note_index(over)?;
        if from == to {
            return Ok(());
        }

        let mut previous = self.notes.clone();
        let mut reordered = array_move(&self.notes, from, to);
        let mut changed = Vec::new();
        for (position, note) in (1_i64..).zip(reordered.iter_mut()) {
            if note.position != position {
                note.position = position;
                changed.push((note.id, position));
            }
        }
        self.notes = reordered;

        for (written, (id, position)) in changed.iter().enumerate() {
            let result = self.store.update_note(id, &NotePatch::position(*position)).await;
            if let Err(error) = self.settle(REORDER_NOTES, result) {
                for (persisted, position) in &changed[..written] {
                    if let Some(note) = previous.iter_mut().find(|note| &note.id == persisted) {
                        note.position = *position;
                    }
                }
                previous.sort_by_key(|note| note.position);
                self.notes = previous;
                return Err(error);
            }
        }
        tracing::info!("Reordered note {} to index {}", active, to);
        Ok(())
    }

    /// File a note into a folder, or unfile it with `None`.
    pub async fn move_note(&mut self, id: &NoteId, folder: Option<FolderId>) -> Result<()> {
        if let Some(folder) = &folder {
            self.require_folder(folder)?;
        }
        self.patch_note(id, NotePatch::folder(folder), MOVE_NOTE)
            .await?;
        self.toasts.push(Toast::success(NOTE_MOVED_MESSAGE));
        Ok(())
    }

    /// Persist new editor HTML for a note.
    pub async fn save_content(&mut self, id: &NoteId, html: &str) -> Result<()> {
        self.patch_note(id, NotePatch::content(html), SAVE_NOTE).await
    }

    pub async fn set_note_type(&mut self, id: &NoteId, note_type: &str) -> Result<()> {
        let note_type = note_type.trim();
        if note_type.is_empty() {
            return Err(Error::InvalidInput("Note type must not be empty".to_string()));
        }
        self.patch_note(id, NotePatch::note_type(note_type), UPDATE_TYPE)
            .await
    }

    /// Flip the favorite flag and return the new value.
    pub async fn toggle_favorite(&mut self, id: &NoteId) -> Result<bool> {
        let is_favorite = !self.require_note(id)?.is_favorite;
        self.patch_note(id, NotePatch::favorite(is_favorite), UPDATE_FAVORITE)
            .await?;
        Ok(is_favorite)
    }

    /// Put an imported file's HTML into a note, replacing or appending.
    pub async fn import_into_note(
        &mut self,
        id: &NoteId,
        document: &ImportedDocument,
        mode: ImportMode,
    ) -> Result<()> {
        let content = mode.apply(&self.require_note(id)?.content, &document.html);
        self.save_content(id, &content).await
    }

    /// Append rendered blocks to the end of a note.
    pub async fn append_blocks(&mut self, id: &NoteId, blocks: &[Block]) -> Result<()> {
        let content = append_html(&self.require_note(id)?.content, &render_blocks(blocks));
        self.save_content(id, &content).await
    }

    pub async fn insert_image(&mut self, id: &NoteId, image: ResizableImage) -> Result<()> {
        self.append_blocks(id, &[Block::Image(image)]).await
    }

    /// Public link for a note
    pub fn share_link(&mut self, site_url: &str, id: &NoteId) -> Result<String> {
        self.require_note(id)?;
        let link = crate::share::share_link(site_url, id)?;
        self.toasts.push(Toast::success(SHARE_LINK_MESSAGE));
        Ok(link)
    }

    // ------------------------------------------------------------------
    // Folders
    // ------------------------------------------------------------------

    pub async fn create_folder(&mut self, name: &str) -> Result<FolderId> {
        let name = require_folder_name(name)?;
        let payload = NewFolder {
            name,
            user_id: self.user_id.clone(),
            position: next_position(self.folders.len()),
        };
        let result = self.store.insert_folder(&payload).await;
        let folder = self.settle(CREATE_FOLDER, result)?;

        let id = folder.id;
        tracing::info!("Created folder {}", id);
        self.folders.push(folder);
        Ok(id)
    }

    pub async fn rename_folder(&mut self, id: &FolderId, name: &str) -> Result<()> {
        self.require_folder(id)?;
        let patch = FolderPatch::name(require_folder_name(name)?);
        let result = self.store.update_folder(id, &patch).await;
        self.settle(RENAME_FOLDER, result)?;

        if let Some(folder) = self.folders.iter_mut().find(|folder| &folder.id == id) {
            patch.apply_to(folder, Utc::now());
        }
        Ok(())
    }

    /// Unfile the folder's notes, then delete the folder. Notes stay
    /// unfiled locally when only the folder delete fails, since the detach
    /// already reached the backend.
    pub async fn delete_folder(&mut self, id: &FolderId) -> Result<()> {
        self.require_folder(id)?;

        let result = self.store.detach_folder_notes(id).await;
        self.settle(DETACH_NOTES, result)?;
        let now = Utc::now();
        for note in self.notes.iter_mut().filter(|note| note.is_in_folder(id)) {
            note.folder_id = None;
            note.updated_at = now;
        }

        let result = self.store.delete_folder(id).await;
        self.settle(DELETE_FOLDER, result)?;

        tracing::info!("Deleted folder {}", id);
        self.folders.retain(|folder| &folder.id != id);
        self.expanded_folders.remove(id);
        if self.filter.folder.as_ref() == Some(id) {
            self.filter.folder = None;
        }
        Ok(())
    }

    /// Scope the list to a folder, or back to "All Notes" with `None`.
    pub fn select_folder(&mut self, folder: Option<FolderId>) -> Result<()> {
        if let Some(folder) = &folder {
            self.require_folder(folder)?;
        }
        self.filter.folder = folder;
        Ok(())
    }

    /// Expand or collapse a folder in the sidebar; returns whether it is
    /// now expanded.
    pub fn toggle_folder_expanded(&mut self, id: &FolderId) -> Result<bool> {
        self.require_folder(id)?;
        if self.expanded_folders.remove(id) {
            Ok(false)
        } else {
            self.expanded_folders.insert(*id);
            Ok(true)
        }
    }

    #[must_use]
    pub fn is_folder_expanded(&self, id: &FolderId) -> bool {
        self.expanded_folders.contains(id)
    }

    #[must_use]
    pub fn notes_in_folder(&self, id: &FolderId) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|note| note.is_in_folder(id))
            .collect()
    }

    /// "All Notes" or "Notes in <folder>"
    #[must_use]
    pub fn list_heading(&self) -> String {
        self.filter
            .folder
            .as_ref()
            .and_then(|id| self.folder(id))
            .map_or_else(
                || ALL_NOTES_HEADING.to_string(),
                |folder| format!("Notes in {}", folder.name),
            )
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
    }

    /// Filter by type; `None` or a blank value clears the filter.
    pub fn set_type_filter(&mut self, note_type: Option<&str>) {
        self.filter.note_type = note_type
            .map(str::trim)
            .filter(|note_type| !note_type.is_empty())
            .map(str::to_string);
    }

    pub fn set_favorites_only(&mut self, favorites_only: bool) {
        self.filter.favorites_only = favorites_only;
    }

    /// Notes passing the active filters, in position order
    #[must_use]
    pub fn filtered_notes(&self) -> Vec<&Note> {
        self.filter.apply(&self.notes)
    }

    #[must_use]
    pub fn note_types(&self) -> Vec<String> {
        collect_note_types(&self.notes)
    }

    // ------------------------------------------------------------------
    // Drag and drop
    // ------------------------------------------------------------------

    /// Apply a finished drag of `active` onto the droppable `over_id`.
    /// Returns what was done, or `None` when the drop was a no-op.
    pub async fn handle_drag_end(
        &mut self,
        active: &NoteId,
        over_id: Option<&str>,
    ) -> Result<Option<DragOutcome>> {
        self.require_note(active)?;
        let target = over_id.and_then(|over_id| DropTarget::parse(over_id, &self.folders));
        let outcome = resolve_drag_end(*active, target);

        match outcome {
            Some(DragOutcome::MoveToFolder { note, folder }) => {
                self.move_note(&note, folder).await?;
            }
            Some(DragOutcome::Reorder { active, over }) => {
                self.reorder_notes(&active, &over).await?;
            }
            None => {}
        }
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Turn a store error into a toast plus an action-tagged error.
    fn settle<T>(&mut self, action: &'static str, result: Result<T>) -> Result<T> {
        result.map_err(|error| {
            let error = error.during(action);
            tracing::warn!("{}", error);
            self.toasts.push(Toast::error(error.to_string()));
            error
        })
    }

    async fn patch_note(
        &mut self,
        id: &NoteId,
        patch: NotePatch,
        action: &'static str,
    ) -> Result<()> {
        self.require_note(id)?;
        let result = self.store.update_note(id, &patch).await;
        self.settle(action, result)?;

        if let Some(note) = self.notes.iter_mut().find(|note| &note.id == id) {
            patch.apply_to(note, Utc::now());
        }
        Ok(())
    }

    fn require_note(&self, id: &NoteId) -> Result<&Note> {
        self.note(id)
            .ok_or_else(|| Error::NotFound(format!("note {id}")))
    }

    fn require_folder(&self, id: &FolderId) -> Result<&Folder> {
        self.folder(id)
            .ok_or_else(|| Error::NotFound(format!("folder {id}")))
    }

    fn note_index(&self, id: &NoteId) -> Result<usize> {
        self.notes
            .iter()
            .position(|note| &note.id == id)
            .ok_or_else(|| Error::NotFound(format!("note {id}")))
    }

    fn next_note_position(&self) -> i64 {
        next_position(self.notes.len())
    }

    fn drop_stale_references(&mut self) {
        let notes = &self.notes;
        let exists = |id: &NoteId| notes.iter().any(|note| &note.id == id);
        if !self.selected_note.as_ref().is_some_and(exists) {
            self.selected_note = None;
        }
        if !self.editing_note.as_ref().is_some_and(exists) {
            self.editing_note = None;
        }

        let folders = &self.folders;
        if let Some(folder) = self.filter.folder {
            if !folders.iter().any(|candidate| candidate.id == folder) {
                self.filter.folder = None;
            }
        }
        self.expanded_folders
            .retain(|id| folders.iter().any(|folder| &folder.id == id));
    }
}

fn next_position(len: usize) -> i64 {
    i64::try_from(len).map_or(i64::MAX, |len| len.saturating_add(1))
}

fn require_folder_name(name: &str) -> Result<String> {
    normalize_folder_name(name)
        .ok_or_else(|| Error::InvalidInput("Folder name must not be empty".to_string()))
}
