use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use folio_core::config::BackendConfig;
use folio_core::dnd::ALL_NOTES_DROP_ID;
use folio_core::store::RestStore;
use folio_core::util::short_id;
use folio_core::{Folder, FolderId, Note, NoteId, Toast, Workspace};
use serde::Serialize;

use crate::auth::{auth_client, CliAuthClient};
use crate::config_profiles::{process_env, CliProfilesConfig};
use crate::error::CliError;

const PREVIEW_CHARS: usize = 40;
const AMBIGUOUS_MATCH_LIMIT: usize = 3;

/// A resolved profile and the backend it points at
pub struct ProfileContext {
    pub name: String,
    pub backend: BackendConfig,
}

impl ProfileContext {
    pub fn load(global_profile: Option<&str>) -> Result<Self, CliError> {
        let config = CliProfilesConfig::load()?;
        let name = config.resolve_profile_name(global_profile);
        let backend = config
            .profile(&name)
            .cloned()
            .unwrap_or_default()
            .backend_config(process_env)?;
        Ok(Self { name, backend })
    }

    pub fn auth_client(&self) -> Result<CliAuthClient, CliError> {
        Ok(auth_client(&self.name, &self.backend)?)
    }

    /// Restore the signed-in session and fetch the user's notes and folders.
    pub async fn open_workspace(&self) -> Result<Workspace<RestStore>, CliError> {
        let session = self
            .auth_client()?
            .restore_session()
            .await?
            .ok_or_else(|| CliError::NotSignedIn(self.name.clone()))?;
        let store = RestStore::new(&self.backend, session.access_token.as_str())?;
        Ok(Workspace::load(store, session.user.id).await?)
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub note_type: String,
    pub position: i64,
    pub folder_id: Option<String>,
    pub folder: Option<String>,
    pub is_favorite: bool,
    pub preview: String,
    pub created_at: String,
    pub updated_at: String,
    pub relative_time: String,
}

#[derive(Debug, Serialize)]
pub struct FolderListItem {
    pub id: String,
    pub name: String,
    pub position: i64,
    pub note_count: usize,
}

pub fn note_to_list_item(note: &Note, folders: &[Folder]) -> NoteListItem {
    let now_ms = Utc::now().timestamp_millis();
    NoteListItem {
        id: note.id.to_string(),
        title: note.display_title().to_string(),
        note_type: note.note_type.clone(),
        position: note.position,
        folder_id: note.folder_id.map(|id| id.to_string()),
        folder: folder_name(note, folders).map(str::to_string),
        is_favorite: note.is_favorite,
        preview: note.plain_text_preview(PREVIEW_CHARS),
        created_at: note.created_at.to_rfc3339(),
        updated_at: note.updated_at.to_rfc3339(),
        relative_time: format_relative_time(note.updated_at.timestamp_millis(), now_ms),
    }
}

pub fn folder_to_list_item(folder: &Folder, notes: &[Note]) -> FolderListItem {
    FolderListItem {
        id: folder.id.to_string(),
        name: folder.name.clone(),
        position: folder.position,
        note_count: notes.iter().filter(|note| note.is_in_folder(&folder.id)).count(),
    }
}

/// `<short id>  <title>  <type>  <age>  [* favorite] [folder]`
pub fn format_note_lines(notes: &[&Note], folders: &[Folder]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    notes
        .iter()
        .map(|note| {
            let short_id = short_id(&note.id.to_string());
            let title = truncate(note.display_title(), 30);
            let relative_time = format_relative_time(note.updated_at.timestamp_millis(), now_ms);
            let mut line = format!(
                "{short_id:<13}  {title:<30}  {:<8}  {relative_time:<8}",
                note.note_type
            );
            if note.is_favorite {
                line.push_str("  *");
            }
            if let Some(folder) = folder_name(note, folders) {
                line.push_str("  [");
                line.push_str(folder);
                line.push(']');
            }
            line.trim_end().to_string()
        })
        .collect()
}

pub fn format_folder_lines(folders: &[Folder], notes: &[Note]) -> Vec<String> {
    folders
        .iter()
        .map(|folder| {
            let item = folder_to_list_item(folder, notes);
            let short_id = short_id(&item.id);
            let label = if item.note_count == 1 { "note" } else { "notes" };
            format!("{short_id:<13}  {:<30}  {} {label}", item.name, item.note_count)
        })
        .collect()
}

fn folder_name<'a>(note: &Note, folders: &'a [Folder]) -> Option<&'a str> {
    let folder_id = note.folder_id?;
    folders
        .iter()
        .find(|folder| folder.id == folder_id)
        .map(|folder| folder.name.as_str())
}

pub fn truncate(value: &str, max_chars: usize) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let mut truncated = collapsed
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Print success toasts. Error toasts carry the same text as the error the
/// command returns, which `main` prints.
pub fn print_toasts(toasts: Vec<Toast>) {
    for toast in toasts.into_iter().filter(|toast| !toast.is_error()) {
        println!("{}", toast.message);
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let id = id.trim();
    if id.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(id.to_string())
    }
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let query = query.trim();
    if query.is_empty() {
        Err(CliError::EmptySearchQuery)
    } else {
        Ok(query.to_string())
    }
}

/// Resolve a full note id or a unique id prefix.
pub fn resolve_note_id(notes: &[Note], query: &str) -> Result<NoteId, CliError> {
    let query = normalize_note_identifier(query)?;
    if let Ok(id) = query.parse::<NoteId>() {
        if notes.iter().any(|note| note.id == id) {
            return Ok(id);
        }
    }

    let prefix = query.to_ascii_lowercase();
    let matches = notes
        .iter()
        .filter(|note| note.id.to_string().starts_with(&prefix))
        .map(|note| note.id)
        .collect::<Vec<_>>();

    match matches.as_slice() {
        [] => Err(CliError::NoteNotFound(query)),
        [id] => Ok(*id),
        _ => Err(ambiguous("ID prefix", &query, matches.iter().map(NoteId::to_string))),
    }
}

/// Resolve a folder by full id, exact name, case-insensitive name or id
/// prefix, in that order.
pub fn resolve_folder_id(folders: &[Folder], query: &str) -> Result<FolderId, CliError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::FolderNotFound(String::new()));
    }
    if let Ok(id) = query.parse::<FolderId>() {
        if folders.iter().any(|folder| folder.id == id) {
            return Ok(id);
        }
    }
    if let Some(folder) = folders.iter().find(|folder| folder.name == query) {
        return Ok(folder.id);
    }

    let by_name = folders
        .iter()
        .filter(|folder| folder.name.eq_ignore_ascii_case(query))
        .collect::<Vec<_>>();
    match by_name.as_slice() {
        [folder] => return Ok(folder.id),
        [] => {}
        _ => {
            return Err(ambiguous(
                "Folder name",
                query,
                by_name.iter().map(|folder| folder.id.to_string()),
            ))
        }
    }

    let prefix = query.to_ascii_lowercase();
    let matches = folders
        .iter()
        .filter(|folder| folder.id.to_string().starts_with(&prefix))
        .map(|folder| folder.id)
        .collect::<Vec<_>>();
    match matches.as_slice() {
        [] => Err(CliError::FolderNotFound(query.to_string())),
        [id] => Ok(*id),
        _ => Err(ambiguous("Folder prefix", query, matches.iter().map(FolderId::to_string))),
    }
}

/// Turn a `drop` target into the droppable id the workspace understands:
/// `all-notes`, a folder (exact name or id) or a note (id or prefix).
pub fn resolve_drop_target(
    notes: &[Note],
    folders: &[Folder],
    target: &str,
) -> Result<String, CliError> {
    let target = target.trim();
    if target.eq_ignore_ascii_case(ALL_NOTES_DROP_ID) {
        return Ok(ALL_NOTES_DROP_ID.to_string());
    }
    if let Some(folder) = folders
        .iter()
        .find(|folder| folder.name == target || folder.id.to_string() == target)
    {
        return Ok(folder.id.to_string());
    }
    match resolve_note_id(notes, target) {
        Ok(id) => Ok(id.to_string()),
        Err(CliError::NoteNotFound(_)) => resolve_folder_id(folders, target)
            .map(|id| id.to_string())
            .map_err(|_| CliError::NoteNotFound(target.to_string())),
        Err(error) => Err(error),
    }
}

fn ambiguous(label: &str, query: &str, ids: impl Iterator<Item = String>) -> CliError {
    let options = ids
        .take(AMBIGUOUS_MATCH_LIMIT)
        .map(|id| short_id(&id))
        .collect::<Vec<_>>()
        .join(", ");
    CliError::Ambiguous(format!("{label} '{query}' is ambiguous; matches: {options}"))
}

pub fn capture_editor_input_with_initial(initial_content: &str) -> Result<String, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let edited = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(edited)
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let status = Command::new(program).args(parts).arg(file_path).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("folio-note-{}-{now}.html", std::process::id()))
}
