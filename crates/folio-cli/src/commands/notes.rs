use folio_core::dnd::DragOutcome;
use folio_core::editor::html_to_plain_text;
use folio_core::share::NoteMetadata;
use folio_core::store::NoteStore;
use folio_core::Workspace;

use crate::cli::ListFilters;
use crate::commands::common::{
    format_note_lines, normalize_search_query, note_to_list_item, print_toasts,
    resolve_drop_target, resolve_folder_id, resolve_note_id, NoteListItem, ProfileContext,
};
use crate::error::CliError;

/// Apply `--folder`, `--type` and `--favorites` to the workspace filter.
pub fn apply_filters<S: NoteStore>(
    workspace: &mut Workspace<S>,
    filters: &ListFilters,
) -> Result<(), CliError> {
    if let Some(folder) = &filters.folder {
        let folder = resolve_folder_id(workspace.folders(), folder)?;
        workspace.select_folder(Some(folder))?;
    }
    workspace.set_type_filter(filters.note_type.as_deref());
    workspace.set_favorites_only(filters.favorites);
    Ok(())
}

/// Lines (or JSON items) for the notes passing the workspace filters
pub fn render_note_list<S: NoteStore>(workspace: &Workspace<S>, json: bool) -> Result<String, CliError> {
    let notes = workspace.filtered_notes();
    if json {
        let items = notes
            .iter()
            .map(|note| note_to_list_item(note, workspace.folders()))
            .collect::<Vec<NoteListItem>>();
        return Ok(serde_json::to_string_pretty(&items)?);
    }

    if notes.is_empty() {
        return Ok(if workspace.filter().is_active() {
            "No matching notes.".to_string()
        } else {
            "No notes yet.".to_string()
        });
    }

    let mut lines = vec![workspace.list_heading()];
    lines.extend(format_note_lines(&notes, workspace.folders()));
    Ok(lines.join("\n"))
}

pub async fn run_list(
    context: &ProfileContext,
    filters: &ListFilters,
    json: bool,
) -> Result<(), CliError> {
    let mut workspace = context.open_workspace().await?;
    apply_filters(&mut workspace, filters)?;
    println!("{}", render_note_list(&workspace, json)?);
    Ok(())
}

pub async fn run_search(
    context: &ProfileContext,
    query: &str,
    filters: &ListFilters,
    json: bool,
) -> Result<(), CliError> {
    let query = normalize_search_query(query)?;
    let mut workspace = context.open_workspace().await?;
    apply_filters(&mut workspace, filters)?;
    workspace.set_search_query(query);
    println!("{}", render_note_list(&workspace, json)?);
    Ok(())
}

pub async fn run_new(
    context: &ProfileContext,
    folder: Option<&str>,
    title: Option<&str>,
) -> Result<(), CliError> {
    let mut workspace = context.open_workspace().await?;
    create_note(&mut workspace, folder, title).await?;
    print_toasts(workspace.take_toasts());
    Ok(())
}

pub async fn create_note<S: NoteStore>(
    workspace: &mut Workspace<S>,
    folder: Option<&str>,
    title: Option<&str>,
) -> Result<(), CliError> {
    let folder = folder
        .map(|folder| resolve_folder_id(workspace.folders(), folder))
        .transpose()?;
    let id = workspace.add_note(folder).await?;
    if let Some(title) = title.map(str::trim).filter(|title| !title.is_empty()) {
        workspace.rename_note(&id, title).await?;
    }
    workspace.stop_editing();
    println!("{id}");
    Ok(())
}

pub async fn run_show(context: &ProfileContext, id: &str, html: bool) -> Result<(), CliError> {
    let workspace = context.open_workspace().await?;
    let id = resolve_note_id(workspace.notes(), id)?;
    let Some(note) = workspace.note(&id) else {
        return Err(CliError::NoteNotFound(id.to_string()));
    };

    println!("{}", note.display_title());
    let metadata = NoteMetadata::new(note.created_at, note.updated_at, &note.note_type);
    for (label, value) in &metadata.rows {
        println!("{label}: {value}");
    }
    if let Some(folder) = note.folder_id.and_then(|folder| workspace.folder(&folder)) {
        println!("Folder: {}", folder.name);
    }
    if note.is_favorite {
        println!("Favorite: yes");
    }
    println!();
    if html {
        println!("{}", note.content);
    } else {
        println!("{}", html_to_plain_text(&note.content));
    }
    Ok(())
}

pub async fn run_rename(context: &ProfileContext, id: &str, title: &str) -> Result<(), CliError> {
    let mut workspace = context.open_workspace().await?;
    let id = resolve_note_id(workspace.notes(), id)?;
    workspace.rename_note(&id, title).await?;
    println!("Renamed note {id}");
    Ok(())
}

pub async fn run_delete(context: &ProfileContext, id: &str) -> Result<(), CliError> {
    let mut workspace = context.open_workspace().await?;
    let id = resolve_note_id(workspace.notes(), id)?;
    workspace.delete_note(&id).await?;
    println!("Deleted note {id}");
    Ok(())
}

pub async fn run_move(
    context: &ProfileContext,
    id: &str,
    folder: Option<&str>,
    all_notes: bool,
) -> Result<(), CliError> {
    if folder.is_none() && !all_notes {
        return Err(CliError::Config(
            "Pass --folder <FOLDER> or --all-notes".to_string(),
        ));
    }

    let mut workspace = context.open_workspace().await?;
    let id = resolve_note_id(workspace.notes(), id)?;
    let folder = folder
        .map(|folder| resolve_folder_id(workspace.folders(), folder))
        .transpose()?;
    workspace.move_note(&id, folder).await?;
    print_toasts(workspace.take_toasts());
    Ok(())
}

pub async fn run_reorder(context: &ProfileContext, id: &str, over: &str) -> Result<(), CliError> {
    let mut workspace = context.open_workspace().await?;
    let active = resolve_note_id(workspace.notes(), id)?;
    let over = resolve_note_id(workspace.notes(), over)?;
    workspace.reorder_notes(&active, &over).await?;
    println!("Moved note {active} to position {}", position_label(&workspace, &active));
    Ok(())
}

pub async fn run_drop(context: &ProfileContext, id: &str, target: &str) -> Result<(), CliError> {
    let mut workspace = context.open_workspace().await?;
    let active = resolve_note_id(workspace.notes(), id)?;
    let over_id = resolve_drop_target(workspace.notes(), workspace.folders(), target)?;
    let outcome = workspace.handle_drag_end(&active, Some(over_id.as_str())).await?;
    print_toasts(workspace.take_toasts());

    match outcome {
        Some(DragOutcome::Reorder { active, .. }) => {
            println!("Moved note {active} to position {}", position_label(&workspace, &active));
        }
        Some(DragOutcome::MoveToFolder { .. }) => {}
        None => println!("Nothing to do"),
    }
    Ok(())
}

pub async fn run_favorite(context: &ProfileContext, id: &str) -> Result<(), CliError> {
    let mut workspace = context.open_workspace().await?;
    let id = resolve_note_id(workspace.notes(), id)?;
    if workspace.toggle_favorite(&id).await? {
        println!("Added {id} to favorites");
    } else {
        println!("Removed {id} from favorites");
    }
    Ok(())
}

pub async fn run_type(context: &ProfileContext, id: &str, note_type: &str) -> Result<(), CliError> {
    let mut workspace = context.open_workspace().await?;
    let id = resolve_note_id(workspace.notes(), id)?;
    workspace.set_note_type(&id, note_type).await?;
    println!("Set type of {id} to {}", note_type.trim());
    Ok(())
}

fn position_label<S: NoteStore>(workspace: &Workspace<S>, id: &folio_core::NoteId) -> String {
    workspace
        .note(id)
        .map_or_else(|| "?".to_string(), |note| note.position.to_string())
}
