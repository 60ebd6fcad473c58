use crate::commands::common::{capture_editor_input_with_initial, resolve_note_id, ProfileContext};
use crate::error::CliError;

/// Open a note's HTML in `$VISUAL`/`$EDITOR` and save it when it changed.
pub async fn run_edit(context: &ProfileContext, id: &str) -> Result<(), CliError> {
    let mut workspace = context.open_workspace().await?;
    let id = resolve_note_id(workspace.notes(), id)?;
    let current = workspace
        .note(&id)
        .map(|note| note.content.clone())
        .unwrap_or_default();

    let edited = capture_editor_input_with_initial(&current)?;
    let edited = edited.trim();
    if edited.is_empty() {
        return Err(CliError::EmptyEditedContent);
    }
    if edited == current.trim() {
        println!("No changes to note {id}");
        return Ok(());
    }

    workspace.save_content(&id, edited).await?;
    println!("Saved note {id}");
    Ok(())
}
