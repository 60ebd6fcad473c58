use folio_core::editor::html_to_plain_text;
use folio_core::share::SharedNote;
use folio_core::store::RestStore;
use folio_core::NoteId;

use crate::commands::common::{normalize_note_identifier, print_toasts, resolve_note_id, ProfileContext};
use crate::error::CliError;

pub async fn run_share(context: &ProfileContext, id: &str) -> Result<(), CliError> {
    let site_url = context
        .backend
        .share_origin()
        .ok_or(CliError::MissingSiteUrl)?
        .to_string();

    let mut workspace = context.open_workspace().await?;
    let id = resolve_note_id(workspace.notes(), id)?;
    let link = workspace.share_link(&site_url, &id)?;
    print_toasts(workspace.take_toasts());
    println!("{link}");
    Ok(())
}

/// Read a note the way the public shared page does: anonymously, by full id.
pub async fn run_shared(context: &ProfileContext, id: &str, html: bool) -> Result<(), CliError> {
    let raw_id = normalize_note_identifier(id)?;
    let id = raw_id
        .parse::<NoteId>()
        .map_err(|_| CliError::NoteNotFound(raw_id.clone()))?;

    let store = RestStore::anonymous(&context.backend)?;
    let note = SharedNote::fetch(&store, &id)
        .await?
        .ok_or(CliError::NoteNotFound(raw_id))?;

    println!("{}", render_shared_text(&note, html));
    Ok(())
}

pub fn render_shared_text(note: &SharedNote, html: bool) -> String {
    let mut lines = vec![note.title.clone()];
    lines.extend(
        note.metadata()
            .rows
            .iter()
            .map(|(label, value)| format!("{label}: {value}")),
    );
    lines.push(String::new());
    if html {
        lines.push(note.content.clone());
    } else {
        lines.push(html_to_plain_text(&note.content));
    }
    lines.join("\n")
}
