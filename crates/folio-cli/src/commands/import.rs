use std::path::Path;

use folio_core::editor::ResizableImage;
use folio_core::import::{import_file, ImportMode, ImportOptions};

use crate::commands::common::{resolve_note_id, ProfileContext};
use crate::error::CliError;

pub async fn run_import(
    context: &ProfileContext,
    id: &str,
    file: &Path,
    append: bool,
    render_markdown: bool,
) -> Result<(), CliError> {
    let document = import_file(file, ImportOptions { render_markdown })?;
    let mode = if append {
        ImportMode::Append
    } else {
        ImportMode::Replace
    };

    let mut workspace = context.open_workspace().await?;
    let id = resolve_note_id(workspace.notes(), id)?;
    workspace.import_into_note(&id, &document, mode).await?;
    println!("Imported {} into note {id}", file.display());
    Ok(())
}

pub async fn run_image(
    context: &ProfileContext,
    id: &str,
    file: &Path,
    width: Option<&str>,
) -> Result<(), CliError> {
    let mut image = ResizableImage::from_file(file)?;
    if let Some(width) = width {
        image = image.with_width(width)?;
    }

    let mut workspace = context.open_workspace().await?;
    let id = resolve_note_id(workspace.notes(), id)?;
    workspace.insert_image(&id, image).await?;
    println!("Added image {} to note {id}", file.display());
    Ok(())
}
