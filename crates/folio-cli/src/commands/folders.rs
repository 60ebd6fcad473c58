use crate::cli::FolderCommands;
use crate::commands::common::{
    folder_to_list_item, format_folder_lines, print_toasts, resolve_folder_id, FolderListItem,
    ProfileContext,
};
use crate::error::CliError;

pub async fn run_folders(context: &ProfileContext, command: FolderCommands) -> Result<(), CliError> {
    let mut workspace = context.open_workspace().await?;
    match command {
        FolderCommands::List { json } => {
            if json {
                let items = workspace
                    .folders()
                    .iter()
                    .map(|folder| folder_to_list_item(folder, workspace.notes()))
                    .collect::<Vec<FolderListItem>>();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if workspace.folders().is_empty() {
                println!("No folders yet.");
            } else {
                for line in format_folder_lines(workspace.folders(), workspace.notes()) {
                    println!("{line}");
                }
            }
        }
        FolderCommands::New { name } => {
            let id = workspace.create_folder(&name).await?;
            println!("{id}");
        }
        FolderCommands::Rename { folder, name } => {
            let id = resolve_folder_id(workspace.folders(), &folder)?;
            workspace.rename_folder(&id, &name).await?;
            println!("Renamed folder {id}");
        }
        FolderCommands::Delete { folder } => {
            let id = resolve_folder_id(workspace.folders(), &folder)?;
            let moved = workspace.notes_in_folder(&id).len();
            workspace.delete_folder(&id).await?;
            println!("Deleted folder {id}; {moved} note(s) moved to All Notes");
        }
    }
    print_toasts(workspace.take_toasts());
    Ok(())
}
