//! Folio CLI - notes and folders on a hosted Supabase backend
//!
//! Every command resolves a profile, restores the stored session and talks
//! to the backend through a `folio_core::Workspace`.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::ProfileContext;
use crate::commands::{
    auth_cmd, completions, config, edit, folders, import, notes, share, write,
};
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "folio=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Config { command } => config::run_config(command, profile),
        Commands::Auth { command } => auth_cmd::run_auth(command, profile).await,
        Commands::Completions { shell, output } => {
            completions::run_completions(shell, output.as_deref())
        }
        command => {
            let context = ProfileContext::load(profile)?;
            run_note_command(&context, command).await
        }
    }
}

async fn run_note_command(context: &ProfileContext, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::List { filters, json } => notes::run_list(context, &filters, json).await,
        Commands::Search {
            query,
            filters,
            json,
        } => notes::run_search(context, &query, &filters, json).await,
        Commands::New { folder, title } => {
            notes::run_new(context, folder.as_deref(), title.as_deref()).await
        }
        Commands::Show { id, html } => notes::run_show(context, &id, html).await,
        Commands::Rename { id, title } => notes::run_rename(context, &id, &title).await,
        Commands::Delete { id } => notes::run_delete(context, &id).await,
        Commands::Move {
            id,
            folder,
            all_notes,
        } => notes::run_move(context, &id, folder.as_deref(), all_notes).await,
        Commands::Reorder { id, over } => notes::run_reorder(context, &id, &over).await,
        Commands::Drop { id, target } => notes::run_drop(context, &id, &target).await,
        Commands::Favorite { id } => notes::run_favorite(context, &id).await,
        Commands::Type { id, note_type } => notes::run_type(context, &id, &note_type).await,
        Commands::Edit { id } => edit::run_edit(context, &id).await,
        Commands::Write(args) => write::run_write(context, &args).await,
        Commands::Import {
            id,
            file,
            append,
            render_markdown,
        } => import::run_import(context, &id, &file, append, render_markdown).await,
        Commands::Image { id, file, width } => {
            import::run_image(context, &id, &file, width.as_deref()).await
        }
        Commands::Share { id } => share::run_share(context, &id).await,
        Commands::Shared { id, html } => share::run_shared(context, &id, html).await,
        Commands::Folders { command } => folders::run_folders(context, command).await,
        Commands::Config { .. } | Commands::Auth { .. } | Commands::Completions { .. } => Ok(()),
    }
}
