use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] folio_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Edited note content cannot be empty")]
    EmptyEditedContent,
    #[error("Note not found for id/prefix: {0}")]
    NoteNotFound(String),
    #[error("Folder not found for id/prefix/name: {0}")]
    FolderNotFound(String),
    #[error("{0}")]
    Ambiguous(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Profile '{0}' is not signed in. Run `folio auth login` first.")]
    NotSignedIn(String),
    #[error("Share links need a site URL. Run `folio config init --site-url <URL>` or set FOLIO_SITE_URL.")]
    MissingSiteUrl,
}

impl From<folio_core::auth::AuthError> for CliError {
    fn from(error: folio_core::auth::AuthError) -> Self {
        Self::Auth(error.to_string())
    }
}
