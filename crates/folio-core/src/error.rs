//! Error types for folio-core

use thiserror::Error;

use crate::auth::AuthError;

/// Result type alias using folio-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in folio-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Backend (`PostgREST`) rejected the request
    #[error("{0}")]
    Backend(String),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Auth error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Note or folder not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File type not accepted by the importer
    #[error("Unsupported file type: {0} (expected .txt, .md or .docx)")]
    UnsupportedFile(String),

    /// Import failed while reading the document
    #[error("Import error: {0}")]
    Import(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A workspace action failed; the message is what the user is shown
    #[error("{action}: {source}")]
    Action {
        action: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an error with the user-facing action that failed
    #[must_use]
    pub fn during(self, action: &'static str) -> Self {
        Self::Action {
            action,
            source: Box::new(self),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(error: zip::result::ZipError) -> Self {
        Self::Import(error.to_string())
    }
}
