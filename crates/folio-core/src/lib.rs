//! folio-core - Core library for Folio
//!
//! This crate contains the shared models, backend client, and workspace
//! logic used by every Folio interface (CLI and share server).

pub mod auth;
pub mod config;
pub mod dnd;
pub mod editor;
pub mod error;
pub mod filter;
pub mod import;
pub mod models;
pub mod share;
pub mod store;
pub mod util;
pub mod workspace;

pub use error::{Error, Result};
pub use models::{Folder, FolderId, Note, NoteId};
pub use workspace::{Toast, ToastLevel, Workspace};
