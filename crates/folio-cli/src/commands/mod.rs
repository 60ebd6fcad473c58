pub mod auth_cmd;
pub mod common;
pub mod completions;
pub mod config;
pub mod edit;
pub mod folders;
pub mod import;
pub mod notes;
pub mod share;
pub mod write;
