use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Notes and folders from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// CLI profile name (backend URL, keys and stored session)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List notes in position order
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filters: ListFilters,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search note titles
    Search {
        /// Case-insensitive title substring
        query: String,
        #[command(flatten)]
        filters: ListFilters,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an "Untitled" note at the end of the list
    #[command(alias = "add")]
    New {
        /// Folder id, id prefix or exact name
        #[arg(long, value_name = "FOLDER")]
        folder: Option<String>,
        /// Title to give the note right away
        #[arg(long)]
        title: Option<String>,
    },
    /// Show a note's metadata and content
    Show {
        /// Note ID or unique ID prefix
        id: String,
        /// Print the stored HTML instead of plain text
        #[arg(long)]
        html: bool,
    },
    /// Rename a note
    Rename {
        /// Note ID or unique ID prefix
        id: String,
        title: String,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// File a note into a folder or back into "All Notes"
    Move {
        /// Note ID or unique ID prefix
        id: String,
        /// Destination folder id, id prefix or exact name
        #[arg(long, value_name = "FOLDER", conflicts_with = "all_notes")]
        folder: Option<String>,
        /// Remove the note from its folder
        #[arg(long)]
        all_notes: bool,
    },
    /// Move a note to the position another note occupies
    Reorder {
        /// Note to move
        id: String,
        /// Note whose position it takes
        over: String,
    },
    /// Apply a drag-and-drop: onto a note, a folder or `all-notes`
    Drop {
        /// Dragged note
        id: String,
        /// Drop target: note, folder, or `all-notes`
        target: String,
    },
    /// Toggle a note's favorite flag
    Favorite {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Set a note's type label
    Type {
        /// Note ID or unique ID prefix
        id: String,
        note_type: String,
    },
    /// Edit a note's HTML in $EDITOR
    Edit {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Append a styled paragraph or list to a note
    Write(WriteArgs),
    /// Import a .txt, .md or .docx file into a note
    Import {
        /// Note ID or unique ID prefix
        id: String,
        /// File to import
        file: PathBuf,
        /// Append instead of replacing the note content
        #[arg(long)]
        append: bool,
        /// Render Markdown files to HTML instead of importing them as text
        #[arg(long)]
        render_markdown: bool,
    },
    /// Embed an image file into a note
    Image {
        /// Note ID or unique ID prefix
        id: String,
        /// Image file
        file: PathBuf,
        /// Display width such as 320px or 50%
        #[arg(long)]
        width: Option<String>,
    },
    /// Print a note's public share link
    Share {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Show a shared note read-only, without signing in
    Shared {
        /// Full note ID
        id: String,
        /// Print the stored HTML instead of plain text
        #[arg(long)]
        html: bool,
    },
    /// Manage folders
    Folders {
        #[command(subcommand)]
        command: FolderCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Sign in, sign up and manage the stored session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct ListFilters {
    /// Only notes in this folder (id, id prefix or exact name)
    #[arg(long, value_name = "FOLDER")]
    pub folder: Option<String>,
    /// Only notes of this type
    #[arg(long = "type", value_name = "TYPE")]
    pub note_type: Option<String>,
    /// Only favorites
    #[arg(long)]
    pub favorites: bool,
}

#[derive(Args, Debug, Clone)]
pub struct WriteArgs {
    /// Note ID or unique ID prefix
    pub id: String,
    /// Text to append; each value becomes a list item with --bullets/--numbered
    #[arg(required = true)]
    pub text: Vec<String>,
    #[arg(long)]
    pub bold: bool,
    #[arg(long)]
    pub italic: bool,
    #[arg(long)]
    pub underline: bool,
    #[arg(long)]
    pub strike: bool,
    /// Highlight, optionally with a color (preset name or #RRGGBB)
    #[arg(long, value_name = "COLOR", num_args = 0..=1, default_missing_value = "")]
    pub highlight: Option<String>,
    /// Text color: Black, Gray, Red, Blue, Green or #RRGGBB
    #[arg(long)]
    pub color: Option<String>,
    /// Font size: 12, 14, 16, 18, 20, 24, 30, 36, 48 or <n>px
    #[arg(long)]
    pub size: Option<String>,
    /// Write a bullet list, one item per text value
    #[arg(long, conflicts_with = "numbered")]
    pub bullets: bool,
    /// Write a numbered list, one item per text value
    #[arg(long)]
    pub numbered: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OAuthProviderArg {
    Google,
    Github,
}

#[derive(Subcommand)]
pub enum FolderCommands {
    /// List folders with note counts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a folder at the end of the list
    New { name: String },
    /// Rename a folder
    Rename {
        /// Folder id, id prefix or exact name
        folder: String,
        name: String,
    },
    /// Delete a folder; its notes move back to "All Notes"
    Delete {
        /// Folder id, id prefix or exact name
        folder: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update a profile
    Init {
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// Public origin serving shared notes (for share links)
        #[arg(long, value_name = "URL")]
        site_url: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Show the resolved profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create an account with email and password
    Signup {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Sign in with email and password and store the session in the keychain
    Login {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Print the URL that starts an OAuth sign-in
    OauthUrl {
        #[arg(long, value_enum, default_value_t = OAuthProviderArg::Google)]
        provider: OAuthProviderArg,
        /// Where the provider sends the browser back to
        #[arg(long, value_name = "URL")]
        redirect_to: String,
    },
    /// Finish an OAuth sign-in from the URL the browser landed on
    OauthComplete {
        /// Full redirect URL including the `#access_token=...` fragment
        redirect_url: String,
    },
    /// Show auth status for the profile
    Status,
    /// Sign out and clear the stored session
    Logout,
}
