use chrono::{TimeZone, Utc};
use clap::{CommandFactory, Parser};
use folio_core::editor::render_blocks;
use folio_core::share::SharedNote;
use folio_core::store::MemoryStore;
use folio_core::{Folder, FolderId, Note, NoteId, Workspace};
use pretty_assertions::assert_eq;

use crate::cli::{Cli, Commands, CompletionShell, ListFilters, WriteArgs};
use crate::commands::common::{
    default_editor, format_folder_lines, format_note_lines, format_relative_time,
    normalize_note_identifier, normalize_search_query, resolve_drop_target, resolve_folder_id,
    resolve_note_id, truncate,
};
use crate::commands::completions::render_completions;
use crate::commands::config::{merge_profile, missing_fields, ProfileValues};
use crate::commands::notes::{apply_filters, create_note, render_note_list};
use crate::commands::share::render_shared_text;
use crate::commands::write::blocks_from_args;
use crate::config_profiles::CliProfile;
use crate::error::CliError;

const NOTE_A1: &str = "aaaaaaaa-0000-4000-8000-000000000001";
const NOTE_A2: &str = "aaaaaaaa-0000-4000-8000-000000000002";
const NOTE_B: &str = "bbbbbbbb-0000-4000-8000-000000000003";
const FOLDER_WORK: &str = "cccccccc-0000-4000-8000-000000000004";
const FOLDER_HOME: &str = "dddddddd-0000-4000-8000-000000000005";

fn note(id: &str, title: &str, position: i64, folder: Option<&str>) -> Note {
    let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 10, 5, 0).unwrap();
    Note {
        id: id.parse().unwrap(),
        user_id: "user-1".to_string(),
        title: title.to_string(),
        content: "<p>Body</p>".to_string(),
        note_type: "doc".to_string(),
        position,
        folder_id: folder.map(|folder| folder.parse().unwrap()),
        is_favorite: false,
        created_at: timestamp,
        updated_at: timestamp,
    }
}

fn folder(id: &str, name: &str, position: i64) -> Folder {
    let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 10, 5, 0).unwrap();
    Folder {
        id: id.parse().unwrap(),
        user_id: "user-1".to_string(),
        name: name.to_string(),
        position,
        created_at: timestamp,
        updated_at: timestamp,
    }
}

fn sample_notes() -> Vec<Note> {
    vec![
        note(NOTE_A1, "Groceries", 1, None),
        note(NOTE_A2, "Standup", 2, Some(FOLDER_WORK)),
        note(NOTE_B, "Recipes", 3, Some(FOLDER_HOME)),
    ]
}

fn sample_folders() -> Vec<Folder> {
    vec![folder(FOLDER_WORK, "Work", 1), folder(FOLDER_HOME, "Home", 2)]
}

fn write_args(text: &[&str]) -> WriteArgs {
    WriteArgs {
        id: NOTE_A1.to_string(),
        text: text.iter().map(ToString::to_string).collect(),
        bold: false,
        italic: false,
        underline: false,
        strike: false,
        highlight: None,
        color: None,
        size: None,
        bullets: false,
        numbered: false,
    }
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn move_rejects_folder_together_with_all_notes() {
    let parsed = Cli::try_parse_from(["folio", "move", "abc", "--folder", "Work", "--all-notes"]);
    assert!(parsed.is_err());
}

#[test]
fn list_parses_filters_and_global_profile() {
    let cli = Cli::try_parse_from([
        "folio",
        "list",
        "--folder",
        "Work",
        "--type",
        "todo",
        "--favorites",
        "--profile",
        "work",
    ])
    .unwrap();

    assert_eq!(cli.profile.as_deref(), Some("work"));
    let Commands::List { filters, json } = cli.command else {
        panic!("expected list command");
    };
    assert_eq!(filters.folder.as_deref(), Some("Work"));
    assert_eq!(filters.note_type.as_deref(), Some("todo"));
    assert!(filters.favorites);
    assert!(!json);
}

#[test]
fn write_highlight_flag_takes_optional_color() {
    let cli = Cli::try_parse_from(["folio", "write", "abc", "hello", "--highlight"]).unwrap();
    let Commands::Write(args) = cli.command else {
        panic!("expected write command");
    };
    assert_eq!(args.highlight.as_deref(), Some(""));
    assert_eq!(args.text, vec!["hello".to_string()]);
}

#[test]
fn normalize_note_identifier_rejects_empty() {
    assert!(matches!(
        normalize_note_identifier("   "),
        Err(CliError::EmptyNoteId)
    ));
    assert_eq!(normalize_note_identifier(" abc ").unwrap(), "abc");
}

#[test]
fn normalize_search_query_rejects_empty() {
    assert!(matches!(
        normalize_search_query(" \t "),
        Err(CliError::EmptySearchQuery)
    ));
    assert_eq!(normalize_search_query(" plan ").unwrap(), "plan");
}

#[test]
fn format_relative_time_buckets() {
    let now = 10 * 365 * 24 * 60 * 60 * 1000_i64;
    assert_eq!(format_relative_time(now - 5_000, now), "just now");
    assert_eq!(format_relative_time(now - 5 * 60_000, now), "5m ago");
    assert_eq!(format_relative_time(now - 3 * 3_600_000, now), "3h ago");
    assert_eq!(format_relative_time(now - 2 * 86_400_000, now), "2d ago");
    assert_eq!(format_relative_time(now - 14 * 86_400_000, now), "2w ago");
    assert_eq!(format_relative_time(now - 400 * 86_400_000, now), "1y ago");
}

#[test]
fn truncate_collapses_whitespace_and_adds_ellipsis() {
    assert_eq!(truncate("  a   b  ", 10), "a b");
    assert_eq!(truncate("abcdefghijk", 8), "abcde...");
}

#[test]
fn resolve_note_id_accepts_full_id_and_unique_prefix() {
    let notes = sample_notes();
    assert_eq!(
        resolve_note_id(&notes, NOTE_A1).unwrap(),
        NOTE_A1.parse::<NoteId>().unwrap()
    );
    assert_eq!(
        resolve_note_id(&notes, "BBBB").unwrap(),
        NOTE_B.parse::<NoteId>().unwrap()
    );
}

#[test]
fn resolve_note_id_reports_ambiguous_and_missing_prefixes() {
    let notes = sample_notes();

    let error = resolve_note_id(&notes, "aaaa").unwrap_err();
    let CliError::Ambiguous(message) = error else {
        panic!("expected ambiguity error");
    };
    assert!(message.contains("aaaa"));
    assert!(message.contains("aaaaaaaa-0000"));

    assert!(matches!(
        resolve_note_id(&notes, "ffff"),
        Err(CliError::NoteNotFound(query)) if query == "ffff"
    ));
}

#[test]
fn resolve_folder_id_prefers_exact_name_then_prefix() {
    let folders = sample_folders();
    let work = FOLDER_WORK.parse::<FolderId>().unwrap();
    let home = FOLDER_HOME.parse::<FolderId>().unwrap();

    assert_eq!(resolve_folder_id(&folders, "Work").unwrap(), work);
    assert_eq!(resolve_folder_id(&folders, "home").unwrap(), home);
    assert_eq!(resolve_folder_id(&folders, "cccc").unwrap(), work);
    assert_eq!(resolve_folder_id(&folders, FOLDER_HOME).unwrap(), home);
    assert!(matches!(
        resolve_folder_id(&folders, "Archive"),
        Err(CliError::FolderNotFound(_))
    ));
}

#[test]
fn resolve_drop_target_maps_all_notes_folders_and_notes() {
    let notes = sample_notes();
    let folders = sample_folders();

    assert_eq!(
        resolve_drop_target(&notes, &folders, "all-notes").unwrap(),
        "all-notes"
    );
    assert_eq!(
        resolve_drop_target(&notes, &folders, "Home").unwrap(),
        FOLDER_HOME
    );
    assert_eq!(resolve_drop_target(&notes, &folders, "bbbb").unwrap(), NOTE_B);
    assert_eq!(
        resolve_drop_target(&notes, &folders, "cccc").unwrap(),
        FOLDER_WORK
    );
    assert!(matches!(
        resolve_drop_target(&notes, &folders, "ffff"),
        Err(CliError::NoteNotFound(_))
    ));
}

#[test]
fn format_note_lines_show_type_favorite_and_folder() {
    let mut notes = sample_notes();
    notes[1].is_favorite = true;
    let folders = sample_folders();
    let refs = notes.iter().collect::<Vec<_>>();

    let lines = format_note_lines(&refs, &folders);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("aaaaaaaa-0000  Groceries"));
    assert!(!lines[0].contains('*'));
    assert!(lines[1].contains("doc"));
    assert!(lines[1].contains("  *"));
    assert!(lines[1].ends_with("[Work]"));
}

#[test]
fn format_folder_lines_count_notes() {
    let lines = format_folder_lines(&sample_folders(), &sample_notes());
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("cccccccc-0000  Work"));
    assert!(lines[0].ends_with("1 note"));
}

#[test]
fn write_args_render_marks_in_nesting_order() {
    let mut args = write_args(&["hi"]);
    args.bold = true;
    args.color = Some("red".to_string());
    args.size = Some("18".to_string());

    let html = render_blocks(&blocks_from_args(&args).unwrap());
    assert_eq!(
        html,
        "<p><span style=\"font-size: 18px\"><span style=\"color: #FF0000\"><strong>hi</strong></span></span></p>"
    );
}

#[test]
fn write_args_render_lists_and_plain_highlight() {
    let mut args = write_args(&["a", "b"]);
    args.bullets = true;
    args.highlight = Some(String::new());

    let html = render_blocks(&blocks_from_args(&args).unwrap());
    assert_eq!(
        html,
        "<ul class=\"list-disc ml-4\"><li><p><mark class=\"relative\">a</mark></p></li><li><p><mark class=\"relative\">b</mark></p></li></ul>"
    );
}

#[test]
fn write_args_reject_unknown_color() {
    let mut args = write_args(&["hi"]);
    args.color = Some("chartreuse".to_string());
    assert!(matches!(
        blocks_from_args(&args),
        Err(CliError::Core(folio_core::Error::InvalidInput(_)))
    ));
}

#[test]
fn merge_profile_prefers_explicit_then_env_then_existing() {
    let existing = CliProfile {
        supabase_url: Some("https://old.supabase.co".to_string()),
        supabase_anon_key: Some("old-key".to_string()),
        site_url: Some("https://old.example.com".to_string()),
    };
    let env = |key: &str| (key == "SUPABASE_ANON_KEY").then(|| "env-key".to_string());

    let merged = merge_profile(
        &existing,
        ProfileValues {
            supabase_url: Some(" https://new.supabase.co ".to_string()),
            ..ProfileValues::default()
        },
        env,
    );

    assert_eq!(merged.supabase_url.as_deref(), Some("https://new.supabase.co"));
    assert_eq!(merged.supabase_anon_key.as_deref(), Some("env-key"));
    assert_eq!(merged.site_url.as_deref(), Some("https://old.example.com"));
    assert!(missing_fields(&merged).is_empty());
    assert_eq!(
        missing_fields(&CliProfile::default()),
        vec!["supabase_url", "supabase_anon_key", "site_url"]
    );
}

#[test]
fn completions_are_generated_for_each_shell() {
    for shell in [CompletionShell::Bash, CompletionShell::Zsh, CompletionShell::Fish] {
        let script = String::from_utf8(render_completions(shell)).unwrap();
        assert!(script.contains("folio"), "{shell:?} completions mention the binary");
    }
}

#[test]
fn shared_text_lists_metadata_rows() {
    let shared = SharedNote::from(note(NOTE_A1, "   ", 1, None));
    let text = render_shared_text(&shared, false);
    assert_eq!(
        text,
        "Untitled\nCreated: March 1, 2024 10:05 AM UTC\nLast Edited Time: March 1, 2024 10:05 AM UTC\nType: doc\n\nBody"
    );
}

#[tokio::test]
async fn new_note_with_title_lands_in_folder() {
    let store = MemoryStore::new();
    let mut workspace = Workspace::load(store.clone(), "user-1").await.unwrap();
    let work = workspace.create_folder("Work").await.unwrap();

    create_note(&mut workspace, Some("work"), Some("Plan")).await.unwrap();

    let notes = store.all_notes().await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Plan");
    assert_eq!(notes[0].folder_id, Some(work));
    assert_eq!(workspace.editing_note(), None);
}

#[tokio::test]
async fn list_filters_scope_heading_and_rows() {
    let store = MemoryStore::new();
    let mut workspace = Workspace::load(store, "user-1").await.unwrap();
    let work = workspace.create_folder("Work").await.unwrap();
    let first = workspace.add_note(Some(work)).await.unwrap();
    workspace.rename_note(&first, "Standup").await.unwrap();
    workspace.toggle_favorite(&first).await.unwrap();
    let second = workspace.add_note(None).await.unwrap();
    workspace.rename_note(&second, "Groceries").await.unwrap();

    let filters = ListFilters {
        folder: Some("Work".to_string()),
        note_type: None,
        favorites: true,
    };
    apply_filters(&mut workspace, &filters).unwrap();

    let rendered = render_note_list(&workspace, false).unwrap();
    let lines = rendered.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "Notes in Work");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("Standup"));

    workspace.set_search_query("nothing matches");
    assert_eq!(render_note_list(&workspace, false).unwrap(), "No matching notes.");
}

#[tokio::test]
async fn list_json_includes_folder_name() {
    let store = MemoryStore::new();
    let mut workspace = Workspace::load(store, "user-1").await.unwrap();
    let home = workspace.create_folder("Home").await.unwrap();
    workspace.add_note(Some(home)).await.unwrap();

    let rendered = render_note_list(&workspace, true).unwrap();
    let items: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(items[0]["title"], "Untitled");
    assert_eq!(items[0]["type"], "doc");
    assert_eq!(items[0]["folder"], "Home");
    assert_eq!(items[0]["is_favorite"], false);
}
