//! Read-only shared view of a single note.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::editor::{escape_html, sanitize_html};
use crate::models::{Note, NoteId};
use crate::store::NoteStore;
use crate::util::{is_http_url, trim_trailing_slash};
use crate::{Error, Result};

/// Public link for a note: `{origin}/shared/{id}`.
pub fn share_link(site_url: &str, note_id: &NoteId) -> Result<String> {
    let origin = trim_trailing_slash(site_url.trim());
    if !is_http_url(origin) {
        return Err(Error::Config(format!(
            "site URL must include http:// or https://, got '{origin}'"
        )));
    }
    Ok(format!("{origin}/shared/{note_id}"))
}

/// The fields a shared page exposes. Owner and folder stay private, and
/// content is cleaned down to editor markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedNote {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub note_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SharedNote {
    /// Load a note for the shared view. `Ok(None)` means "Note not found".
    pub async fn fetch<S: NoteStore>(store: &S, id: &NoteId) -> Result<Option<Self>> {
        Ok(store.get_note(id).await?.map(Self::from))
    }

    #[must_use]
    pub fn metadata(&self) -> NoteMetadata {
        NoteMetadata::new(self.created_at, self.updated_at, &self.note_type)
    }
}

impl From<Note> for SharedNote {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.display_title().to_string(),
            content: sanitize_html(&note.content),
            note_type: note.note_type,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// Created / Last Edited Time / Type rows shown under a note title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMetadata {
    pub rows: Vec<(&'static str, String)>,
}

impl NoteMetadata {
    #[must_use]
    pub fn new(created_at: DateTime<Utc>, updated_at: DateTime<Utc>, note_type: &str) -> Self {
        Self {
            rows: vec![
                ("Created", format_timestamp(created_at)),
                ("Last Edited Time", format_timestamp(updated_at)),
                ("Type", note_type.to_string()),
            ],
        }
    }
}

/// `March 1, 2024 10:05 AM UTC`
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%B %-d, %Y %-I:%M %p UTC").to_string()
}

pub fn render_shared_page(note: &SharedNote) -> String {
    let title = escape_html(&note.title);
    let metadata = note
        .metadata()
        .rows
        .iter()
        .map(|(label, value)| {
            format!(
                "<div><p class=\"label\">{label}</p><p>{}</p></div>",
                escape_html(value)
            )
        })
        .collect::<String>();

    page(
        &title,
        &format!(
            "<main class=\"note\"><h1>{title}</h1><section class=\"metadata\">{metadata}</section><hr><article class=\"prose\">{}</article></main>",
            sanitize_html(&note.content)
        ),
    )
}

pub fn render_not_found_page() -> String {
    page(
        "Note not found",
        "<main class=\"not-found\"><h1>404</h1><p>Note not found</p><a href=\"/\">Return to Home</a></main>",
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{title}</title>\n<style>{PAGE_STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

const PAGE_STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;color:#111827}\
.note{max-width:56rem;margin:0 auto;padding:2rem}\
.note h1{font-size:1.875rem;margin-bottom:1.5rem}\
.metadata{display:grid;grid-template-columns:1fr 1fr;gap:1rem}\
.label{font-size:.875rem;color:#6B7280;margin:0}\
hr{margin:2rem 0;border:0;border-top:1px solid #E5E7EB}\
.list-disc{list-style:disc}.list-decimal{list-style:decimal}.ml-4{margin-left:1rem}\
.line-through{text-decoration:line-through}\
.prose img{max-width:100%;border-radius:.5rem}\
.not-found{height:100vh;display:flex;flex-direction:column;align-items:center;justify-content:center}\
.not-found h1{font-size:2.25rem}.not-found a{color:#3B82F6}";

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{NewNote, NotePatch};
    use crate::store::MemoryStore;

    fn shared_note() -> SharedNote {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 10, 5, 0).unwrap();
        SharedNote {
            id: NoteId::new(),
            title: "Plans <draft>".to_string(),
            content: "<p><strong>Ship</strong> it</p>".to_string(),
            note_type: "doc".to_string(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn share_link_uses_origin() {
        let id = NoteId::new();
        assert_eq!(
            share_link("https://notes.example.com/", &id).unwrap(),
            format!("https://notes.example.com/shared/{id}")
        );
        assert!(share_link("notes.example.com", &id).is_err());
    }

    #[test]
    fn metadata_rows_are_labelled() {
        let metadata = shared_note().metadata();
        assert_eq!(
            metadata.rows,
            vec![
                ("Created", "March 1, 2024 10:05 AM UTC".to_string()),
                ("Last Edited Time", "March 1, 2024 10:05 AM UTC".to_string()),
                ("Type", "doc".to_string()),
            ]
        );
    }

    #[test]
    fn shared_page_escapes_title_and_keeps_content_html() {
        let html = render_shared_page(&shared_note());
        assert!(html.contains("<title>Plans &lt;draft&gt;</title>"));
        assert!(html.contains("<p><strong>Ship</strong> it</p>"));
        assert!(html.contains("Last Edited Time"));
    }

    #[test]
    fn shared_page_strips_scripts_and_handlers() {
        let mut note = shared_note();
        note.content = "<p>Hi</p><img src=x onerror=alert(document.cookie)><script>steal()</script>"
            .to_string();

        let html = render_shared_page(&note);
        assert!(html.contains("<p>Hi</p>"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("onerror"));
        assert!(!html.contains("steal()"));
    }

    #[test]
    fn not_found_page_links_home() {
        let html = render_not_found_page();
        assert!(html.contains("<h1>404</h1>"));
        assert!(html.contains("Note not found"));
        assert!(html.contains("<a href=\"/\">Return to Home</a>"));
    }

    #[tokio::test]
    async fn fetch_returns_none_for_missing_notes() {
        let store = MemoryStore::new();
        let stored = store
            .insert_note(&NewNote::untitled("user-1", 1, None).with_title("Shared"))
            .await
            .unwrap();

        store
            .update_note(
                &stored.id,
                &NotePatch::content("<p onclick=\"steal()\">Body</p>"),
            )
            .await
            .unwrap();

        let shared = SharedNote::fetch(&store, &stored.id).await.unwrap().unwrap();
        assert_eq!(shared.title, "Shared");
        assert_eq!(shared.content, "<p>Body</p>");
        assert!(SharedNote::fetch(&store, &NoteId::new()).await.unwrap().is_none());
    }
}
