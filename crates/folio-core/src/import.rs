//! File import into note content (`.txt`, `.md`, `.docx`).

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::editor::{append_html, decode_entities, sanitize_html, text_to_html};
use crate::{Error, Result};

/// Largest file the importer will read
pub const MAX_IMPORT_BYTES: u64 = 10 * 1024 * 1024;

const DOCX_DOCUMENT_PART: &str = "word/document.xml";

static DOCX_EMPTY_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<w:p(?:\s[^>]*)?/>").expect("valid empty paragraph regex"));
static DOCX_PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:p(?:\s[^>]*)?>(.*?)</w:p>").expect("valid paragraph regex")
});
static DOCX_PARAGRAPH_PROPERTIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:pPr(?:\s[^>]*)?>.*?</w:pPr>").expect("valid paragraph properties regex")
});
static DOCX_RUN_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:(tab|br|cr)(?:\s[^>]*)?/>")
        .expect("valid run content regex")
});
static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x?)([0-9A-Fa-f]+);").expect("valid entity regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    Text,
    Markdown,
    Docx,
}

impl ImportKind {
    /// Pick the importer from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "txt" => Ok(Self::Text),
            "md" | "markdown" => Ok(Self::Markdown),
            "docx" => Ok(Self::Docx),
            _ => Err(Error::UnsupportedFile(path.display().to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Render Markdown to HTML instead of importing it as plain text
    pub render_markdown: bool,
}

/// Whether imported content replaces or extends the note body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    #[default]
    Replace,
    Append,
}

impl ImportMode {
    #[must_use]
    pub fn apply(self, existing: &str, imported: &str) -> String {
        match self {
            Self::Replace => imported.to_string(),
            Self::Append => append_html(existing, imported),
        }
    }
}

/// A file converted to editor HTML
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedDocument {
    /// File stem, usable as a note title
    pub title: String,
    pub kind: ImportKind,
    pub html: String,
}

pub fn import_file(path: &Path, options: ImportOptions) -> Result<ImportedDocument> {
    let kind = ImportKind::from_path(path)?;
    let size = std::fs::metadata(path)?.len();
    if size > MAX_IMPORT_BYTES {
        return Err(Error::Import(format!(
            "{} is {} bytes; files over 10 MiB are not imported",
            path.display(),
            size
        )));
    }

    let html = match kind {
        ImportKind::Text => text_to_html(&read_utf8(path)?),
        ImportKind::Markdown if options.render_markdown => render_markdown(&read_utf8(path)?),
        ImportKind::Markdown => text_to_html(&read_utf8(path)?),
        ImportKind::Docx => text_to_html(&extract_docx_text(File::open(path)?)?),
    };
    let title = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().trim().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| crate::models::DEFAULT_NOTE_TITLE.to_string());

    tracing::debug!("Imported {} ({:?}, {} bytes)", path.display(), kind, size);
    Ok(ImportedDocument { title, kind, html })
}

fn read_utf8(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes)
        .map_err(|_| Error::Import(format!("{} is not valid UTF-8 text", path.display())))
}

fn render_markdown(markdown: &str) -> String {
    let parser = pulldown_cmark::Parser::new_ext(markdown, pulldown_cmark::Options::all());
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    sanitize_html(&html)
}

/// Raw text of a `.docx`: one line per paragraph, runs concatenated.
pub fn extract_docx_text<R: Read + std::io::Seek>(reader: R) -> Result<String> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let mut part = archive
        .by_name(DOCX_DOCUMENT_PART)
        .map_err(|_| Error::Import("document has no word/document.xml part".to_string()))?;
    if part.size() > MAX_IMPORT_BYTES {
        return Err(oversized_docx_part());
    }

    // The declared size can lie; cap what actually inflates.
    let mut xml = String::new();
    (&mut part)
        .take(MAX_IMPORT_BYTES + 1)
        .read_to_string(&mut xml)?;
    if xml.len() as u64 > MAX_IMPORT_BYTES {
        return Err(oversized_docx_part());
    }
    Ok(docx_xml_to_text(&xml))
}

fn oversized_docx_part() -> Error {
    Error::Import(format!(
        "{DOCX_DOCUMENT_PART} expands past 10 MiB; documents that large are not imported"
    ))
}

fn docx_xml_to_text(xml: &str) -> String {
    let xml = DOCX_EMPTY_PARAGRAPH.replace_all(xml, "<w:p></w:p>");
    DOCX_PARAGRAPH
        .captures_iter(&xml)
        .map(|paragraph| {
            let body = DOCX_PARAGRAPH_PROPERTIES.replace_all(&paragraph[1], "");
            DOCX_RUN_CONTENT
                .captures_iter(&body)
                .map(|content| match content.get(2).map(|tag| tag.as_str()) {
                    Some("tab") => "\t".to_string(),
                    Some(_) => "\n".to_string(),
                    None => decode_xml_text(&content[1]),
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_xml_text(text: &str) -> String {
    let decoded = NUMERIC_ENTITY.replace_all(text, |captures: &Captures<'_>| {
        let radix = if captures[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&captures[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map_or_else(|| captures[0].to_string(), String::from)
    });
    decode_entities(&decoded)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write_docx(path: &Path, document_xml: &str) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file(DOCX_DOCUMENT_PART, zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn imports_plain_text_as_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groceries.txt");
        std::fs::write(&path, "eggs & milk\n\nbread\n").unwrap();

        let document = import_file(&path, ImportOptions::default()).unwrap();
        assert_eq!(document.title, "groceries");
        assert_eq!(document.kind, ImportKind::Text);
        assert_eq!(document.html, "<p>eggs &amp; milk</p><p>bread</p>");
    }

    #[test]
    fn markdown_is_plain_text_unless_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readme.md");
        std::fs::write(&path, "# Title\n\n**bold**\n").unwrap();

        let plain = import_file(&path, ImportOptions::default()).unwrap();
        assert_eq!(plain.html, "<p># Title</p><p>**bold**</p>");

        let rendered = import_file(
            &path,
            ImportOptions {
                render_markdown: true,
            },
        )
        .unwrap();
        assert!(rendered.html.contains("<h1>Title</h1>"));
        assert!(rendered.html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn rendered_markdown_drops_raw_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "Hello\n\n<script>steal()</script>\n\n<img src=x onerror=steal()>\n").unwrap();

        let rendered = import_file(
            &path,
            ImportOptions {
                render_markdown: true,
            },
        )
        .unwrap();
        assert!(rendered.html.contains("<p>Hello</p>"));
        assert!(!rendered.html.contains("script"));
        assert!(!rendered.html.contains("onerror"));
    }

    #[test]
    fn extracts_docx_paragraphs_runs_tabs_and_breaks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Report.docx");
        write_docx(
            &path,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Hello </w:t></w:r><w:r><w:t xml:space="preserve">world</w:t></w:r></w:p>
<w:p/>
<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>R&amp;D &#8212; done</w:t></w:r></w:p>
</w:body></w:document>"#,
        );

        let text = extract_docx_text(File::open(&path).unwrap()).unwrap();
        assert_eq!(text, "Hello world\n\na\tb\nR&D \u{2014} done");

        let document = import_file(&path, ImportOptions::default()).unwrap();
        assert_eq!(document.title, "Report");
        assert_eq!(
            document.html,
            "<p>Hello world</p><p>a\tb</p><p>R&amp;D \u{2014} done</p>"
        );
    }

    #[test]
    fn docx_without_document_part_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.docx");
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("other.xml", zip::write::FileOptions::default())
            .unwrap();
        zip.finish().unwrap();

        assert!(matches!(
            import_file(&path, ImportOptions::default()),
            Err(Error::Import(_))
        ));
    }

    #[test]
    fn rejects_unsupported_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slides.pdf");
        std::fs::write(&path, "x").unwrap();
        assert!(matches!(
            import_file(&path, ImportOptions::default()),
            Err(Error::UnsupportedFile(_))
        ));
    }

    #[test]
    fn rejects_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.txt");
        let file = File::create(&path).unwrap();
        file.set_len(MAX_IMPORT_BYTES + 1).unwrap();
        assert!(matches!(
            import_file(&path, ImportOptions::default()),
            Err(Error::Import(_))
        ));
    }

    #[test]
    fn rejects_docx_that_inflates_past_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bomb.docx");
        let padding = " ".repeat(usize::try_from(MAX_IMPORT_BYTES).unwrap() + 1);
        write_docx(
            &path,
            &format!("<w:document><w:body><w:p><w:r><w:t>x</w:t></w:r></w:p>{padding}</w:body></w:document>"),
        );
        assert!(std::fs::metadata(&path).unwrap().len() < MAX_IMPORT_BYTES);

        assert!(matches!(
            import_file(&path, ImportOptions::default()),
            Err(Error::Import(message)) if message.contains("10 MiB")
        ));
    }

    #[test]
    fn import_mode_replaces_or_appends() {
        assert_eq!(ImportMode::Replace.apply("<p>old</p>", "<p>new</p>"), "<p>new</p>");
        assert_eq!(
            ImportMode::Append.apply("<p>old</p>", "<p>new</p>"),
            "<p>old</p><p>new</p>"
        );
    }
}
