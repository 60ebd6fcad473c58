//! Block-level nodes and HTML rendering.

use std::path::Path;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::marks::TextRun;
use super::text::escape_html;
use crate::{Error, Result};

const BULLET_LIST_CLASS: &str = "list-disc ml-4";
const ORDERED_LIST_CLASS: &str = "list-decimal ml-4";
const IMAGE_CLASS: &str = "rounded-lg hover:shadow-lg transition-shadow";
const DEFAULT_IMAGE_WIDTH: &str = "100%";

/// An inline image whose width is persisted as both attribute and style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizableImage {
    pub src: String,
    pub alt: Option<String>,
    pub width: String,
}

impl ResizableImage {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: None,
            width: DEFAULT_IMAGE_WIDTH.to_string(),
        }
    }

    /// Embed image bytes as a base64 data URL.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Result<Self> {
        if !mime_type.starts_with("image/") {
            return Err(Error::InvalidInput(format!(
                "expected an image file, got {mime_type}"
            )));
        }
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(Self::new(format!("data:{mime_type};base64,{encoded}")))
    }

    /// Read an image file and embed it, guessing the MIME type from the extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream");
        let bytes = std::fs::read(path)?;
        let mut image = Self::from_bytes(&bytes, mime_type)?;
        image.alt = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
        Ok(image)
    }

    /// Set the width; accepts `<n>px` or `<n>%`.
    pub fn with_width(mut self, width: &str) -> Result<Self> {
        let width = width.trim();
        let number = width
            .strip_suffix("px")
            .or_else(|| width.strip_suffix('%'))
            .unwrap_or("");
        if number.is_empty() || number.parse::<u32>().is_err() {
            return Err(Error::InvalidInput(format!(
                "image width must look like 320px or 50%, got '{width}'"
            )));
        }
        self.width = width.to_string();
        Ok(self)
    }

    fn render_into(&self, output: &mut String) {
        output.push_str("<img src=\"");
        output.push_str(&escape_html(&self.src));
        output.push('"');
        if let Some(alt) = &self.alt {
            output.push_str(" alt=\"");
            output.push_str(&escape_html(alt));
            output.push('"');
        }
        output.push_str(&format!(
            " class=\"{IMAGE_CLASS}\" width=\"{width}\" style=\"width: {width}\">",
            width = escape_html(&self.width)
        ));
    }
}

/// A top-level document node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(Vec<TextRun>),
    BulletList(Vec<Vec<TextRun>>),
    OrderedList(Vec<Vec<TextRun>>),
    /// Images are inline nodes, so they render inside a paragraph
    Image(ResizableImage),
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph(vec![TextRun::plain(text)])
    }

    fn render_into(&self, output: &mut String) {
        match self {
            Self::Paragraph(runs) => render_paragraph(runs, output),
            Self::BulletList(items) => render_list("ul", BULLET_LIST_CLASS, items, output),
            Self::OrderedList(items) => render_list("ol", ORDERED_LIST_CLASS, items, output),
            Self::Image(image) => {
                output.push_str("<p>");
                image.render_into(output);
                output.push_str("</p>");
            }
        }
    }
}

fn render_paragraph(runs: &[TextRun], output: &mut String) {
    output.push_str("<p>");
    for run in runs {
        run.render_into(output);
    }
    output.push_str("</p>");
}

fn render_list(tag: &str, class: &str, items: &[Vec<TextRun>], output: &mut String) {
    output.push_str(&format!("<{tag} class=\"{class}\">"));
    for item in items {
        output.push_str("<li>");
        render_paragraph(item, output);
        output.push_str("</li>");
    }
    output.push_str(&format!("</{tag}>"));
}

/// Render blocks to the HTML string the editor persists.
pub fn render_blocks(blocks: &[Block]) -> String {
    let mut output = String::new();
    for block in blocks {
        block.render_into(&mut output);
    }
    output
}

/// Append rendered HTML to existing content. Empty editor documents
/// (`<p></p>`) are replaced rather than extended.
pub fn append_html(existing: &str, addition: &str) -> String {
    let existing = existing.trim();
    if existing.is_empty() || existing == "<p></p>" {
        addition.to_string()
    } else {
        format!("{existing}{addition}")
    }
}
