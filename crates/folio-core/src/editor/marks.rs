//! Inline marks and the toolbar presets.

use serde::{Deserialize, Serialize};

use super::text::escape_html;
use crate::{Error, Result};

/// Font-size presets offered by the toolbar: (label, CSS value)
pub const FONT_SIZES: [(&str, &str); 9] = [
    ("12", "12px"),
    ("14", "14px"),
    ("16", "16px"),
    ("18", "18px"),
    ("20", "20px"),
    ("24", "24px"),
    ("30", "30px"),
    ("36", "36px"),
    ("48", "48px"),
];

/// Text-color presets offered by the toolbar: (label, hex value)
pub const COLORS: [(&str, &str); 5] = [
    ("Black", "#000000"),
    ("Gray", "#6B7280"),
    ("Red", "#FF0000"),
    ("Blue", "#0000FF"),
    ("Green", "#00FF00"),
];

/// A CSS font size in pixels, e.g. `18px`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSize(String);

impl FontSize {
    /// Accepts a preset label (`18`) or a pixel value (`18px`).
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if let Some((_, value)) = FONT_SIZES.iter().find(|(label, _)| *label == raw) {
            return Ok(Self((*value).to_string()));
        }

        let digits = raw.strip_suffix("px").unwrap_or(raw);
        match digits.parse::<u16>() {
            Ok(size) if (1..=400).contains(&size) => Ok(Self(format!("{size}px"))),
            _ => Err(Error::InvalidInput(format!(
                "font size must be a pixel value such as 16px, got '{raw}'"
            ))),
        }
    }

    #[must_use]
    pub fn as_css(&self) -> &str {
        &self.0
    }
}

/// A text color as `#RRGGBB`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextColor(String);

impl TextColor {
    /// Accepts a preset label (`red`, case-insensitive) or a `#RRGGBB` hex value.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if let Some((_, value)) = COLORS
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(raw))
        {
            return Ok(Self((*value).to_string()));
        }

        let hex = raw.strip_prefix('#').unwrap_or("");
        if hex.len() == 6 && hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            Ok(Self(format!("#{}", hex.to_ascii_uppercase())))
        } else {
            Err(Error::InvalidInput(format!(
                "color must be a preset name or #RRGGBB, got '{raw}'"
            )))
        }
    }

    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

/// An inline formatting mark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    FontSize(FontSize),
    Color(TextColor),
    Bold,
    Italic,
    Underline,
    Strike,
    Highlight(Option<TextColor>),
}

impl Mark {
    /// Outer marks render first. Font size wraps everything else, matching
    /// its raised priority in the editor schema.
    const fn nesting_rank(&self) -> u8 {
        match self {
            Self::FontSize(_) => 0,
            Self::Color(_) => 1,
            Self::Bold => 2,
            Self::Italic => 3,
            Self::Underline => 4,
            Self::Strike => 5,
            Self::Highlight(_) => 6,
        }
    }

    fn open_tag(&self) -> String {
        match self {
            Self::FontSize(size) => format!("<span style=\"font-size: {}\">", size.as_css()),
            Self::Color(color) => format!("<span style=\"color: {}\">", color.as_hex()),
            Self::Bold => "<strong>".to_string(),
            Self::Italic => "<em>".to_string(),
            Self::Underline => "<u>".to_string(),
            Self::Strike => "<s class=\"line-through\">".to_string(),
            Self::Highlight(None) => "<mark class=\"relative\">".to_string(),
            Self::Highlight(Some(color)) => format!(
                "<mark class=\"relative\" data-color=\"{hex}\" style=\"background-color: {hex}; color: inherit\">",
                hex = color.as_hex()
            ),
        }
    }

    const fn close_tag(&self) -> &'static str {
        match self {
            Self::FontSize(_) | Self::Color(_) => "</span>",
            Self::Bold => "</strong>",
            Self::Italic => "</em>",
            Self::Underline => "</u>",
            Self::Strike => "</s>",
            Self::Highlight(_) => "</mark>",
        }
    }
}

/// A run of text sharing one set of marks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub marks: Vec<Mark>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_mark(mut self, mark: Mark) -> Self {
        if !self.marks.contains(&mark) {
            self.marks.push(mark);
        }
        self
    }

    pub(crate) fn render_into(&self, output: &mut String) {
        let mut marks = self.marks.iter().collect::<Vec<_>>();
        marks.sort_by_key(|mark| mark.nesting_rank());

        for mark in &marks {
            output.push_str(&mark.open_tag());
        }
        output.push_str(&escape_html(&self.text));
        for mark in marks.iter().rev() {
            output.push_str(mark.close_tag());
        }
    }
}

/// Extract the `font-size` declaration from an inline style attribute.
pub fn parse_font_size_style(style: &str) -> Option<String> {
    style.split(';').find_map(|declaration| {
        let (property, value) = declaration.split_once(':')?;
        if property.trim().eq_ignore_ascii_case("font-size") {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}
