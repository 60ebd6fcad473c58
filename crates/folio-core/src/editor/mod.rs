//! Rich-text content model.
//!
//! Notes persist their body as the HTML the editor emits. This module builds
//! and reads that HTML: inline marks (color, font size and the basic text
//! styles), paragraph and list blocks, and resizable images. It also
//! cleans stored HTML before it is shown outside the editor.

mod blocks;
mod marks;
mod sanitize;
mod text;

pub use blocks::{append_html, render_blocks, Block, ResizableImage};
pub use marks::{parse_font_size_style, FontSize, Mark, TextColor, TextRun, COLORS, FONT_SIZES};
pub use sanitize::sanitize_html;
pub use text::{decode_entities, escape_html, html_to_plain_text, text_to_html};
