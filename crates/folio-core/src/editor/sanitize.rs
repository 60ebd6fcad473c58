//! Allowlist cleaning for note HTML rendered outside the editor.

use std::borrow::Cow;

/// Keep the markup the editor emits and drop everything else: scripts,
/// event handlers and non-image `data:` URLs.
pub fn sanitize_html(html: &str) -> String {
    ammonia::Builder::default()
        .add_generic_attributes(&["class", "style"])
        .add_tag_attributes("img", &["alt", "src", "width"])
        .add_tag_attributes("mark", &["data-color"])
        .add_url_schemes(&["data"])
        .attribute_filter(filter_attribute)
        .clean(html)
        .to_string()
}

fn filter_attribute<'a>(element: &str, attribute: &str, value: &'a str) -> Option<Cow<'a, str>> {
    let trimmed = value.trim_start();
    let has_prefix = |range: std::ops::Range<usize>, prefix: &str| {
        trimmed
            .get(range)
            .is_some_and(|part| part.eq_ignore_ascii_case(prefix))
    };
    if !has_prefix(0..5, "data:") {
        return Some(Cow::Borrowed(value));
    }

    let is_image = has_prefix(5..11, "image/");
    (element == "img" && attribute == "src" && is_image).then_some(Cow::Borrowed(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{render_blocks, Block, Mark, ResizableImage, TextColor, TextRun};

    #[test]
    fn editor_markup_survives() {
        let html = "<p><strong>a</strong><em>b</em><u>c</u><s class=\"line-through\">d</s>\
<mark class=\"relative\">e</mark>\
<mark class=\"relative\" data-color=\"#0000FF\" style=\"background-color: #0000FF; color: inherit\">h</mark><span style=\"color: #FF0000\">f</span>\
<span style=\"font-size: 18px\">g</span></p>\
<ul class=\"list-disc ml-4\"><li><p>one</p></li></ul>\
<ol class=\"list-decimal ml-4\"><li><p>two</p></li></ol><h2>Heading</h2>";

        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn rendered_blocks_keep_marks_and_data_images() {
        let html = render_blocks(&[
            Block::Paragraph(vec![
                TextRun::plain("red").with_mark(Mark::Color(TextColor::parse("Red").unwrap()))
            ]),
            Block::Image(ResizableImage::new("data:image/png;base64,iVBORw0KGgo=")),
        ]);

        let cleaned = sanitize_html(&html);
        assert!(cleaned.contains("<span style=\"color: #FF0000\">red</span>"));
        assert!(cleaned.contains("src=\"data:image/png;base64,iVBORw0KGgo=\""));
        assert!(cleaned.contains("width=\"100%\""));
        assert!(cleaned.contains("rounded-lg hover:shadow-lg transition-shadow"));
    }

    #[test]
    fn scripts_and_handlers_are_removed() {
        let cleaned = sanitize_html(
            "<img src=x onerror=alert(document.cookie)><script>steal()</script>\
<a href=\"javascript:alert(1)\">x</a><a href=\"data:text/html,<script>1</script>\">y</a>\
<p onclick=\"steal()\">kept</p>",
        );

        assert!(!cleaned.contains("<script"));
        assert!(!cleaned.contains("steal()"));
        assert!(!cleaned.contains("onerror"));
        assert!(!cleaned.contains("javascript:"));
        assert!(!cleaned.contains("data:text/html"));
        assert!(cleaned.contains("<p>kept</p>"));
    }

    #[test]
    fn data_urls_are_only_kept_on_image_sources() {
        assert!(!sanitize_html("<img src=\"data:text/html;base64,PHNjcmlwdD4=\">").contains("data:"));
        assert!(sanitize_html("<img src=\"data:image/gif;base64,R0lGOD=\">").contains("data:image/gif"));
    }
}
