//! Conversions between plain text and editor HTML.

use std::sync::LazyLock;

use regex::Regex;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid line break regex"));
static BLOCK_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</(p|div|li|h[1-6]|blockquote|pre|ul|ol)\s*>").expect("valid block regex")
});
static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Escape text for use in element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Decode the entities `escape_html` produces plus `&nbsp;`.
pub fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// One `<p>` per non-empty line.
pub fn text_to_html(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("<p>{}</p>", escape_html(line)))
        .collect()
}

/// Strip markup from editor HTML. Block boundaries and `<br>` become line
/// breaks; blank lines are dropped.
pub fn html_to_plain_text(html: &str) -> String {
    let with_breaks = LINE_BREAK.replace_all(html, "\n");
    let with_blocks = BLOCK_END.replace_all(&with_breaks, "\n");
    let stripped = ANY_TAG.replace_all(&with_blocks, "");
    let decoded = decode_entities(&stripped);

    decoded
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_covers_special_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn text_to_html_wraps_lines_and_skips_blanks() {
        assert_eq!(
            text_to_html("first\n\n  \nsecond <b>\n"),
            "<p>first</p><p>second &lt;b&gt;</p>"
        );
        assert_eq!(text_to_html(""), "");
    }

    #[test]
    fn html_to_plain_text_keeps_block_boundaries() {
        let html = "<p>One <strong>bold</strong></p><ul class=\"list-disc ml-4\"><li><p>Two</p></li></ul><p>A&amp;B<br>C</p>";
        assert_eq!(html_to_plain_text(html), "One bold\nTwo\nA&B\nC");
    }

    #[test]
    fn plain_text_and_html_round_trip_for_simple_text() {
        let text = "alpha\nbeta & gamma";
        let html = text_to_html(text);
        assert_eq!(html_to_plain_text(&html), text);
    }
}
