//! Small text and URL helpers shared by config, auth, and share code.

/// Trim optional text and drop it when nothing is left.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Strip trailing slashes so paths can be appended with `format!`.
pub fn trim_trailing_slash(value: &str) -> &str {
    value.trim_end_matches('/')
}

/// Truncate backend error bodies to at most 180 characters.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Build a readable message from a backend error body: the first of
/// `message`, `msg`, `error_description`, `error` or `hint`, then the status.
pub fn backend_error_message(status: u16, body: &str) -> String {
    if let Ok(serde_json::Value::Object(payload)) = serde_json::from_str(body) {
        let message = ["message", "msg", "error_description", "error", "hint"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(serde_json::Value::as_str))
            .map(str::trim)
            .filter(|message| !message.is_empty());
        if let Some(message) = message {
            return format!("{message} ({status})");
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("{trimmed} ({status})")
    }
}

/// Shorten an id for list output (`3f2a9c1e-5b7d`).
pub fn short_id(id: &str) -> String {
    id.chars().take(13).collect()
}

/// Current Unix timestamp in seconds.
pub fn unix_timestamp_now() -> i64 {
    chrono::Utc::now().timestamp()
}
