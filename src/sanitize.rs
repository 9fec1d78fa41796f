//! Cleanup for free text submitted through the API.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on\w+\s*=").expect("valid event handler regex"));

#[allow(clippy::expect_used)]
static JAVASCRIPT_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("valid scheme regex"));

/// Trims `text`, strips markup and script fragments, and truncates the result
/// to `max_chars` characters.
pub fn sanitize_input(text: &str, max_chars: usize) -> String {
    let text: String = text.trim().chars().filter(|c| !matches!(c, '<' | '>')).collect();
    let text = JAVASCRIPT_SCHEME.replace_all(&text, "");
    let text = EVENT_HANDLER.replace_all(&text, "");
    text.chars().take(max_chars).collect()
}
