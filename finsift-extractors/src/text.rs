use std::sync::OnceLock;

use regex::Regex;

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script>|<style\b[^>]*>.*?</style>|<[^>]*>").unwrap()
    })
}

/// Collapse whitespace runs to single spaces and trim both ends.
///
/// Idempotent and infallible; malformed input degrades to best-effort
/// output.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove tag-like spans, decode a fixed set of named character entities,
/// then normalize whitespace.
pub fn strip_markup(raw: &str) -> String {
    let without_tags = tag_regex().replace_all(raw, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">");
    normalize(&decoded)
}

/// Per-line variant of [`normalize`]: collapses whitespace within each
/// line, trims, and drops blank lines. Keeps the line structure that
/// labeled-line scans depend on.
pub fn normalize_lines(raw: &str) -> String {
    raw.lines()
        .map(normalize)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate to at most `max_chars` characters without splitting a
/// character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
