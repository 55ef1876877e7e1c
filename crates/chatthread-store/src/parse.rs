use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

/// `YYYY-MM-DDTHH:mm:ss(.f+)?Z` anywhere in the text. On the live thread it
/// sits inside `var timestamp = "..."`.
static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d{1,9})?Z").expect("valid timestamp regex")
});

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([^\s@]+)").expect("valid mention regex"));

const TRAILING_PUNCTUATION: &[char] = &[',', '.', ';', ':', '!', '?', ')', '"', '\''];

/// Pull the first embedded ISO-8601 timestamp out of `source`.
pub fn extract_timestamp(source: &str) -> Result<DateTime<Utc>, String> {
    let found = TIMESTAMP
        .find(source)
        .ok_or_else(|| format!("no timestamp in {:?}", truncate(source, 60)))?;

    DateTime::parse_from_rfc3339(found.as_str())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp {:?}: {}", found.as_str(), e))
}

/// Distinct `@name` mentions in order of first appearance.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in MENTION.captures_iter(text) {
        let name = caps[1].trim_end_matches(TRAILING_PUNCTUATION);
        if name.is_empty() || names.iter().any(|n| n == name) {
            continue;
        }
        names.push(name.to_string());
    }
    names
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
