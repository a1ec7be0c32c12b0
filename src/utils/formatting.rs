use chrono::Utc;

/// Current wall-clock time as fractional epoch seconds
pub fn now_epoch() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Count whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Clean up raw generator output: drop stray symbols, collapse whitespace,
/// and glue punctuation back to the preceding word
pub fn sanitize_reply(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric()
                || c.is_whitespace()
                || c == '_'
                || matches!(c, '.' | ',' | '!' | '?' | '🤣' | '🫵')
            {
                c
            } else {
                ' '
            }
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut out = String::with_capacity(collapsed.len());
    for c in collapsed.chars() {
        if matches!(c, '.' | ',' | '!' | '?') && out.ends_with(' ') {
            out.pop();
        }
        out.push(c);
    }
    out
}
