// Normalize extracted report text before it is embedded in the prompt.
// Removes invisible Unicode, neutralizes our own block markers, collapses
// whitespace and bounds the length.

/// Maximum text length forwarded to the model (characters).
pub const MAX_TEXT_CHARS: usize = 50_000;

/// Delimiters wrapping the report text inside the prompt.
pub const REPORT_BEGIN_MARKER: &str = "--- INIZIO TESTO REFERTO ---";
pub const REPORT_END_MARKER: &str = "--- FINE TESTO REFERTO ---";

/// Normalize text for prompt embedding.
pub fn normalize_text(raw: &str) -> String {
    let visible = remove_invisible_chars(raw);
    let (unmarked, removed) = remove_marker_lines(&visible);
    if removed > 0 {
        // Never log content, only the count.
        tracing::warn!(removed_lines = removed, "Prompt block markers found in report text");
    }
    let normalized = normalize_whitespace(&unmarked);
    truncate_chars(&normalized, MAX_TEXT_CHARS)
}

/// Drop zero-width, bidi-override and control characters.
/// Keeps space, tab, CR and LF.
fn remove_invisible_chars(text: &str) -> String {
    text.chars()
        .filter(|c| {
            if matches!(*c, ' ' | '\n' | '\t' | '\r') {
                return true;
            }
            if matches!(
                *c,
                '\u{00AD}'  // Soft hyphen
                | '\u{200B}'..='\u{200F}' // Zero-width + LTR/RTL marks
                | '\u{202A}'..='\u{202E}' // Bidi embedding/override
                | '\u{2060}'..='\u{2064}' // Word joiner + invisible operators
                | '\u{FEFF}' // BOM
            ) {
                return false;
            }
            !c.is_control()
        })
        .collect()
}

/// Remove lines that would open or close the report block early.
fn remove_marker_lines(text: &str) -> (String, usize) {
    let mut kept = Vec::new();
    let mut removed = 0usize;
    for line in text.lines() {
        if line.contains(REPORT_BEGIN_MARKER) || line.contains(REPORT_END_MARKER) {
            removed += 1;
        } else {
            kept.push(line);
        }
    }
    (kept.join("\n"), removed)
}

/// Trim every line and rejoin the non-blank paragraphs with one blank line.
fn normalize_whitespace(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    lines
        .split(|line| line.is_empty())
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| paragraph.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Truncate to at most `max_chars` characters, never splitting a char.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            tracing::info!(max_chars, "Report text truncated");
            text[..byte_idx].to_string()
        }
        None => text.to_string(),
    }
}
