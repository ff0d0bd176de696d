//! Plain-text sanitization for learner-supplied and displayed text.

/// Maximum length of a stored note, in characters.
pub const MAX_NOTE_LENGTH: usize = 10_000;

/// Escape the five markup metacharacters `& < > " '`.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a note and cap it at [`MAX_NOTE_LENGTH`] characters.
///
/// The cap applies after escaping, so an entity may be cut mid-sequence.
pub fn sanitize_note(note: &str) -> String {
    let escaped = escape_text(note);
    match escaped.char_indices().nth(MAX_NOTE_LENGTH) {
        Some((byte_idx, _)) => escaped[..byte_idx].to_string(),
        None => escaped,
    }
}
