//! Cleanup applied to all raw text before it is used downstream.

use super::patterns::{INLINE_WHITESPACE, INVISIBLE_CHARS, LINE_BREAK};

/// Normalize pasted, typed or OCR-derived text.
///
/// Removes invisible format characters, unifies line endings to `\n`,
/// collapses every run of non-newline whitespace to one space and trims the
/// result. Idempotent.
pub fn normalize_text(text: &str) -> String {
    let visible = INVISIBLE_CHARS.replace_all(text, "");
    let unix = LINE_BREAK.replace_all(&visible, "\n");
    let collapsed = INLINE_WHITESPACE.replace_all(&unix, " ");
    collapsed.trim().to_string()
}

/// Append newly recognized text to already staged text.
///
/// The addition goes after a blank line; staged text is never replaced.
pub fn append_staged(existing: &str, addition: &str) -> String {
    match (existing.is_empty(), addition.is_empty()) {
        (true, _) => addition.to_string(),
        (false, true) => existing.to_string(),
        (false, false) => format!("{}\n\n{}", existing, addition),
    }
}
