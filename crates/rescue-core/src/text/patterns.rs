//! Regex patterns for text cleanup.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invisible format characters: soft hyphen, combining grapheme joiner,
    // Mongolian vowel separator, zero-width space/joiners, directional marks,
    // embeddings and isolates, word joiner, invisible operators, deprecated
    // format controls, BOM
    pub static ref INVISIBLE_CHARS: Regex = Regex::new(
        r"[\u{00AD}\u{034F}\u{180E}\u{200B}-\u{200F}\u{202A}-\u{202E}\u{2060}-\u{206F}\u{FEFF}]"
    ).unwrap();

    pub static ref LINE_BREAK: Regex = Regex::new(r"\r\n?").unwrap();

    // Whitespace runs that do not contain a newline
    pub static ref INLINE_WHITESPACE: Regex = Regex::new(r"[^\S\n]+").unwrap();

    // Thai country prefix on an otherwise national number
    pub static ref THAI_COUNTRY_PREFIX: Regex = Regex::new(r"^\+?66").unwrap();

    // A run of 8 to 13 ASCII digits, optionally spaced or dashed, inside prose
    pub static ref PHONE_RUN: Regex = Regex::new(r"\+?[0-9](?:[ \-]?[0-9]){7,12}").unwrap();
}
