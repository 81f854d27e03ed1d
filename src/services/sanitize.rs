// src/services/sanitize.rs

//! Flavor name normalization.
//!
//! Cleans up a raw capture: leading punctuation, HTML entities, trailing
//! emoji and whatever follows the first sentence terminator.

use std::borrow::Cow;

/// Normalize a raw extracted string into a flavor name.
///
/// Applying it twice gives the same result as applying it once.
pub fn sanitize(raw: &str) -> String {
    let decoded = decode_entities(raw);
    let text = decoded.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | '-'));

    let text = match text.find(is_emoji) {
        Some(pos) => &text[..pos],
        None => text,
    };

    first_sentence(text).trim().to_string()
}

/// Decode HTML entities until the text stops changing.
///
/// A single pass leaves `&amp;amp;` as `&amp;`, which a second sanitize would
/// decode again. Every effective pass shortens the text, so this terminates.
fn decode_entities(raw: &str) -> Cow<'_, str> {
    let mut current = Cow::Borrowed(raw);
    loop {
        let decoded = html_escape::decode_html_entities(current.as_ref());
        if decoded == current.as_ref() {
            return current;
        }
        current = Cow::Owned(decoded.into_owned());
    }
}

/// Text before the first `!`, `.` or double space.
fn first_sentence(text: &str) -> &str {
    let terminator = text.find(['!', '.']);
    let double_space = text.find("  ");
    let end = match (terminator, double_space) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => text.len(),
    };
    &text[..end]
}

/// Emoticons, transport, pictographs, supplemental symbols, misc symbols and dingbats.
pub fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F600..=0x1F64F
            | 0x1F680..=0x1F6FF
            | 0x1F300..=0x1F5FF
            | 0x1F900..=0x1F9FF
            | 0x2600..=0x26FF
            | 0x2700..=0x27BF
    )
}
