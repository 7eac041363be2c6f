//! HTML entity encoding for text that came from views or calendar feeds.

use std::borrow::Cow;

/// Encodes `& < > " '` as HTML entities.
///
/// Returns the input unchanged (borrowed) when nothing needs escaping.
pub fn encode_html(text: &str) -> Cow<'_, str> {
    if !text.contains(needs_escape) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    push_encoded(&mut out, text);
    Cow::Owned(out)
}

/// Appends `text` to `out`, entity-encoding markup-significant characters.
pub fn push_encoded(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}

fn needs_escape(ch: char) -> bool {
    matches!(ch, '&' | '<' | '>' | '"' | '\'')
}
