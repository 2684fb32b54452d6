//! Markup string helpers.
//!
//! Components produce their content as plain strings. These helpers cover
//! the common pieces of building those strings, plus the small amount of
//! scanning the document needs (ids declared in markup, visible text).

use std::fmt::Write;

/// Render every item and concatenate the results.
///
/// ```rust,ignore
/// let items = ["a", "b"];
/// assert_eq!(join_map(&items, |i| format!("<li>{i}</li>")), "<li>a</li><li>b</li>");
/// ```
pub fn join_map<T, F>(items: impl IntoIterator<Item = T>, render: F) -> String
where
    F: FnMut(T) -> String,
{
    items.into_iter().map(render).collect()
}

/// Build an attribute string. Each pair becomes ` key="value"` with the
/// value escaped, so the result can follow a tag name directly.
pub fn attributes<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out = String::new();
    for (key, value) in pairs {
        // Writing to a String cannot fail.
        let _ = write!(out, " {}=\"{}\"", key.as_ref(), escape(value.as_ref()));
    }
    out
}

/// Escape text for use in element content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Values of every `id` attribute declared in `markup`, in document order.
pub fn declared_ids(markup: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let bytes = markup.as_bytes();
    let mut in_tag = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'<' => in_tag = true,
            b'>' => in_tag = false,
            quote @ (b'"' | b'\'') if in_tag => {
                // Attribute values never declare ids, even when they look like `id=`.
                match bytes[i + 1..].iter().position(|&b| b == quote) {
                    Some(offset) => i += offset + 1,
                    None => break,
                }
            }
            b'i' if in_tag
                && i > 0
                && bytes[i - 1].is_ascii_whitespace()
                && markup[i..].starts_with("id=") =>
            {
                let start = i + 3;
                let (value, end) = attribute_value(markup, start);
                ids.push(value.to_string());
                i = end;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    ids
}

/// Read a quoted or bare attribute value starting at `start`. Returns the
/// value and the index just past it.
fn attribute_value(markup: &str, start: usize) -> (&str, usize) {
    let rest = &markup[start..];
    match rest.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let body = &rest[1..];
            let len = body.find(quote).unwrap_or(body.len());
            (&body[..len], start + 1 + len + 1)
        }
        _ => {
            let len = rest
                .find(|c: char| c.is_ascii_whitespace() || c == '>')
                .unwrap_or(rest.len());
            (&rest[..len], start + len)
        }
    }
}

/// Text content of `markup`: tags removed, whitespace runs collapsed to a
/// single space, ends trimmed.
pub fn visible_text(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
