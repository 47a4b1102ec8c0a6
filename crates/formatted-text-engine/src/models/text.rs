use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

/// Cleans text before it enters a line: non-breaking spaces become plain
/// spaces and control / bidi marks are removed.
pub fn normalize(text: &str) -> Cow<'_, str> {
    let control_regex = control_regex();
    let text = if text.contains('\u{00a0}') {
        Cow::Owned(text.replace('\u{00a0}', " "))
    } else {
        Cow::Borrowed(text)
    };
    let stripped = match control_regex.replace_all(&text, "") {
        Cow::Borrowed(_) => None,
        Cow::Owned(stripped) => Some(stripped),
    };
    match stripped {
        Some(stripped) => Cow::Owned(stripped),
        None => text,
    }
}

/// Normalizes `text` like [`normalize`] and also returns, for every char
/// offset of the input up to and including its end, the matching offset in
/// the output.
pub fn normalize_mapped(text: &str) -> (String, Vec<usize>) {
    let control_regex = control_regex();
    let mut out = String::with_capacity(text.len());
    let mut offsets = Vec::with_capacity(text.len() + 1);
    let mut kept = 0;
    let mut buf = [0u8; 4];
    for c in text.chars() {
        offsets.push(kept);
        if c == '\u{00a0}' {
            out.push(' ');
        } else if control_regex.is_match(c.encode_utf8(&mut buf)) {
            continue;
        } else {
            out.push(c);
        }
        kept += 1;
    }
    offsets.push(kept);
    (out, offsets)
}

fn control_regex() -> &'static Regex {
    static CONTROL_REGEX: OnceLock<Regex> = OnceLock::new();
    CONTROL_REGEX.get_or_init(|| {
        Regex::new(r"[\x{0000}-\x{001F}\x{007F}-\x{009F}\x{061C}\x{200E}\x{200F}\x{202A}-\x{202E}\x{2066}-\x{2069}]")
            .expect("Invalid control character regex")
    })
}

/// Length of `text` in chars.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Converts a char offset into a byte offset, clamping to the end of `text`.
pub fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Slices `text` by char offsets `[start, end)`.
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let start = byte_offset(text, start);
    let end = byte_offset(text, end).max(start);
    &text[start..end]
}
