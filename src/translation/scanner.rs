#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Backticked,
    LineComment,
    BlockComment,
}

/// Find the closing brace of a `{name}` placeholder opened at `start`.
///
/// Returns the byte index of `}` and the name between the braces. Names may not be empty and
/// may not contain braces, quotes or whitespace; anything else is left as literal text.
pub(super) fn scan_placeholder(bytes: &[u8], start: usize) -> Option<(usize, &str)> {
    let mut idx = start + 1;
    while idx < bytes.len() {
        match bytes[idx] {
            b'}' => break,
            b'{' | b'\'' | b'"' | b'`' => return None,
            b if b.is_ascii_whitespace() => return None,
            _ => idx += 1,
        }
    }
    if idx >= bytes.len() || idx == start + 1 {
        return None;
    }
    std::str::from_utf8(&bytes[start + 1..idx])
        .ok()
        .map(|name| (idx, name))
}
