/// `--` opens a line comment. With `needs_space` (MySQL) it must be followed by whitespace
/// or end of input; `SQLite` accepts a bare `--`.
pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize, needs_space: bool) -> bool {
    let dashes = bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-');
    dashes
        && (!needs_space
            || bytes
                .get(idx + 2)
                .is_none_or(|b| b.is_ascii_whitespace()))
}

pub(super) fn is_hash_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'#')
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}
