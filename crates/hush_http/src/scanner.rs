//! Byte-level scanning over raw HTTP messages.

/// Separates the header block from the body.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Position of the first CRLF-CRLF, if any.
fn terminator_position(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}

/// Index of the last header byte, i.e. the byte just before the first CRLF-CRLF.
///
/// Without a terminator the whole buffer is treated as header and
/// `len - 1` is returned (0 for an empty buffer).
pub fn find_header_boundary(bytes: &[u8]) -> usize {
    match terminator_position(bytes) {
        Some(pos) => pos.saturating_sub(1),
        None => bytes.len().saturating_sub(1),
    }
}

/// The header block, without its terminator.
pub fn header_block(bytes: &[u8]) -> &[u8] {
    match terminator_position(bytes) {
        Some(pos) => &bytes[..pos],
        None => bytes,
    }
}

/// Offset of the first body byte; `bytes.len()` when no terminator was found,
/// so a headers-only buffer has an empty body.
pub fn body_offset(bytes: &[u8]) -> usize {
    match terminator_position(bytes) {
        Some(pos) => pos + HEADER_TERMINATOR.len(),
        None => bytes.len(),
    }
}

/// Replace every ASCII case-insensitive occurrence of `needle` at or after
/// `from` with `replacement`.
///
/// Matches never overlap and scanning resumes right after the inserted
/// replacement, so a replacement is never itself re-matched. Bytes before
/// `from` are copied untouched.
pub fn replace_all(bytes: &[u8], from: usize, needle: &[u8], replacement: &[u8]) -> Vec<u8> {
    let from = from.min(bytes.len());
    if needle.is_empty() {
        return bytes.to_vec();
    }

    let mut out = Vec::with_capacity(bytes.len());
    out.extend_from_slice(&bytes[..from]);

    let mut i = from;
    while i < bytes.len() {
        let rest = &bytes[i..];
        if rest.len() >= needle.len() && rest[..needle.len()].eq_ignore_ascii_case(needle) {
            out.extend_from_slice(replacement);
            i += needle.len();
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{body_offset, find_header_boundary, header_block, replace_all};

    #[test]
    fn boundary_is_last_header_byte() {
        let bytes = b"X\r\n\r\nY";
        assert_eq!(find_header_boundary(bytes), 0);

        let bytes = b"HTTP/1.1 200 OK\r\nA: b\r\n\r\nbody";
        let idx = find_header_boundary(bytes);
        assert_eq!(bytes[idx], b'b');
        assert_eq!(&bytes[idx + 1..idx + 5], b"\r\n\r\n");
    }

    #[test]
    fn boundary_falls_back_to_whole_buffer() {
        assert_eq!(find_header_boundary(b"no terminator"), 12);
        assert_eq!(find_header_boundary(b""), 0);
        assert_eq!(body_offset(b"no terminator"), 13);
        assert_eq!(header_block(b"no terminator"), b"no terminator");
    }

    #[test]
    fn body_offset_skips_terminator() {
        let bytes = b"H: v\r\n\r\nbody";
        assert_eq!(&bytes[body_offset(bytes)..], b"body");
        assert_eq!(header_block(bytes), b"H: v");
    }

    #[test]
    fn replace_all_is_case_insensitive() {
        let out = replace_all(b"Hello WORLD, world and WoRlD", 0, b"world", b"---");
        assert_eq!(out, b"Hello ---, --- and ---");
    }

    #[test]
    fn replace_all_leaves_prefix_alone() {
        let bytes = b"world\r\n\r\nworld";
        let from = body_offset(bytes);
        let out = replace_all(bytes, from, b"world", b"---");
        assert_eq!(out, b"world\r\n\r\n---");
    }

    #[test]
    fn replace_all_handles_length_changes() {
        let out = replace_all(b"aXbXXc", 0, b"x", b"---");
        assert_eq!(out, b"a---b------c");

        let out = replace_all(b"badword badword", 0, b"BADWORD", b"---");
        assert_eq!(out, b"--- ---");
    }

    #[test]
    fn replace_all_does_not_rematch_replacement() {
        let out = replace_all(b"ab ab", 0, b"ab", b"xabx");
        assert_eq!(out, b"xabx xabx");
    }

    #[test]
    fn replace_all_is_idempotent_once_clean() {
        let once = replace_all(b"spam and SPAM", 0, b"spam", b"---");
        let twice = replace_all(&once, 0, b"spam", b"---");
        assert_eq!(once, twice);
    }

    #[test]
    fn replace_all_ignores_empty_needle_and_out_of_range_offset() {
        assert_eq!(replace_all(b"abc", 0, b"", b"---"), b"abc");
        assert_eq!(replace_all(b"abc", 10, b"a", b"---"), b"abc");
    }

    #[test]
    fn replace_all_match_at_tail() {
        assert_eq!(replace_all(b"hello world", 0, b"world", b"---"), b"hello ---");
        assert_eq!(replace_all(b"hello wor", 0, b"world", b"---"), b"hello wor");
    }
}
