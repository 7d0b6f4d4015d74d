//! Byte-string searching over raw buffers.

/// Finds `needle` in `haystack` at or after `from`, returning the absolute
/// offset of the first match.
pub(crate) fn find(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return (from <= haystack.len()).then_some(from);
    }
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| from + i)
}

/// Finds a single byte at or after `from`.
pub(crate) fn find_byte(haystack: &[u8], from: usize, byte: u8) -> Option<usize> {
    haystack
        .get(from..)?
        .iter()
        .position(|&b| b == byte)
        .map(|i| from + i)
}

/// Finds the next CRLF pair at or after `from`.
pub(crate) fn find_crlf(haystack: &[u8], from: usize) -> Option<usize> {
    find(haystack, from, b"\r\n")
}
