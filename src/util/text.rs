/// Truncates a string to at most `max_bytes` bytes of UTF-8.
///
/// The cut never splits a multi-byte character: if `max_bytes` lands inside
/// one, the whole character is dropped. Returns the input unchanged when it
/// already fits.
///
/// # Examples
///
/// ```
/// use podcast_rss_generator::util::truncate_to_bytes;
///
/// assert_eq!(truncate_to_bytes("Hello", 10), "Hello");
/// assert_eq!(truncate_to_bytes("Hello", 3), "Hel");
/// // "é" is two bytes; a 2-byte budget cannot hold "aé"
/// assert_eq!(truncate_to_bytes("aé", 2), "a");
/// ```
pub fn truncate_to_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut cut = max_bytes;
    while cut > 0 && !s.is_char_boundary(cut) {
        cut -= 1;
    }
    &s[..cut]
}

/// Drops a trailing unterminated markup tag.
///
/// If the last `<` in `s` has no `>` after it, everything from that `<`
/// onwards is removed. Text without a dangling tag is returned unchanged.
pub fn strip_unterminated_tag(s: &str) -> &str {
    match s.rfind('<') {
        Some(open) if !s[open..].contains('>') => &s[..open],
        _ => s,
    }
}
