//! Low-level argument and path-string helpers used by the resolver.

/// Returns the last path component of `path`, handling both `/` and `\`
/// separators.
pub fn last_name_from_path(path: &str) -> &str {
    let after_slash = match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    };
    match after_slash.rfind('\\') {
        Some(pos) => &after_slash[pos + 1..],
        None => after_slash,
    }
}

/// Strips at most one trailing path separator from `path`.
///
/// `"dir/"` becomes `"dir"`; `"dir//"` becomes `"dir/"`; a bare `"/"`
/// becomes `""` (callers treat that as "no meaningful name").
pub fn strip_one_trailing_separator(path: &str) -> &str {
    path.strip_suffix('/')
        .or_else(|| path.strip_suffix('\\'))
        .unwrap_or(path)
}

/// Parses an unsigned 32-bit integer from the start of `s`.
///
/// Returns `None` if no leading digits are present or if the digit run does
/// not fit in a `u32` (so `4294967297` is rejected rather than wrapped into
/// range).  Otherwise returns `Some((value, remainder))` where `remainder`
/// is the slice of `s` that was not consumed.  Callers that require the
/// whole string to be numeric must check that the remainder is empty
/// (catches input such as `9x`).
pub fn read_u32_from_str(s: &str) -> Option<(u32, &str)> {
    let bytes = s.as_bytes();
    let mut i = 0usize;

    if i >= bytes.len() || !bytes[i].is_ascii_digit() {
        return None;
    }

    let mut result: u32 = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        result = result
            .checked_mul(10)?
            .checked_add((bytes[i] - b'0') as u32)?;
        i += 1;
    }

    Some((result, &s[i..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── last_name_from_path ──────────────────────────────────────────────────

    #[test]
    fn basename_plain() {
        assert_eq!(last_name_from_path("foo.txt"), "foo.txt");
    }

    #[test]
    fn basename_nested() {
        assert_eq!(last_name_from_path("a/b/c.txt"), "c.txt");
    }

    #[test]
    fn basename_backslash() {
        assert_eq!(last_name_from_path("a\\b\\c.txt"), "c.txt");
    }

    #[test]
    fn basename_trailing_slash_is_empty() {
        assert_eq!(last_name_from_path("dir/"), "");
    }

    // ── strip_one_trailing_separator ─────────────────────────────────────────

    #[test]
    fn strip_single_separator() {
        assert_eq!(strip_one_trailing_separator("dir/"), "dir");
    }

    #[test]
    fn strip_only_one_separator() {
        assert_eq!(strip_one_trailing_separator("dir//"), "dir/");
    }

    #[test]
    fn strip_root_yields_empty() {
        assert_eq!(strip_one_trailing_separator("/"), "");
    }

    #[test]
    fn strip_no_separator_is_identity() {
        assert_eq!(strip_one_trailing_separator("dir"), "dir");
    }

    // ── read_u32_from_str ────────────────────────────────────────────────────

    #[test]
    fn read_u32_simple() {
        assert_eq!(read_u32_from_str("19"), Some((19, "")));
    }

    #[test]
    fn read_u32_with_remainder() {
        assert_eq!(read_u32_from_str("9x"), Some((9, "x")));
    }

    #[test]
    fn read_u32_no_digits() {
        assert_eq!(read_u32_from_str("fast"), None);
    }

    #[test]
    fn read_u32_empty() {
        assert_eq!(read_u32_from_str(""), None);
    }

    #[test]
    fn read_u32_max_value() {
        assert_eq!(read_u32_from_str("4294967295"), Some((u32::MAX, "")));
    }

    #[test]
    fn read_u32_overflow_is_none() {
        // 2^32 + 1 must not wrap around to 1.
        assert_eq!(read_u32_from_str("4294967297"), None);
        assert_eq!(read_u32_from_str("99999999999999999999"), None);
    }
}
