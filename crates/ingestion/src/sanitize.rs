//! Line sanitising

/// Trim a raw line; `None` when nothing but whitespace remains
///
/// A leading byte order mark counts as whitespace.
pub fn clean_line(raw: &str) -> Option<&str> {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    (!trimmed.is_empty()).then_some(trimmed)
}
