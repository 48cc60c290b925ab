//! String helpers for log and console previews.

/// Truncate to at most `max_len` bytes, appending `...` when cut.
///
/// Never splits a UTF-8 character.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3).min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Collapse whitespace runs (including newlines) into single spaces and truncate.
pub fn preview(s: &str, max_len: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&flat, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("select", 10), "select");
        assert_eq!(truncate("select * from users", 9), "select...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // "é" is two bytes; the cut must back off to a char boundary
        assert_eq!(truncate("ééééé", 8), "éé...");
    }

    #[test]
    fn test_preview_flattens_sql() {
        let sql = "SELECT name\n  FROM users\n WHERE id = 1";
        assert_eq!(preview(sql, 100), "SELECT name FROM users WHERE id = 1");
        assert_eq!(preview(sql, 14), "SELECT name...");
    }
}
