//! Sanitization of untrusted row values
//!
//! Every string that enters the catalog originates from a user-supplied file.
//! Identifiers flow into storage keys and attribute lookups downstream, so they
//! are constrained to a safe alphabet here, independent of how callers use them.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default bound for free-text values (names, descriptions, facet values).
pub const DEFAULT_TEXT_LIMIT: usize = 300;

/// Default bound for identifiers (product/service ids).
pub const DEFAULT_IDENTIFIER_LIMIT: usize = 64;

/// C0/C1 control characters plus zero-width characters and the BOM.
static STRIP_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x00-\x1F\x7F\u{0080}-\u{009F}\u{200B}-\u{200D}\u{2060}\u{FEFF}]")
        .expect("strip class is a valid pattern")
});

/// Characters allowed to survive in an identifier.
static IDENTIFIER_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("identifier class is a valid pattern"));

/// Produce a bounded, control-character-free string from an arbitrary value.
///
/// Trims surrounding whitespace, strips control/zero-width characters and
/// truncates to `max_len` characters. Never fails; empty input stays empty.
pub fn sanitize_text(value: &str, max_len: usize) -> String {
    let stripped = STRIP_CLASS.replace_all(value, "");
    let trimmed = stripped.trim();
    trimmed.chars().take(max_len).collect()
}

/// Restrict a value to the identifier alphabet `[A-Za-z0-9._-]`.
///
/// Applies [`sanitize_text`] first; all other characters are dropped, not
/// replaced. An empty result is valid and means "no id".
pub fn sanitize_identifier(value: &str, max_len: usize) -> String {
    let text = sanitize_text(value, max_len);
    IDENTIFIER_CLASS.replace_all(&text, "").to_string()
}

/// Sanitize a list of identifiers, dropping entries that sanitize to empty.
///
/// Order is preserved and duplicates are retained; the caller decides whether
/// to dedupe.
pub fn sanitize_identifier_list<I, S>(values: I, max_len: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| sanitize_identifier(v.as_ref(), max_len))
        .filter(|id| !id.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_strips_control_characters() {
        assert_eq!(sanitize_text("wid\x00get\x1B", DEFAULT_TEXT_LIMIT), "widget");
        assert_eq!(sanitize_text("a\u{0085}b", DEFAULT_TEXT_LIMIT), "ab");
    }

    #[test]
    fn text_strips_zero_width_and_bom() {
        assert_eq!(
            sanitize_text("\u{FEFF}wid\u{200B}get\u{2060}", DEFAULT_TEXT_LIMIT),
            "widget"
        );
    }

    #[test]
    fn text_trims_and_truncates() {
        assert_eq!(sanitize_text("  hello  ", DEFAULT_TEXT_LIMIT), "hello");
        assert_eq!(sanitize_text("abcdef", 3), "abc");
        assert_eq!(sanitize_text("", DEFAULT_TEXT_LIMIT), "");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(sanitize_text("äöüß", 2), "äö");
    }

    #[test]
    fn identifier_keeps_allowed_alphabet_only() {
        assert_eq!(
            sanitize_identifier("p-1.a_b", DEFAULT_IDENTIFIER_LIMIT),
            "p-1.a_b"
        );
        assert_eq!(
            sanitize_identifier("<script>p1</script>", DEFAULT_IDENTIFIER_LIMIT),
            "scriptp1script"
        );
        assert_eq!(sanitize_identifier("ä ö ü", DEFAULT_IDENTIFIER_LIMIT), "");
    }

    #[test]
    fn identifier_list_drops_empties_keeps_order_and_duplicates() {
        let ids = sanitize_identifier_list(
            ["s1", "##", "s2", "s1", "  "],
            DEFAULT_IDENTIFIER_LIMIT,
        );
        assert_eq!(ids, vec!["s1", "s2", "s1"]);
    }
}
