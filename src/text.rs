//! Text-scanning primitives used to pull join keys out of free text.
//!
//! A *word* is a maximal run of alphanumeric characters or underscores.
//! All offsets are byte offsets into the scanned string, and every returned
//! token borrows from the input.

/// Returns true for characters that belong to a word token.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte spans `(start, end)` of every word token in `text`, in order.
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        match (is_word_char(c), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

/// A gap between two adjacent words that is non-empty and whitespace only.
fn is_blank_gap(gap: &str) -> bool {
    !gap.is_empty() && gap.chars().all(char::is_whitespace)
}

/// Returns the word immediately preceding any of `anchors`.
///
/// The anchor must be a whole word and only whitespace may separate it from
/// the returned token. The leftmost qualifying occurrence wins.
#[must_use]
pub fn token_before_any<'a>(text: &'a str, anchors: &[&str]) -> Option<&'a str> {
    word_spans(text).windows(2).find_map(|pair| {
        let (a, b) = (pair[0], pair[1]);
        let next = &text[b.0..b.1];
        (anchors.contains(&next) && is_blank_gap(&text[a.1..b.0])).then(|| &text[a.0..a.1])
    })
}

/// Returns the word immediately following any of `anchors`.
///
/// Same adjacency rules as [`token_before_any`], mirrored.
#[must_use]
pub fn token_after_any<'a>(text: &'a str, anchors: &[&str]) -> Option<&'a str> {
    word_spans(text).windows(2).find_map(|pair| {
        let (a, b) = (pair[0], pair[1]);
        let prev = &text[a.0..a.1];
        (anchors.contains(&prev) && is_blank_gap(&text[a.1..b.0])).then(|| &text[b.0..b.1])
    })
}

/// Returns the word immediately preceding `anchor`.
#[must_use]
pub fn token_before<'a>(text: &'a str, anchor: &str) -> Option<&'a str> {
    token_before_any(text, &[anchor])
}

/// Returns the word immediately following `anchor`.
#[must_use]
pub fn token_after<'a>(text: &'a str, anchor: &str) -> Option<&'a str> {
    token_after_any(text, &[anchor])
}

/// Returns the first run of ASCII digits in `text`.
#[must_use]
pub fn digits_in(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}

/// Replaces every occurrence of `abbrev` that starts a word with `full`.
///
/// `"DEVIL L., HILLSDALE"` expands `"L."` to `"DEVIL LAKE, HILLSDALE"` while
/// `"HILL."` is left alone.
#[must_use]
pub fn expand_abbreviation(text: &str, abbrev: &str, full: &str) -> String {
    if abbrev.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut i = 0;
    while let Some(c) = text[i..].chars().next() {
        let at_word_start = prev.map_or(true, |p| !is_word_char(p));
        if at_word_start && text[i..].starts_with(abbrev) {
            out.push_str(full);
            prev = abbrev.chars().last();
            i += abbrev.len();
            continue;
        }
        out.push(c);
        prev = Some(c);
        i += c.len_utf8();
    }
    out
}

/// Canonical form of a join-key component (county or lake name).
///
/// Uppercases, drops apostrophes (straight or typographic) and parentheses,
/// and trims surrounding whitespace. Everything else must then match exactly.
#[must_use]
pub fn normalize_key(value: &str) -> String {
    value
        .to_uppercase()
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}' | '(' | ')'))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_before_simple() {
        assert_eq!(token_before("BANKERS LAKE, HILLSDALE CO.", "LAKE"), Some("BANKERS"));
    }

    #[test]
    fn test_token_before_requires_whole_anchor_word() {
        assert_eq!(token_before("SILVER LAKESIDE PARK", "LAKE"), None);
        assert_eq!(token_before("SILVER BLAKE", "LAKE"), None);
    }

    #[test]
    fn test_token_before_rejects_punctuation_gap() {
        assert_eq!(token_before("HILLSDALE CO., LAKE ST CLAIR", "LAKE"), None);
    }

    #[test]
    fn test_token_before_any_leftmost_wins() {
        let text = "MUD POND NEAR CLEAR LAKE";
        assert_eq!(token_before_any(text, &["LAKE", "POND"]), Some("MUD"));
    }

    #[test]
    fn test_token_after() {
        assert_eq!(token_after("LAKE ST. CLAIR", "LAKE"), Some("ST"));
        assert_eq!(token_after("NEAR LAKE", "LAKE"), None);
    }

    #[test]
    fn test_token_after_any() {
        assert_eq!(token_after_any("POND OF THE WOODS", &["LAKE", "POND"]), Some("OF"));
    }

    #[test]
    fn test_digits_in() {
        assert_eq!(digits_in("H31"), Some("31"));
        assert_eq!(digits_in("AB1931X2"), Some("1931"));
        assert_eq!(digits_in("HX"), None);
        assert_eq!(digits_in(""), None);
    }

    #[test]
    fn test_expand_abbreviation() {
        assert_eq!(
            expand_abbreviation("DEVIL L., HILLSDALE CO.", "L.", "LAKE"),
            "DEVIL LAKE, HILLSDALE CO."
        );
        assert_eq!(expand_abbreviation("HILL.", "L.", "LAKE"), "HILL.");
        assert_eq!(expand_abbreviation("L. ORION", "L.", "LAKE"), "LAKE ORION");
        assert_eq!(expand_abbreviation("ÉTANG L.", "L.", "LAKE"), "ÉTANG LAKE");
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key(" Hillsdale "), "HILLSDALE");
        assert_eq!(normalize_key("O'Neal"), "ONEAL");
        assert_eq!(normalize_key("Devil\u{2019}s"), "DEVILS");
        assert_eq!(normalize_key("Grand Traverse (East)"), "GRAND TRAVERSE EAST");
    }
}
