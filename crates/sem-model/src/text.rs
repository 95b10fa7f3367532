//! Term and text utilities
//!
//! Abbreviation, lower-camel conversion, camel-case splitting, and text
//! normalization used when deriving identifiers, element names, and
//! abbreviation paths.

use regex::Regex;
use std::sync::LazyLock;

const VOWELS: &str = "aeiouAEIOU";

static SYMBOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r##"[!"#$%&'()=~|\\^\-@`\[\]{}:;+*/?,.<>_]"##).unwrap());
static WORDS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());
static GROUP_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\((choice|sequence)\)").unwrap());
static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "to", "with", "on", "of", "in", "for", "at", "by", "from", "as", "about",
    "into", "over", "after", "under", "above", "below",
];

fn is_vowel(c: char) -> bool {
    VOWELS.contains(c)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

fn abbreviate_word(word: &str, max_len: usize) -> String {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() <= 3 {
        return word.to_string();
    }

    // Keep the first character, all consonants, and only the first vowel.
    let mut abbr: Vec<char> = vec![chars[0]];
    let mut first_vowel_found = is_vowel(chars[0]);
    for &c in &chars[1..] {
        if !is_vowel(c) {
            abbr.push(c);
        } else if !first_vowel_found {
            abbr.push(c);
            first_vowel_found = true;
        }
    }

    if abbr.len() >= max_len {
        // Drop every vowel except the first one remaining.
        if let Some(first_vowel_index) = abbr.iter().position(|&c| is_vowel(c)) {
            abbr = abbr
                .iter()
                .enumerate()
                .filter(|&(i, &c)| !is_vowel(c) || i == first_vowel_index)
                .map(|(_, &c)| c)
                .collect();
        }
        // A leading vowel resists shortening; keep the start and the end.
        if !abbr.is_empty() && is_vowel(abbr[0]) && abbr.len() > max_len {
            let last = *abbr.last().unwrap();
            abbr.truncate(max_len - 1);
            abbr.push(last);
        }
    }

    if abbr.len() > max_len {
        abbr.truncate(max_len);
    }

    if abbr.len() < chars.len() {
        abbr.into_iter().collect()
    } else {
        word.to_string()
    }
}

/// Abbreviate each word of `term`: stop words and symbols removed,
/// words capitalised, vowels stripped after the first, result
/// guaranteed shorter than the original word (or left unchanged).
///
/// Words of three characters or fewer pass through untouched.
/// `max_len` below 4 leaves no room for a meaningful abbreviation and
/// is clamped up.
pub fn abbreviate_term(term: &str, max_len: usize) -> String {
    let max_len = max_len.max(4);
    let stripped = SYMBOLS.replace_all(term, "");

    let filtered: Vec<String> = WORDS
        .find_iter(&stripped)
        .map(|m| m.as_str())
        .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .map(|w| {
            // Short words pass through with their casing intact.
            if w.chars().count() <= 3 {
                w.to_string()
            } else {
                capitalize(w)
            }
        })
        .collect();

    filtered
        .iter()
        .map(|w| abbreviate_word(w, max_len))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-camel-case a space-separated term
/// (`"Entity Phone Number"` becomes `"entityPhoneNumber"`).
pub fn lc3(term: &str) -> String {
    let mut parts = SPACES.split(term.trim());
    let first = match parts.next() {
        Some(p) => p.to_lowercase(),
        None => return String::new(),
    };
    let rest: String = parts.map(capitalize).collect();
    format!("{}{}", first, rest)
}

/// Split a camelCase or CamelCase identifier into words, capital
/// letters marking boundaries and trailing digits staying attached.
/// An identifier with no letter runs comes back whole.
pub fn split_camel_case(identifier: &str) -> Vec<String> {
    let chars: Vec<char> = identifier.chars().collect();
    let mut words = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_lowercase()
            || (c.is_ascii_uppercase() && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase()))
        {
            // [A-Z]?[a-z]+[0-9]*
            let start = i;
            if chars[i].is_ascii_uppercase() {
                i += 1;
            }
            while i < chars.len() && chars[i].is_ascii_lowercase() {
                i += 1;
            }
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            words.push(chars[start..i].iter().collect());
        } else if c.is_ascii_uppercase() {
            // [A-Z]+[0-9]* stopping before an uppercase that starts a new word
            let start = i;
            while i < chars.len()
                && chars[i].is_ascii_uppercase()
                && !(i > start && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase()))
            {
                i += 1;
            }
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            words.push(chars[start..i].iter().collect());
        } else {
            i += 1;
        }
    }
    if words.is_empty() {
        words.push(identifier.to_string());
    }
    words
}

/// Strip group markers and punctuation, leaving single-spaced
/// alphanumeric words.
pub fn normalize_text(text: &str) -> String {
    let text = GROUP_MARKERS.replace_all(text, "");
    let text = NON_ALNUM.replace_all(&text, " ");
    SPACES.replace_all(text.trim(), " ").to_string()
}

/// Replace non-breaking and typographic space characters with plain
/// spaces.
pub fn normalize_ws(text: &str) -> String {
    text.replace(['\u{00A0}', '\u{2007}', '\u{202F}'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviate_short_words_unchanged() {
        assert_eq!(abbreviate_term("Tax", 6), "Tax");
        assert_eq!(abbreviate_term("ID", 6), "ID");
        assert_eq!(abbreviate_term("VAT Amount", 6), "VAT Amnt");
    }

    #[test]
    fn test_abbreviate_drops_stop_words() {
        assert_eq!(abbreviate_term("Date of Issue", 6), "Dat Iss");
        assert!(!abbreviate_term("Amount in the Ledger", 6).contains("the"));
    }

    #[test]
    fn test_abbreviate_keeps_first_vowel() {
        // "Account": A kept (first char), following consonants kept,
        // later vowels dropped.
        assert_eq!(abbreviate_term("Account", 6), "Accnt");
        assert_eq!(abbreviate_term("Entity", 6), "Entty");
    }

    #[test]
    fn test_abbreviate_result_shorter_than_original() {
        for term in ["Organization", "Identification", "Measurement"] {
            let abbr = abbreviate_term(term, 6);
            assert!(abbr.len() < term.len(), "{} -> {}", term, abbr);
        }
    }

    #[test]
    fn test_abbreviate_max_len_four() {
        let abbr = abbreviate_term("Accounting", 4);
        assert!(abbr.len() <= 4, "{}", abbr);
    }

    #[test]
    fn test_lc3() {
        assert_eq!(lc3("Entity Phone Number"), "entityPhoneNumber");
        assert_eq!(lc3("Invoice"), "invoice");
        assert_eq!(lc3("  Tax  Total  "), "taxTotal");
        assert_eq!(lc3(""), "");
    }

    #[test]
    fn test_split_camel_case() {
        assert_eq!(split_camel_case("camelCase"), vec!["camel", "Case"]);
        assert_eq!(split_camel_case("CamelCase"), vec!["Camel", "Case"]);
        assert_eq!(split_camel_case("ABCDef"), vec!["ABC", "Def"]);
        assert_eq!(split_camel_case("ledger2Entry"), vec!["ledger2", "Entry"]);
        assert_eq!(split_camel_case("HTML"), vec!["HTML"]);
        assert_eq!(split_camel_case("123"), vec!["123"]);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("Header (choice)"), "Header");
        assert_eq!(normalize_text("Tax  (SEQUENCE)"), "Tax");
        assert_eq!(normalize_text("Entity: Phone/Number"), "Entity Phone Number");
        assert_eq!(normalize_text("  spaced   out  "), "spaced out");
    }

    #[test]
    fn test_normalize_ws() {
        assert_eq!(normalize_ws("a\u{00A0}b\u{202F}c"), "a b c");
        assert_eq!(normalize_ws("plain"), "plain");
    }
}
