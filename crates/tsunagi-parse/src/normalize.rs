//! Title normalization for cross-catalog comparison.
//!
//! Every comparison in the scorer happens on normalized text, so two
//! catalogs that write the same title differently ("Hunter × Hunter",
//! "Hunter x Hunter (2011)") collapse to one canonical form.

use unicode_normalization::UnicodeNormalization;

/// Canonicalize a free-text title.
///
/// Steps, in order: NFKC fold + lowercase, character transliteration
/// (`&` → "and", `×` → "x", typographic quotes and dashes), punctuation
/// erasure, whitespace collapse. With `remove_year`, standalone 4-digit
/// years in 1900–2099 are additionally dropped.
///
/// The function is pure and idempotent: `normalize(normalize(x), r)`
/// equals `normalize(x, r)` for any input.
pub fn normalize(text: &str, remove_year: bool) -> String {
    let s = unicode_fold(text);
    let s = transliterate(&s);
    let s = erase_punctuation(&s);
    if remove_year {
        collapse_whitespace(&strip_years(&s))
    } else {
        collapse_whitespace(&s)
    }
}

/// NFKC normalization (fullwidth → ASCII, ½ → 1⁄2) and lowercasing.
fn unicode_fold(s: &str) -> String {
    s.nfkc().collect::<String>().to_lowercase()
}

/// Replace common character substitutions seen in catalog titles.
fn transliterate(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str(" and "),
            '\u{00D7}' | '\u{2715}' | '\u{2716}' => result.push('x'), // ×, ✕, ✖
            '\u{2019}' | '\u{2018}' | '\u{02BC}' => result.push('\''), // curly quotes
            '\u{201C}' | '\u{201D}' => result.push('"'),
            '\u{2013}' | '\u{2014}' => result.push('-'), // en/em dash
            '\u{00E6}' => result.push_str("ae"),
            '\u{0153}' => result.push_str("oe"),
            '\u{00DF}' => result.push_str("ss"),
            c => result.push(c),
        }
    }
    result
}

/// Strip everything that is not alphanumeric or whitespace.
///
/// Possessive apostrophes fall out here ("director's" → "directors"),
/// as do colons, brackets and decorative dashes.
fn erase_punctuation(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

/// Drop standalone 4-digit year tokens in the 1900–2099 range.
fn strip_years(s: &str) -> String {
    s.split_whitespace()
        .filter(|word| !is_year_token(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// True for a bare "1900".."2099" token.
pub(crate) fn is_year_token(word: &str) -> bool {
    word.len() == 4
        && word.chars().all(|c| c.is_ascii_digit())
        && (word.starts_with("19") || word.starts_with("20"))
}

/// Trim and collapse whitespace runs to a single space.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_folds_fullwidth() {
        assert_eq!(normalize("ＢＬＥＡＣＨ", false), "bleach");
        assert_eq!(normalize("Attack On TITAN", false), "attack on titan");
    }

    #[test]
    fn ampersand_expands_to_and() {
        assert_eq!(normalize("Romeo & Juliet", false), "romeo and juliet");
        assert_eq!(normalize("K&R", false), "k and r");
    }

    #[test]
    fn multiplication_sign_folds_to_x() {
        assert_eq!(normalize("Hunter × Hunter", false), "hunter x hunter");
    }

    #[test]
    fn possessive_apostrophe_stripped() {
        assert_eq!(normalize("JoJo\u{2019}s Bizarre Adventure", false), "jojos bizarre adventure");
        assert_eq!(normalize("Frieren: Beyond Journey's End", false), "frieren beyond journeys end");
    }

    #[test]
    fn punctuation_erased() {
        assert_eq!(
            normalize("Re:ZERO -Starting Life in Another World-", false),
            "rezero starting life in another world"
        );
    }

    #[test]
    fn half_fraction_folds() {
        // NFKC expands ½ into digit-slash-digit; the slash erases.
        assert_eq!(normalize("Ranma ½", false), "ranma 12");
    }

    #[test]
    fn year_removed_when_requested() {
        assert_eq!(normalize("Hunter x Hunter (2011)", true), "hunter x hunter");
        assert_eq!(normalize("Dororo 2019", true), "dororo");
    }

    #[test]
    fn year_kept_by_default() {
        assert_eq!(normalize("Hunter x Hunter (2011)", false), "hunter x hunter 2011");
    }

    #[test]
    fn non_year_numbers_survive_year_removal() {
        assert_eq!(normalize("Mob Psycho 100", true), "mob psycho 100");
        // 1889 and 2101 fall outside the stripped range.
        assert_eq!(normalize("Golden Kamuy 1889", true), "golden kamuy 1889");
    }

    #[test]
    fn idempotent() {
        for title in [
            "Re:ZERO -Starting Life in Another World- 2nd Season",
            "Hunter × Hunter (2011)",
            "JoJo's Bizarre Adventure: Stone Ocean",
            "Romeo & Juliet",
        ] {
            for remove_year in [false, true] {
                let once = normalize(title, remove_year);
                assert_eq!(normalize(&once, remove_year), once, "not idempotent for {title:?}");
            }
        }
    }

    #[test]
    fn case_insensitive_equality() {
        assert_eq!(
            normalize("ATTACK on Titan", false),
            normalize("attack on titan", false)
        );
    }

    #[test]
    fn empty_and_symbol_only() {
        assert_eq!(normalize("", false), "");
        assert_eq!(normalize("---", false), "");
    }
}
