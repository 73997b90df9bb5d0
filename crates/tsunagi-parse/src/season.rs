//! Season and part extraction from catalog titles.
//!
//! An ordered pattern list per field; the first pattern to match wins,
//! independently for season and part. Also provides the bare sequel-cue
//! scan and the marker-stripping used for base-title retries.

use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::normalize;
use crate::variations::ORDINAL_WORDS;

/// Season/part numbers extracted from a single title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TitleMarkers {
    pub season: Option<u32>,
    pub part: Option<u32>,
}

// ── Season patterns, tried in order ────────────────────────────────────

/// "Season 2", "saison 3", "Series 2", glued "season2".
static RE_SEASON_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:season|saison|series)\s*(\d{1,2})\b").unwrap());

/// "2nd Season", "2e saison", "2ème saison".
static RE_NTH_SEASON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th|re|e|ème|eme)\s+(?:season|saison)\b").unwrap()
});

/// "Second Season", "deuxième saison" — ordinal word before the keyword.
static RE_ORDINAL_SEASON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\p{L}+)\s+(?:season|saison)\b").unwrap());

/// "Season II", "Saison IV".
static RE_SEASON_ROMAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:season|saison|series)\s+([ivx]{1,4})\b").unwrap());

/// Standalone "S2", "s01".
static RE_S_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bs(\d{1,2})\b").unwrap());

/// Japanese "第2期", "2期".
static RE_JP_SEASON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"第?(\d{1,2})期").unwrap());

// ── Part patterns ──────────────────────────────────────────────────────

/// "Part 2", "Partie 2", "Cour 2", "Pt. 2".
static RE_PART_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:part|partie|cour|pt)\.?\s*(\d{1,2})\b").unwrap());

/// "2nd Part", "2e partie".
static RE_NTH_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th|re|e|ème|eme)\s+(?:part|partie|cour)\b").unwrap()
});

// ── Marker stripping for base-title retries ────────────────────────────

static RE_PAREN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

static RE_SEASON_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)\b
          (?: (?: \d{1,2}(?:st|nd|rd|th|re|e|ème|eme)
                | first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth
                | premi(?:e|è)re? | deuxi(?:e|è)me | seconde | troisi(?:e|è)me
                | quatri(?:e|è)me | cinqui(?:e|è)me
                | final|last|derni(?:e|è)re
              ) \s+ )?
          (?:season|saison|series)\b \s* (?:\d{1,2}\b|[ivx]{1,4}\b)?",
    )
    .unwrap()
});

static RE_PART_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:part|partie|cour|pt)\.?\s*\d{1,2}\b|\b\d{1,2}(?:st|nd|rd|th|re|e|ème|eme)\s+(?:part|partie|cour)\b",
    )
    .unwrap()
});

static RE_TRAILING_CUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[\s:-]+(?:[ivx]{2,4}|s?\d{1,2}|第?\d{1,2}期)\s*$").unwrap());

/// Extract season and part numbers from a title.
///
/// The first matching pattern wins per field; a title with no markers
/// yields `TitleMarkers::default()`.
pub fn extract(title: &str) -> TitleMarkers {
    TitleMarkers {
        season: extract_season(title),
        part: extract_part(title),
    }
}

fn extract_season(title: &str) -> Option<u32> {
    if let Some(caps) = RE_SEASON_DIGIT.captures(title) {
        return caps[1].parse().ok();
    }
    if let Some(caps) = RE_NTH_SEASON.captures(title) {
        return caps[1].parse().ok();
    }
    if let Some(caps) = RE_ORDINAL_SEASON.captures(title) {
        let word = caps[1].to_lowercase();
        if let Some(&n) = ORDINAL_WORDS.get(word.as_str()) {
            return Some(n);
        }
    }
    if let Some(caps) = RE_SEASON_ROMAN.captures(title) {
        if let Some(n) = roman_to_u32(&caps[1]) {
            return Some(n);
        }
    }
    if let Some(caps) = RE_S_DIGIT.captures(title) {
        return caps[1].parse().ok();
    }
    if let Some(caps) = RE_JP_SEASON.captures(title) {
        return caps[1].parse().ok();
    }
    None
}

fn extract_part(title: &str) -> Option<u32> {
    if let Some(caps) = RE_PART_DIGIT.captures(title) {
        return caps[1].parse().ok();
    }
    if let Some(caps) = RE_NTH_PART.captures(title) {
        return caps[1].parse().ok();
    }
    None
}

/// Scan for a bare sequel cue: a standalone Roman numeral or small digit
/// token ("Overlord II", "Mob Psycho 100 II"). The last cue in the title
/// wins. "x" and "i"/"1" are excluded as too ambiguous ("Hunter x
/// Hunter").
pub fn sequel_cue(title: &str) -> Option<u32> {
    let normalized = normalize(title, true);
    let mut cue = None;
    for word in normalized.split_whitespace() {
        if let Ok(n) = word.parse::<u32>() {
            if (2..=9).contains(&n) {
                cue = Some(n);
            }
            continue;
        }
        if word.chars().all(|c| matches!(c, 'i' | 'v' | 'x')) && word != "i" && word != "x" {
            if let Some(n) = roman_to_u32(word) {
                if (2..=9).contains(&n) {
                    cue = Some(n);
                }
            }
        }
    }
    cue
}

/// Strip season/part markers and parentheticals, yielding the base title
/// used for the last-resort retry query.
pub fn strip_markers(title: &str) -> String {
    let s = RE_PAREN.replace_all(title, " ");
    let s = RE_PART_PHRASE.replace_all(&s, " ");
    let s = RE_SEASON_PHRASE.replace_all(&s, " ");
    let s = RE_TRAILING_CUE.replace_all(&s, " ");
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '-' || c == ':' || c.is_whitespace())
        .to_string()
}

/// Roman numeral to number, I–XX range, strict left-to-right fold.
pub fn roman_to_u32(s: &str) -> Option<u32> {
    let s = s.to_uppercase();
    let mut total: i32 = 0;
    let mut prev = 0i32;

    for c in s.chars().rev() {
        let value = match c {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            _ => return None,
        };
        if value < prev {
            total -= value;
        } else {
            total += value;
        }
        prev = value;
    }

    (total > 0).then_some(total as u32)
}
