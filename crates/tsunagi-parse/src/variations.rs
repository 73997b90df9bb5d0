//! Word-variation expansion for fuzzy title matching.
//!
//! Catalogs spell the same concept many ways: "2nd Season", "Season 2",
//! "S2", "II". A [`VariationTable`] maps a word or phrase to its full
//! equivalence set so the scorer can treat any two members as a match.
//! Group data is compiled in via `phf`; lookups are memoized per table.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

/// Cap on memoized lookups before the memo resets.
const MEMO_CAPACITY: usize = 4096;

/// Which static synonym tables a catalog uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    English,
    French,
}

type Group = &'static [&'static str];

// ── Lexical equivalents (single words) ─────────────────────────────────

const SEASON_WORDS: Group = &["season", "s", "sz", "series"];
const PART_WORDS: Group = &["part", "pt", "p", "cour"];
const SPECIAL_WORDS: Group = &["special", "specials", "sp"];
const OVA_WORDS: Group = &["ova", "oad", "oav"];
const MOVIE_WORDS: Group = &["movie", "film"];

const FIRST_WORDS: Group = &["1", "1st", "first", "i"];
const SECOND_WORDS: Group = &["2", "2nd", "second", "ii"];
const THIRD_WORDS: Group = &["3", "3rd", "third", "iii"];
const FOURTH_WORDS: Group = &["4", "4th", "fourth", "iv"];
const FIFTH_WORDS: Group = &["5", "5th", "fifth", "v"];
const SIXTH_WORDS: Group = &["6", "6th", "sixth", "vi"];
const SEVENTH_WORDS: Group = &["7", "7th", "seventh", "vii"];
const EIGHTH_WORDS: Group = &["8", "8th", "eighth", "viii"];
const NINTH_WORDS: Group = &["9", "9th", "ninth", "ix"];
const TENTH_WORDS: Group = &["10", "10th", "tenth", "x"];

static LEXICAL_EN: phf::Map<&'static str, Group> = phf_map! {
    "season" => SEASON_WORDS, "s" => SEASON_WORDS, "sz" => SEASON_WORDS,
    "series" => SEASON_WORDS,
    "part" => PART_WORDS, "pt" => PART_WORDS, "p" => PART_WORDS,
    "cour" => PART_WORDS,
    "special" => SPECIAL_WORDS, "specials" => SPECIAL_WORDS, "sp" => SPECIAL_WORDS,
    "ova" => OVA_WORDS, "oad" => OVA_WORDS, "oav" => OVA_WORDS,
    "movie" => MOVIE_WORDS, "film" => MOVIE_WORDS,
    "1" => FIRST_WORDS, "1st" => FIRST_WORDS, "first" => FIRST_WORDS, "i" => FIRST_WORDS,
    "2" => SECOND_WORDS, "2nd" => SECOND_WORDS, "second" => SECOND_WORDS, "ii" => SECOND_WORDS,
    "3" => THIRD_WORDS, "3rd" => THIRD_WORDS, "third" => THIRD_WORDS, "iii" => THIRD_WORDS,
    "4" => FOURTH_WORDS, "4th" => FOURTH_WORDS, "fourth" => FOURTH_WORDS, "iv" => FOURTH_WORDS,
    "5" => FIFTH_WORDS, "5th" => FIFTH_WORDS, "fifth" => FIFTH_WORDS, "v" => FIFTH_WORDS,
    "6" => SIXTH_WORDS, "6th" => SIXTH_WORDS, "sixth" => SIXTH_WORDS, "vi" => SIXTH_WORDS,
    "7" => SEVENTH_WORDS, "7th" => SEVENTH_WORDS, "seventh" => SEVENTH_WORDS, "vii" => SEVENTH_WORDS,
    "8" => EIGHTH_WORDS, "8th" => EIGHTH_WORDS, "eighth" => EIGHTH_WORDS, "viii" => EIGHTH_WORDS,
    "9" => NINTH_WORDS, "9th" => NINTH_WORDS, "ninth" => NINTH_WORDS, "ix" => NINTH_WORDS,
    "10" => TENTH_WORDS, "10th" => TENTH_WORDS, "tenth" => TENTH_WORDS, "x" => TENTH_WORDS,
};

const SAISON_WORDS: Group = &["saison", "season", "s"];
const PARTIE_WORDS: Group = &["partie", "part", "p", "pt"];
const PREMIERE_WORDS: Group = &["1", "1re", "1ere", "première", "premiere", "premier", "i"];
const DEUXIEME_WORDS: Group = &["2", "2e", "2eme", "2ème", "deuxième", "deuxieme", "seconde", "ii"];
const TROISIEME_WORDS: Group = &["3", "3e", "3eme", "3ème", "troisième", "troisieme", "iii"];
const QUATRIEME_WORDS: Group = &["4", "4e", "4eme", "4ème", "quatrième", "quatrieme", "iv"];
const CINQUIEME_WORDS: Group = &["5", "5e", "5eme", "5ème", "cinquième", "cinquieme", "v"];
const FILM_WORDS: Group = &["film", "movie"];

static LEXICAL_FR: phf::Map<&'static str, Group> = phf_map! {
    "saison" => SAISON_WORDS, "season" => SAISON_WORDS, "s" => SAISON_WORDS,
    "partie" => PARTIE_WORDS, "part" => PARTIE_WORDS, "p" => PARTIE_WORDS,
    "pt" => PARTIE_WORDS,
    "1" => PREMIERE_WORDS, "1re" => PREMIERE_WORDS, "1ere" => PREMIERE_WORDS,
    "première" => PREMIERE_WORDS, "premiere" => PREMIERE_WORDS,
    "premier" => PREMIERE_WORDS, "i" => PREMIERE_WORDS,
    "2" => DEUXIEME_WORDS, "2e" => DEUXIEME_WORDS, "2eme" => DEUXIEME_WORDS,
    "2ème" => DEUXIEME_WORDS, "deuxième" => DEUXIEME_WORDS,
    "deuxieme" => DEUXIEME_WORDS, "seconde" => DEUXIEME_WORDS, "ii" => DEUXIEME_WORDS,
    "3" => TROISIEME_WORDS, "3e" => TROISIEME_WORDS, "3eme" => TROISIEME_WORDS,
    "3ème" => TROISIEME_WORDS, "troisième" => TROISIEME_WORDS,
    "troisieme" => TROISIEME_WORDS, "iii" => TROISIEME_WORDS,
    "4" => QUATRIEME_WORDS, "4e" => QUATRIEME_WORDS, "4eme" => QUATRIEME_WORDS,
    "4ème" => QUATRIEME_WORDS, "quatrième" => QUATRIEME_WORDS,
    "quatrieme" => QUATRIEME_WORDS, "iv" => QUATRIEME_WORDS,
    "5" => CINQUIEME_WORDS, "5e" => CINQUIEME_WORDS, "5eme" => CINQUIEME_WORDS,
    "5ème" => CINQUIEME_WORDS, "cinquième" => CINQUIEME_WORDS,
    "cinquieme" => CINQUIEME_WORDS, "v" => CINQUIEME_WORDS,
    "film" => FILM_WORDS, "movie" => FILM_WORDS,
};

// ── Sequel phrases (multi-word) ────────────────────────────────────────

const SECOND_SEASON: Group = &["2nd season", "second season", "season 2", "s2", "ii", "2"];
const THIRD_SEASON: Group = &["3rd season", "third season", "season 3", "s3", "iii", "3"];
const FOURTH_SEASON: Group = &["4th season", "fourth season", "season 4", "s4", "iv", "4"];
const FIFTH_SEASON: Group = &["5th season", "fifth season", "season 5", "s5", "v", "5"];
const FINAL_SEASON: Group = &["final season", "last season", "finale", "final"];

static SEQUEL_EN: phf::Map<&'static str, Group> = phf_map! {
    "2nd season" => SECOND_SEASON, "second season" => SECOND_SEASON,
    "season 2" => SECOND_SEASON, "s2" => SECOND_SEASON,
    "3rd season" => THIRD_SEASON, "third season" => THIRD_SEASON,
    "season 3" => THIRD_SEASON, "s3" => THIRD_SEASON,
    "4th season" => FOURTH_SEASON, "fourth season" => FOURTH_SEASON,
    "season 4" => FOURTH_SEASON, "s4" => FOURTH_SEASON,
    "5th season" => FIFTH_SEASON, "fifth season" => FIFTH_SEASON,
    "season 5" => FIFTH_SEASON, "s5" => FIFTH_SEASON,
    "final season" => FINAL_SEASON, "last season" => FINAL_SEASON,
    "finale" => FINAL_SEASON,
};

const SAISON_2: Group = &["saison 2", "2e saison", "2ème saison", "season 2", "s2", "2"];
const SAISON_3: Group = &["saison 3", "3e saison", "3ème saison", "season 3", "s3", "3"];
const SAISON_4: Group = &["saison 4", "4e saison", "4ème saison", "season 4", "s4", "4"];
const SAISON_FINALE: Group = &["saison finale", "dernière saison", "derniere saison", "final season", "finale"];

static SEQUEL_FR: phf::Map<&'static str, Group> = phf_map! {
    "saison 2" => SAISON_2, "2e saison" => SAISON_2, "2ème saison" => SAISON_2,
    "season 2" => SAISON_2, "s2" => SAISON_2,
    "saison 3" => SAISON_3, "3e saison" => SAISON_3, "3ème saison" => SAISON_3,
    "season 3" => SAISON_3, "s3" => SAISON_3,
    "saison 4" => SAISON_4, "4e saison" => SAISON_4, "4ème saison" => SAISON_4,
    "season 4" => SAISON_4, "s4" => SAISON_4,
    "saison finale" => SAISON_FINALE, "dernière saison" => SAISON_FINALE,
    "derniere saison" => SAISON_FINALE, "final season" => SAISON_FINALE,
    "finale" => SAISON_FINALE,
};

/// Ordinal words mapped to their numeric value, both locales.
/// Shared with season extraction ("Second Season", "2ème saison").
pub static ORDINAL_WORDS: phf::Map<&'static str, u32> = phf_map! {
    "first" => 1, "second" => 2, "third" => 3, "fourth" => 4, "fifth" => 5,
    "sixth" => 6, "seventh" => 7, "eighth" => 8, "ninth" => 9, "tenth" => 10,
    "première" => 1, "premiere" => 1, "deuxième" => 2, "deuxieme" => 2,
    "seconde" => 2, "troisième" => 3, "troisieme" => 3, "quatrième" => 4,
    "quatrieme" => 4, "cinquième" => 5, "cinquieme" => 5,
};

/// Locale-scoped variation lookup with a bounded memo.
///
/// Safe to share across concurrent resolutions: the memo is interior
/// state behind a `Mutex`, and recomputing an entry is idempotent.
#[derive(Debug)]
pub struct VariationTable {
    locale: Locale,
    memo: Mutex<HashMap<String, BTreeSet<String>>>,
}

impl VariationTable {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            memo: Mutex::new(HashMap::new()),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// The full equivalence set for a word or phrase: the input itself,
    /// its normalized form, a digits-stripped form, and every member of
    /// any synonym group the normalized form belongs to.
    pub fn variations_of(&self, word: &str) -> BTreeSet<String> {
        if let Some(hit) = self.lock_memo().get(word) {
            return hit.clone();
        }

        let set = self.compute(word);

        let mut memo = self.lock_memo();
        if memo.len() >= MEMO_CAPACITY {
            memo.clear();
        }
        memo.insert(word.to_string(), set.clone());
        set
    }

    /// True when two words share at least one variation.
    pub fn share_group(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        let va = self.variations_of(a);
        let vb = self.variations_of(b);
        va.intersection(&vb).next().is_some()
    }

    fn lock_memo(&self) -> std::sync::MutexGuard<'_, HashMap<String, BTreeSet<String>>> {
        // Memo entries are recomputable; a poisoned lock is recoverable.
        self.memo.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn compute(&self, word: &str) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        set.insert(word.to_string());

        let normalized = normalize(word, false);
        if !normalized.is_empty() {
            set.insert(normalized.clone());
        }

        let stripped: String = normalized.chars().filter(|c| !c.is_ascii_digit()).collect();
        let stripped = stripped.trim();
        if !stripped.is_empty() && stripped != normalized {
            set.insert(stripped.to_string());
        }

        let (lexical, sequel): (&phf::Map<_, _>, &phf::Map<_, _>) = match self.locale {
            Locale::English => (&LEXICAL_EN, &SEQUEL_EN),
            Locale::French => (&LEXICAL_FR, &SEQUEL_FR),
        };
        if let Some(group) = lexical.get(normalized.as_str()) {
            set.extend(group.iter().map(|s| s.to_string()));
        }
        if let Some(group) = sequel.get(normalized.as_str()) {
            set.extend(group.iter().map(|s| s.to_string()));
        }

        set
    }
}
