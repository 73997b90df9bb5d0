//! Candidate scoring: one source title against one catalog record.
//!
//! A base similarity pass (exact → near-exact → secondary-title →
//! word-level blend) produces a confidence in [0,1]; contextual signals
//! (format, episodes, years, season numbers, duration) then push the
//! raw value up or down. The raw value is deliberately unclamped here —
//! override rules in the selector compare magnitudes — and only the
//! final [`crate::models::MatchResult`] clamps.

use tsunagi_parse::{normalize, season, year, VariationTable};

use crate::models::{CandidateRecord, Format, SourceIdentity};
use crate::profile::CatalogProfile;

pub struct Scorer<'a> {
    profile: &'a CatalogProfile,
    variations: &'a VariationTable,
}

impl<'a> Scorer<'a> {
    pub fn new(profile: &'a CatalogProfile, variations: &'a VariationTable) -> Self {
        Self {
            profile,
            variations,
        }
    }

    /// Full score for one candidate, or `None` when the candidate is
    /// rejected outright (a substring-only hit on a single-word query).
    pub fn score(
        &self,
        source: &SourceIdentity,
        source_title: &str,
        candidate: &CandidateRecord,
    ) -> Option<f64> {
        let mut score = self.base_score(
            source_title,
            &candidate.title,
            candidate.secondary_title.as_deref(),
        );

        let src_norm = normalize(source_title, true);
        let cand_norm = normalize(&candidate.title, true);
        let cand_words: Vec<&str> = cand_norm.split_whitespace().collect();

        if src_norm.split_whitespace().count() == 1 && cand_words.len() > 1 {
            if !cand_words.contains(&src_norm.as_str()) {
                return None;
            }
            // An exact word inside a longer title is weak evidence;
            // dilute by the extra words.
            score *= 1.0 / cand_words.len() as f64;
            if cand_words
                .iter()
                .any(|w| self.profile.compound_markers.iter().any(|m| m == w))
            {
                score *= self.profile.compound_factor;
            }
        }

        Some(score + self.context_adjust(source, source_title, candidate))
    }

    /// Title-only similarity in [0,1].
    pub fn base_score(
        &self,
        source_title: &str,
        candidate_title: &str,
        secondary: Option<&str>,
    ) -> f64 {
        let src = normalize(source_title, false);
        if src.is_empty() {
            return 0.0;
        }
        let cand = normalize(candidate_title, false);

        if src == cand {
            return 1.0;
        }
        let src_len = src.chars().count();
        if src_len > 5 && strsim::levenshtein(&src, &cand) <= 2 {
            return 0.95;
        }

        if let Some(secondary) = secondary {
            let sec = normalize(secondary, false);
            if src == sec {
                return 0.98;
            }
            if src_len > 5 && !sec.is_empty() && strsim::levenshtein(&src, &sec) <= 2 {
                return 0.92;
            }
        }

        let src_y = normalize(source_title, true);
        let cand_y = normalize(candidate_title, true);
        let word = self.word_score(&src_y, &cand_y);
        let string = strsim::sorensen_dice(&src_y, &cand_y);
        self.profile.word_weight * word + self.profile.string_weight * string
    }

    /// Word-level score: each source word against its best candidate
    /// word. Variation-set overlap counts full; substring containment
    /// counts fractionally by length ratio.
    fn word_score(&self, src: &str, cand: &str) -> f64 {
        let src_words: Vec<&str> = src.split_whitespace().collect();
        let cand_words: Vec<&str> = cand.split_whitespace().collect();
        if src_words.is_empty() || cand_words.is_empty() {
            return 0.0;
        }

        let mut matches = 0.0;
        let mut partial = 0.0;
        for sw in &src_words {
            let mut best = 0.0f64;
            for cw in &cand_words {
                let value = if self.variations.share_group(sw, cw) {
                    1.0
                } else if sw.contains(cw) || cw.contains(sw) {
                    let (a, b) = (sw.chars().count(), cw.chars().count());
                    a.min(b) as f64 / a.max(b) as f64
                } else {
                    0.0
                };
                if value > best {
                    best = value;
                }
                if best == 1.0 {
                    break;
                }
            }
            if best == 1.0 {
                matches += 1.0;
            } else {
                partial += best;
            }
        }
        (matches + 0.5 * partial) / src_words.len() as f64
    }

    fn context_adjust(
        &self,
        source: &SourceIdentity,
        source_title: &str,
        candidate: &CandidateRecord,
    ) -> f64 {
        let p = self.profile;
        let mut adj = 0.0;

        if let (Some(sf), Some(cf)) = (source.format, candidate.format) {
            if sf == cf {
                adj += p.format_bonus;
            }
        }

        if let (Some(se), Some(ce)) = (source.episodes, candidate.episodes) {
            if se == ce {
                adj += p.episode_exact_bonus;
            } else if se.abs_diff(ce) <= 2 {
                adj += p.episode_close_bonus;
            }
            if se > 24 && ce > 24 {
                adj += p.long_runner_bonus;
            }
        }

        let src_years = title_years(source.year, source_title);
        let cand_years = candidate_years(candidate);
        if !src_years.is_empty() && !cand_years.is_empty() {
            if src_years.iter().any(|y| cand_years.contains(y)) {
                adj += p.year_bonus;
            } else {
                adj -= p.year_penalty;
            }
        }

        let src_season = season::extract(source_title).season;
        let cand_season = season::extract(&candidate.title).season;
        if let (Some(a), Some(b)) = (src_season, cand_season) {
            if a == b {
                adj += p.season_bonus;
            } else {
                adj -= p.season_penalty;
            }
        }

        if source.format == Some(Format::Movie) {
            if let (Some(sd), Some(cd)) = (source.duration_min, candidate.duration_min) {
                let diff = sd.abs_diff(cd);
                if diff <= 10 {
                    adj += p.duration_bonus;
                } else if diff > 30 {
                    adj -= p.duration_penalty;
                }
            }
        }

        let multi_episode_tv = |format: Option<Format>, episodes: Option<u32>| {
            format == Some(Format::Tv) && episodes.map_or(true, |e| e > 1)
        };
        if (source.format == Some(Format::Movie)
            && multi_episode_tv(candidate.format, candidate.episodes))
            || (candidate.format == Some(Format::Movie)
                && multi_episode_tv(source.format, source.episodes))
        {
            adj -= p.movie_tv_penalty;
        }

        adj
    }
}

/// Years attached to one side of a comparison: the structured year plus
/// anything embedded in the title text.
pub(crate) fn title_years(year: Option<i32>, title: &str) -> Vec<i32> {
    let mut years = year::extract_years(title);
    if let Some(y) = year {
        if !years.contains(&y) {
            years.push(y);
        }
    }
    years
}

pub(crate) fn candidate_years(record: &CandidateRecord) -> Vec<i32> {
    let mut years = year::extract_years(&record.title);
    for y in &record.years {
        if !years.contains(y) {
            years.push(*y);
        }
    }
    years
}
