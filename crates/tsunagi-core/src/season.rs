//! Season/part selection against a catalog's season list.
//!
//! Selection is an explicit ordered rule chain with first-match-wins
//! semantics, so the priority order stays auditable and each rule is
//! testable in isolation. Split-cour detection is advisory metadata on
//! the chosen entry, not a separate lookup.

use chrono::{Datelike, NaiveDate};
use tracing::debug;
use tsunagi_parse::season::{self, TitleMarkers};

use crate::models::{SeasonCandidate, SeasonMatch, SeasonMethod, SourceIdentity};
use crate::profile::CatalogProfile;

/// Labels that mark a non-canonical season entry (films, OVA bundles,
/// alternate cuts) skipped by the filtered fallback.
const NON_CANONICAL_WORDS: &[&str] = &["movie", "film", "films", "ova", "oav", "special", "specials", "kai"];

/// Episode counts above this are "more than a handful"; the fallback
/// rule filters non-canonical entries for such sources.
const HANDFUL_EPISODES: u32 = 6;

type Rule = fn(&SeasonResolver<'_>, &SourceCues, &[SeasonCandidate]) -> Option<usize>;

/// Everything extracted from the source identity up front.
struct SourceCues {
    season: Option<u32>,
    part: Option<u32>,
    sequel_cue: Option<u32>,
    episodes: Option<u32>,
}

pub struct SeasonResolver<'a> {
    profile: &'a CatalogProfile,
}

impl<'a> SeasonResolver<'a> {
    pub fn new(profile: &'a CatalogProfile) -> Self {
        Self { profile }
    }

    pub fn resolve(&self, source: &SourceIdentity, candidates: &[SeasonCandidate]) -> SeasonMatch {
        if candidates.is_empty() {
            return SeasonMatch::none();
        }

        let cues = source_cues(source);
        let rules: [(SeasonMethod, fn(&SeasonResolver<'a>, &SourceCues, &[SeasonCandidate]) -> Option<usize>); 7] = [
            (SeasonMethod::ExactSeasonPart, Self::rule_exact_season_part),
            (SeasonMethod::Season, Self::rule_season_unqualified),
            (SeasonMethod::Part, Self::rule_part_only),
            (SeasonMethod::SequelCue, Self::rule_sequel_cue),
            (SeasonMethod::ExactEpisodes, Self::rule_exact_episodes),
            (SeasonMethod::ClosestEpisodes, Self::rule_closest_episodes),
            (SeasonMethod::Fallback, Self::rule_fallback),
        ];

        for (method, rule) in rules {
            if let Some(idx) = rule(self, &cues, candidates) {
                let chosen = &candidates[idx];
                let split_cour = split_cour(source, chosen, candidates);
                debug!(
                    slug = %chosen.slug,
                    method = ?method,
                    split_cour,
                    "season selected"
                );
                return SeasonMatch::selected(chosen.slug.clone(), method, split_cour);
            }
        }

        SeasonMatch::none()
    }

    fn rule_exact_season_part(
        &self,
        cues: &SourceCues,
        candidates: &[SeasonCandidate],
    ) -> Option<usize> {
        let (season, part) = (cues.season?, cues.part?);
        candidates.iter().position(|c| {
            let m = candidate_markers(c);
            m.season == Some(season) && m.part == Some(part)
        })
    }

    fn rule_season_unqualified(
        &self,
        cues: &SourceCues,
        candidates: &[SeasonCandidate],
    ) -> Option<usize> {
        let season = cues.season?;
        candidates.iter().position(|c| {
            let m = candidate_markers(c);
            m.season == Some(season) && m.part.is_none()
        })
    }

    fn rule_part_only(&self, cues: &SourceCues, candidates: &[SeasonCandidate]) -> Option<usize> {
        if cues.season.is_some() {
            return None;
        }
        let part = cues.part?;
        candidates
            .iter()
            .position(|c| candidate_markers(c).part == Some(part))
    }

    fn rule_sequel_cue(&self, cues: &SourceCues, candidates: &[SeasonCandidate]) -> Option<usize> {
        let cue = cues.sequel_cue?;
        candidates
            .iter()
            .position(|c| candidate_markers(c).season == Some(cue))
    }

    fn rule_exact_episodes(
        &self,
        cues: &SourceCues,
        candidates: &[SeasonCandidate],
    ) -> Option<usize> {
        let episodes = cues.episodes?;
        candidates.iter().position(|c| c.episodes == Some(episodes))
    }

    fn rule_closest_episodes(
        &self,
        cues: &SourceCues,
        candidates: &[SeasonCandidate],
    ) -> Option<usize> {
        let target = cues.episodes?;
        let mut best: Option<(usize, u32)> = None;
        for (idx, c) in candidates.iter().enumerate() {
            let Some(episodes) = c.episodes else { continue };
            let diff = episodes.abs_diff(target);
            if best.map_or(true, |(_, d)| diff < d) {
                best = Some((idx, diff));
            }
        }
        best.filter(|(_, diff)| *diff <= self.profile.episode_tolerance)
            .map(|(idx, _)| idx)
    }

    fn rule_fallback(&self, cues: &SourceCues, candidates: &[SeasonCandidate]) -> Option<usize> {
        if cues.episodes.map_or(false, |e| e > HANDFUL_EPISODES) {
            if let Some(idx) = candidates.iter().position(|c| !is_non_canonical(&c.label)) {
                return Some(idx);
            }
        }
        Some(0)
    }
}

fn source_cues(source: &SourceIdentity) -> SourceCues {
    let season = source
        .titles
        .iter()
        .find_map(|t| season::extract(t).season);
    let part = source.titles.iter().find_map(|t| season::extract(t).part);
    let sequel_cue = source.titles.iter().find_map(|t| season::sequel_cue(t));
    SourceCues {
        season,
        part,
        sequel_cue,
        episodes: source.episodes,
    }
}

/// Structured numbers when the catalog provides them, label extraction
/// otherwise.
fn candidate_markers(candidate: &SeasonCandidate) -> TitleMarkers {
    let extracted = season::extract(&candidate.label);
    TitleMarkers {
        season: candidate.season_number.or(extracted.season),
        part: candidate.part_number.or(extracted.part),
    }
}

fn is_non_canonical(label: &str) -> bool {
    tsunagi_parse::normalize(label, true)
        .split_whitespace()
        .any(|w| NON_CANONICAL_WORDS.contains(&w))
}

/// Flag the chosen entry as the second cour of a split-cour season:
/// start dates 3–6 whole months apart and the source holding 30–70% of
/// the base season's episodes.
fn split_cour(
    source: &SourceIdentity,
    chosen: &SeasonCandidate,
    candidates: &[SeasonCandidate],
) -> bool {
    let chosen_markers = candidate_markers(chosen);
    let base = candidates.iter().find(|c| {
        let m = candidate_markers(c);
        c.slug != chosen.slug
            && m.season == chosen_markers.season
            && matches!(m.part, None | Some(1))
            && c.air_date.is_some()
            && c.episodes.is_some()
    });
    let Some(base) = base else { return false };

    // Without a source date, the chosen entry's own air date stands in.
    let Some(compare_date) = source.start_date.or(chosen.air_date) else {
        return false;
    };
    let (Some(base_date), Some(base_episodes)) = (base.air_date, base.episodes) else {
        return false;
    };
    let Some(source_episodes) = source.episodes else {
        return false;
    };
    if base_episodes == 0 {
        return false;
    }

    let gap = month_gap(compare_date, base_date);
    let ratio = f64::from(source_episodes) / f64::from(base_episodes);
    (3..=6).contains(&gap) && (0.3..=0.7).contains(&ratio)
}

fn month_gap(a: NaiveDate, b: NaiveDate) -> i32 {
    let months_a = a.year() * 12 + a.month0() as i32;
    let months_b = b.year() * 12 + b.month0() as i32;
    (months_a - months_b).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn season_entry(slug: &str, label: &str, episodes: Option<u32>) -> SeasonCandidate {
        SeasonCandidate {
            label: label.into(),
            slug: slug.into(),
            episodes,
            ..SeasonCandidate::default()
        }
    }

    fn source(titles: &[&str], episodes: Option<u32>) -> SourceIdentity {
        SourceIdentity {
            titles: titles.iter().map(|t| t.to_string()).collect(),
            episodes,
            ..SourceIdentity::default()
        }
    }

    fn resolve(source: &SourceIdentity, candidates: &[SeasonCandidate]) -> SeasonMatch {
        let profile = CatalogProfile::default();
        SeasonResolver::new(&profile).resolve(source, candidates)
    }

    #[test]
    fn empty_candidate_list() {
        let result = resolve(&source(&["Anything"], None), &[]);
        assert_eq!(result, SeasonMatch::none());
    }

    #[test]
    fn exact_season_part_wins_over_episode_count() {
        let candidates = vec![
            season_entry("s3", "Season 3", Some(12)),
            season_entry("s3p2", "Season 3 Part 2", Some(10)),
        ];
        // Source episode count favors "s3", but the explicit part match
        // must win.
        let src = source(&["Attack on Titan Season 3 Part 2"], Some(12));
        let result = resolve(&src, &candidates);
        assert_eq!(result.slug.as_deref(), Some("s3p2"));
        assert_eq!(result.method, SeasonMethod::ExactSeasonPart);
    }

    #[test]
    fn season_match_prefers_unqualified_entry() {
        let candidates = vec![
            season_entry("s1", "Saison 1", Some(24)),
            season_entry("s2p2", "Saison 2 Partie 2", Some(12)),
            season_entry("s2", "Saison 2", Some(12)),
        ];
        let result = resolve(&source(&["My Hero Academia Season 2"], None), &candidates);
        assert_eq!(result.slug.as_deref(), Some("s2"));
        assert_eq!(result.method, SeasonMethod::Season);
    }

    #[test]
    fn part_only_when_source_has_no_season() {
        let candidates = vec![
            season_entry("p1", "Part 1", Some(12)),
            season_entry("p2", "Part 2", Some(12)),
        ];
        let result = resolve(&source(&["Chainsaw Man Part 2"], None), &candidates);
        assert_eq!(result.slug.as_deref(), Some("p2"));
        assert_eq!(result.method, SeasonMethod::Part);
    }

    #[test]
    fn sequel_cue_maps_to_season_number() {
        let candidates = vec![
            season_entry("s1", "Season 1", Some(13)),
            season_entry("s2", "Season 2", Some(13)),
        ];
        let result = resolve(&source(&["Overlord II"], None), &candidates);
        assert_eq!(result.slug.as_deref(), Some("s2"));
        assert_eq!(result.method, SeasonMethod::SequelCue);
    }

    #[test]
    fn exact_episode_count_match() {
        let candidates = vec![
            season_entry("a", "First Arc", Some(24)),
            season_entry("b", "Second Arc", Some(11)),
        ];
        let result = resolve(&source(&["Plain Title"], Some(11)), &candidates);
        assert_eq!(result.slug.as_deref(), Some("b"));
        assert_eq!(result.method, SeasonMethod::ExactEpisodes);
    }

    #[test]
    fn closest_episode_count_within_tolerance() {
        let candidates = vec![
            season_entry("a", "First Arc", Some(24)),
            season_entry("b", "Second Arc", Some(13)),
        ];
        let result = resolve(&source(&["Plain Title"], Some(11)), &candidates);
        assert_eq!(result.slug.as_deref(), Some("b"));
        assert_eq!(result.method, SeasonMethod::ClosestEpisodes);
    }

    #[test]
    fn closest_episode_count_outside_tolerance_falls_through() {
        let candidates = vec![
            season_entry("movie", "Movie", Some(1)),
            season_entry("tv", "TV Series", Some(50)),
        ];
        let result = resolve(&source(&["Plain Title"], Some(12)), &candidates);
        // Closest is 8 away — too far; the filtered fallback skips the
        // movie entry instead.
        assert_eq!(result.slug.as_deref(), Some("tv"));
        assert_eq!(result.method, SeasonMethod::Fallback);
    }

    #[test]
    fn fallback_unfiltered_for_short_sources() {
        let candidates = vec![
            season_entry("movie", "Movie", None),
            season_entry("tv", "TV Series", None),
        ];
        let result = resolve(&source(&["Plain Title"], Some(3)), &candidates);
        assert_eq!(result.slug.as_deref(), Some("movie"));
        assert_eq!(result.method, SeasonMethod::Fallback);
    }

    #[test]
    fn structured_numbers_take_precedence_over_labels() {
        let mut entry = season_entry("x", "Final Arc", Some(12));
        entry.season_number = Some(4);
        let result = resolve(&source(&["Title Season 4"], None), &[entry]);
        assert_eq!(result.slug.as_deref(), Some("x"));
        assert_eq!(result.method, SeasonMethod::Season);
    }

    // ── Split-cour detection ──────────────────────────────────────────

    fn dated(
        slug: &str,
        label: &str,
        episodes: u32,
        season_number: u32,
        part_number: Option<u32>,
        date: &str,
    ) -> SeasonCandidate {
        SeasonCandidate {
            label: label.into(),
            slug: slug.into(),
            episodes: Some(episodes),
            season_number: Some(season_number),
            part_number,
            air_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            ..SeasonCandidate::default()
        }
    }

    #[test]
    fn split_cour_flagged_for_second_part() {
        let candidates = vec![
            dated("s1", "Season 1", 24, 1, None, "2020-01-01"),
            dated("s1p2", "Season 1 Part 2", 12, 1, Some(2), "2020-07-01"),
        ];
        let result = resolve(&source(&["Plain Title"], Some(12)), &candidates);
        assert_eq!(result.slug.as_deref(), Some("s1p2"));
        assert!(result.split_cour);
    }

    #[test]
    fn split_cour_not_flagged_when_gap_too_wide() {
        let candidates = vec![
            dated("s1", "Season 1", 24, 1, None, "2020-01-01"),
            dated("s1p2", "Season 1 Part 2", 12, 1, Some(2), "2020-08-15"),
        ];
        let result = resolve(&source(&["Plain Title"], Some(12)), &candidates);
        assert_eq!(result.slug.as_deref(), Some("s1p2"));
        assert!(!result.split_cour, "7-month gap must not flag");
    }

    #[test]
    fn split_cour_not_flagged_when_ratio_out_of_band() {
        let candidates = vec![
            dated("s1", "Season 1", 24, 1, None, "2020-01-01"),
            dated("s1p2", "Season 1 Part 2", 20, 1, Some(2), "2020-05-01"),
        ];
        // 20/24 ≈ 0.83 — too large a share to be a second cour.
        let result = resolve(&source(&["Plain Title"], Some(20)), &candidates);
        assert!(!result.split_cour);
    }

    #[test]
    fn split_cour_uses_source_start_date_when_present() {
        let candidates = vec![
            dated("s1", "Season 1", 24, 1, None, "2020-01-01"),
            dated("s1p2", "Season 1 Part 2", 12, 1, Some(2), "2020-07-01"),
        ];
        let mut src = source(&["Plain Title"], Some(12));
        src.start_date = NaiveDate::parse_from_str("2020-04-01", "%Y-%m-%d").ok();
        let result = resolve(&src, &candidates);
        // 3-month gap from the source's own date — still in band.
        assert!(result.split_cour);
    }

    #[test]
    fn no_split_cour_without_base_entry() {
        let candidates = vec![dated("s1p2", "Season 1 Part 2", 12, 1, Some(2), "2020-07-01")];
        let result = resolve(&source(&["Plain Title"], Some(12)), &candidates);
        assert!(!result.split_cour);
    }

    #[test]
    fn month_gap_whole_months() {
        let a = NaiveDate::parse_from_str("2020-01-15", "%Y-%m-%d").unwrap();
        let b = NaiveDate::parse_from_str("2020-07-02", "%Y-%m-%d").unwrap();
        assert_eq!(month_gap(b, a), 6);
        assert_eq!(month_gap(a, b), 6);
        assert_eq!(month_gap(a, a), 0);
    }
}
