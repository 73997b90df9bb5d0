//! Entities exchanged between the engine and its catalog collaborators.
//!
//! Everything here is created per resolution call from collaborator
//! responses, consumed synchronously, and discarded; only `MatchResult`
//! outlives a call, as a cache value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Broadcast format of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Tv,
    Movie,
    Ova,
    Ona,
    Special,
    Music,
}

impl Format {
    /// Lenient parse from catalog-specific strings ("TV Series",
    /// "MOVIE", "OAD"). Returns `None` for unrecognized input.
    pub fn parse(text: &str) -> Option<Self> {
        let folded: String = text
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match folded.as_str() {
            "tv" | "tvseries" | "tvshort" | "tvshow" => Some(Self::Tv),
            "movie" | "film" => Some(Self::Movie),
            "ova" | "oad" | "oav" => Some(Self::Ova),
            "ona" => Some(Self::Ona),
            "special" | "specials" | "tvspecial" | "sp" => Some(Self::Special),
            "music" | "musicvideo" | "mv" => Some(Self::Music),
            _ => None,
        }
    }

    /// Formats with sparse catalog coverage, resolved against a lower
    /// acceptance threshold.
    pub fn is_niche(self) -> bool {
        matches!(self, Self::Ova | Self::Special | Self::Music)
    }
}

/// The anime as known in the originating catalog. Immutable per call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceIdentity {
    /// Candidate titles in preference order: primary first, then
    /// romanized/alternate titles and synonyms. Must be non-empty for a
    /// resolution to proceed.
    pub titles: Vec<String>,
    pub format: Option<Format>,
    pub episodes: Option<u32>,
    pub year: Option<i32>,
    /// Per-episode (or film) duration in minutes.
    pub duration_min: Option<u32>,
    /// First air date, when the source catalog exposes one. Consulted
    /// by split-cour detection.
    pub start_date: Option<NaiveDate>,
}

impl SourceIdentity {
    pub fn primary_title(&self) -> &str {
        self.titles.first().map(String::as_str).unwrap_or("")
    }
}

/// One entry returned by a target catalog's search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Foreign-catalog identifier, opaque to the engine. Records with
    /// an empty id are dropped before scoring.
    pub id: String,
    pub title: String,
    pub secondary_title: Option<String>,
    pub format: Option<Format>,
    pub episodes: Option<u32>,
    pub duration_min: Option<u32>,
    pub years: Vec<i32>,
}

/// The rule that produced a final match, for debuggability and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    None,
    ExactTitle,
    ExactEpisodeFormat,
    Year,
    SeasonNumber,
    FormatPriority,
    HighestScore,
    Alternative,
    DirectFallback,
    Error,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::None => "none",
            Self::ExactTitle => "exact_title",
            Self::ExactEpisodeFormat => "exact_episode_format",
            Self::Year => "year",
            Self::SeasonNumber => "season_number",
            Self::FormatPriority => "format_priority",
            Self::HighestScore => "highest_score",
            Self::Alternative => "alternative",
            Self::DirectFallback => "direct_fallback",
            Self::Error => "error",
        };
        write!(f, "{tag}")
    }
}

/// Outcome of an identity resolution.
///
/// Invariant: `foreign_id` is present exactly when `method` is neither
/// `None` nor `Error`. Construct through the helpers to preserve it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Confidence in [0,1]; internal bonus arithmetic is unbounded but
    /// the public result clamps.
    pub score: f64,
    pub foreign_id: Option<String>,
    pub method: MatchMethod,
}

impl MatchResult {
    /// No usable candidate.
    pub fn none() -> Self {
        Self {
            score: 0.0,
            foreign_id: None,
            method: MatchMethod::None,
        }
    }

    /// Every collaborator query failed.
    pub fn error() -> Self {
        Self {
            score: 0.0,
            foreign_id: None,
            method: MatchMethod::Error,
        }
    }

    /// An accepted candidate; the raw score is clamped into [0,1].
    pub fn accepted(score: f64, foreign_id: String, method: MatchMethod) -> Self {
        debug_assert!(!matches!(method, MatchMethod::None | MatchMethod::Error));
        Self {
            score: score.clamp(0.0, 1.0),
            foreign_id: Some(foreign_id),
            method,
        }
    }

    pub fn is_match(&self) -> bool {
        self.foreign_id.is_some()
    }
}

/// A season-like sub-entry of an already-resolved catalog record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonCandidate {
    /// Display label ("Saison 2", "Season 3 Part 2", "Film").
    pub label: String,
    /// Catalog identifier for this sub-entry.
    pub slug: String,
    /// Language/track variant ("vostfr", "vf", "dub"), when the catalog
    /// splits seasons per track.
    pub track: Option<String>,
    pub episodes: Option<u32>,
    /// Season/part numbers when the catalog exposes them structured;
    /// otherwise they are extracted from `label`.
    pub season_number: Option<u32>,
    pub part_number: Option<u32>,
    pub air_date: Option<NaiveDate>,
}

/// The rule that selected a season entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonMethod {
    None,
    ExactSeasonPart,
    Season,
    Part,
    SequelCue,
    ExactEpisodes,
    ClosestEpisodes,
    Fallback,
}

/// Outcome of a season resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonMatch {
    pub slug: Option<String>,
    pub method: SeasonMethod,
    /// Advisory: the selected entry looks like the second cour of a
    /// split-cour season rather than a separate season.
    pub split_cour: bool,
}

impl SeasonMatch {
    pub fn none() -> Self {
        Self {
            slug: None,
            method: SeasonMethod::None,
            split_cour: false,
        }
    }

    pub fn selected(slug: String, method: SeasonMethod, split_cour: bool) -> Self {
        Self {
            slug: Some(slug),
            method,
            split_cour,
        }
    }
}
