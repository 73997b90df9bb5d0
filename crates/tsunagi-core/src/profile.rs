//! Per-catalog tuning: score weights, acceptance thresholds, synonym
//! locale. One engine, many catalogs — each integration instantiates
//! the resolver with its own profile instead of forking the matching
//! logic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tsunagi_parse::Locale;

use crate::error::ResolveError;

const EMBEDDED_PROFILES: &str = include_str!("../../../config/profiles.toml");

/// Weight table and thresholds for one catalog integration.
///
/// All fields have tuned defaults; a profile TOML entry only overrides
/// what differs for that catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogProfile {
    /// Which synonym tables the variation expander uses.
    pub locale: Locale,

    /// Blend between word-level score and whole-string similarity.
    pub word_weight: f64,
    pub string_weight: f64,

    /// Contextual bonuses and penalties, applied on top of the base
    /// title score. Penalty fields hold positive magnitudes.
    pub format_bonus: f64,
    pub episode_exact_bonus: f64,
    pub episode_close_bonus: f64,
    pub year_bonus: f64,
    pub year_penalty: f64,
    pub season_bonus: f64,
    pub season_penalty: f64,
    pub duration_bonus: f64,
    pub duration_penalty: f64,
    pub movie_tv_penalty: f64,
    pub long_runner_bonus: f64,

    /// Multiplier for single-word queries hitting compound titles.
    pub compound_factor: f64,
    /// Sequel-ish words that mark a compound title ("X Wars").
    pub compound_markers: Vec<String>,

    /// Stop querying further variants once a candidate scores this high.
    pub excellent_cutoff: f64,
    /// Minimum accepted score for ordinary sources.
    pub min_accept: f64,
    /// Lower bar for niche formats (OVA/Special/Music) with sparse
    /// catalog coverage.
    pub niche_accept: f64,
    /// How far below the top score a TV candidate may sit and still win
    /// format priority.
    pub format_priority_margin: f64,

    /// Episode-count slack for season resolution.
    pub episode_tolerance: u32,
}

impl Default for CatalogProfile {
    fn default() -> Self {
        Self {
            locale: Locale::English,
            word_weight: 0.7,
            string_weight: 0.3,
            format_bonus: 0.12,
            episode_exact_bonus: 0.20,
            episode_close_bonus: 0.10,
            year_bonus: 0.25,
            year_penalty: 0.30,
            season_bonus: 0.20,
            season_penalty: 0.40,
            duration_bonus: 0.20,
            duration_penalty: 0.15,
            movie_tv_penalty: 0.30,
            long_runner_bonus: 0.10,
            compound_factor: 0.5,
            compound_markers: vec![
                "wars".into(),
                "hunters".into(),
                "heroes".into(),
                "chronicles".into(),
            ],
            excellent_cutoff: 0.88,
            min_accept: 0.40,
            niche_accept: 0.25,
            format_priority_margin: 0.20,
            episode_tolerance: 3,
        }
    }
}

impl CatalogProfile {
    /// Reject profiles the scorer cannot work with.
    pub fn validate(&self) -> Result<(), ResolveError> {
        let weights = [
            ("word_weight", self.word_weight),
            ("string_weight", self.string_weight),
            ("format_bonus", self.format_bonus),
            ("episode_exact_bonus", self.episode_exact_bonus),
            ("episode_close_bonus", self.episode_close_bonus),
            ("year_bonus", self.year_bonus),
            ("year_penalty", self.year_penalty),
            ("season_bonus", self.season_bonus),
            ("season_penalty", self.season_penalty),
            ("duration_bonus", self.duration_bonus),
            ("duration_penalty", self.duration_penalty),
            ("movie_tv_penalty", self.movie_tv_penalty),
            ("long_runner_bonus", self.long_runner_bonus),
            ("compound_factor", self.compound_factor),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ResolveError::Profile(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        let thresholds = [
            ("excellent_cutoff", self.excellent_cutoff),
            ("min_accept", self.min_accept),
            ("niche_accept", self.niche_accept),
            ("format_priority_margin", self.format_priority_margin),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(ResolveError::Profile(format!(
                    "{name} must be within [0,1], got {value}"
                )));
            }
        }

        if self.niche_accept > self.min_accept {
            return Err(ResolveError::Profile(
                "niche_accept must not exceed min_accept".into(),
            ));
        }
        Ok(())
    }
}

/// Named profiles loaded from TOML, one table per catalog.
#[derive(Debug, Clone)]
pub struct ProfileSet {
    profiles: HashMap<String, CatalogProfile>,
}

impl ProfileSet {
    /// The tuned defaults shipped with the crate.
    pub fn embedded() -> Result<Self, ResolveError> {
        Self::from_toml(EMBEDDED_PROFILES)
    }

    pub fn from_toml(text: &str) -> Result<Self, ResolveError> {
        let profiles: HashMap<String, CatalogProfile> = toml::from_str(text)?;
        for (name, profile) in &profiles {
            profile
                .validate()
                .map_err(|e| ResolveError::Profile(format!("[{name}] {e}")))?;
        }
        Ok(Self { profiles })
    }

    pub fn get(&self, name: &str) -> Option<&CatalogProfile> {
        self.profiles.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}
