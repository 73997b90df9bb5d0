//! Identity resolution against one catalog.
//!
//! Flow: build title variants → query the catalog per variant → score
//! every returned candidate into a shared pool → apply override rules
//! over the whole pool → gate by the profile's acceptance threshold,
//! with one base-title retry before giving up. Collaborator failures
//! degrade to empty candidate sets; only a run where every query failed
//! surfaces as `MatchMethod::Error`.

use std::sync::Arc;

use tracing::{debug, warn};
use tsunagi_parse::{normalize, season, VariationTable};

use crate::cache::ResolutionCache;
use crate::catalog::{CatalogSearch, CatalogSeasonList};
use crate::error::ResolveError;
use crate::models::{
    CandidateRecord, Format, MatchMethod, MatchResult, SeasonMatch, SourceIdentity,
};
use crate::profile::CatalogProfile;
use crate::score::{self, Scorer};
use crate::season::SeasonResolver;

/// Shortest derived variant worth querying, in characters.
const MIN_VARIANT_CHARS: usize = 4;

/// A scored member of the candidate pool.
struct Scored {
    record: CandidateRecord,
    score: f64,
}

/// The resolution engine for one catalog, parameterized by its profile.
///
/// Stateless per call; a single instance is safe to share across
/// concurrent resolutions.
pub struct Resolver {
    profile: CatalogProfile,
    variations: VariationTable,
    cache: Option<Arc<dyn ResolutionCache>>,
}

impl Resolver {
    pub fn new(profile: CatalogProfile) -> Result<Self, ResolveError> {
        profile.validate()?;
        let variations = VariationTable::new(profile.locale);
        Ok(Self {
            profile,
            variations,
            cache: None,
        })
    }

    /// Attach a caller-owned read-through result cache.
    pub fn with_cache(mut self, cache: Arc<dyn ResolutionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn profile(&self) -> &CatalogProfile {
        &self.profile
    }

    /// Resolve a source identity to a foreign catalog record.
    ///
    /// Always returns a `MatchResult` with a defined method; "not
    /// found" and "lookup broke" are distinguishable outcomes, never
    /// errors.
    #[tracing::instrument(name = "resolve_identity", skip_all, fields(primary = %source.primary_title()))]
    pub async fn resolve_identity<C: CatalogSearch>(
        &self,
        source: &SourceIdentity,
        catalog: &C,
    ) -> MatchResult {
        if source.titles.is_empty() {
            return MatchResult::none();
        }

        let cache_key = normalize(source.primary_title(), false);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&cache_key) {
                debug!(key = %cache_key, "resolution cache hit");
                return hit;
            }
        }

        let result = self.resolve_uncached(source, catalog).await;

        if let Some(cache) = &self.cache {
            if result.method != MatchMethod::Error {
                cache.insert(&cache_key, result.clone());
            }
        }
        result
    }

    /// Resolve which season entry of an already-matched record
    /// corresponds to the source identity.
    #[tracing::instrument(name = "resolve_season", skip_all, fields(foreign_id = %foreign_id))]
    pub async fn resolve_season<C: CatalogSeasonList>(
        &self,
        foreign_id: &str,
        source: &SourceIdentity,
        catalog: &C,
    ) -> SeasonMatch {
        let seasons = match catalog.seasons(foreign_id).await {
            Ok(seasons) => seasons,
            Err(e) => {
                warn!(error = %e, "season listing failed");
                return SeasonMatch::none();
            }
        };
        let seasons: Vec<_> = seasons.into_iter().filter(|s| !s.slug.is_empty()).collect();
        if seasons.is_empty() {
            return SeasonMatch::none();
        }
        SeasonResolver::new(&self.profile).resolve(source, &seasons)
    }

    async fn resolve_uncached<C: CatalogSearch>(
        &self,
        source: &SourceIdentity,
        catalog: &C,
    ) -> MatchResult {
        let mut pool = Vec::new();
        let mut tried = Vec::new();
        let mut queries = 0usize;
        let mut failures = 0usize;

        let variants = self.title_variants(source);
        self.run_pass(source, &variants, catalog, &mut pool, &mut tried, &mut queries, &mut failures)
            .await;

        if pool.is_empty() {
            let compact = self.compact_variants(&variants, &tried);
            self.run_pass(source, &compact, catalog, &mut pool, &mut tried, &mut queries, &mut failures)
                .await;
        }

        if let Some(result) = self.accept(source, &pool, &tried, false) {
            return result;
        }

        // Last resort: strip season/part/parenthetical markers off the
        // primary title and try once more.
        let base = season::strip_markers(source.primary_title());
        if !normalize(&base, false).is_empty() && !tried.contains(&normalize(&base, false)) {
            debug!(base = %base, "retrying with stripped base title");
            let mut retry_pool = Vec::new();
            self.run_pass(
                source,
                std::slice::from_ref(&base),
                catalog,
                &mut retry_pool,
                &mut tried,
                &mut queries,
                &mut failures,
            )
            .await;
            if let Some(result) = self.accept(source, &retry_pool, &tried, true) {
                return result;
            }
        }

        if queries > 0 && failures == queries {
            warn!("every catalog query failed");
            return MatchResult::error();
        }
        debug!("no candidate cleared the acceptance threshold");
        MatchResult::none()
    }

    /// Query the catalog for each variant, scoring results into `pool`.
    /// Stops the sweep early once any candidate scores past the
    /// excellent cutoff.
    #[allow(clippy::too_many_arguments)]
    async fn run_pass<C: CatalogSearch>(
        &self,
        source: &SourceIdentity,
        variants: &[String],
        catalog: &C,
        pool: &mut Vec<Scored>,
        tried: &mut Vec<String>,
        queries: &mut usize,
        failures: &mut usize,
    ) {
        let scorer = Scorer::new(&self.profile, &self.variations);
        for variant in variants {
            let key = normalize(variant, false);
            if !tried.contains(&key) {
                tried.push(key);
            }
            *queries += 1;
            let records = match catalog.search(variant).await {
                Ok(records) => records,
                Err(e) => {
                    warn!(variant = %variant, error = %e, "catalog search failed");
                    *failures += 1;
                    continue;
                }
            };
            debug!(variant = %variant, candidates = records.len(), "catalog searched");

            let mut excellent = false;
            for record in records {
                if record.id.is_empty() {
                    // Invariant violation from the collaborator; never
                    // allow an unidentifiable record into the pool.
                    continue;
                }
                let Some(score) = scorer.score(source, variant, &record) else {
                    continue;
                };
                if score >= self.profile.excellent_cutoff {
                    excellent = true;
                }
                match pool.iter_mut().find(|s| s.record.id == record.id) {
                    Some(existing) => {
                        if score > existing.score {
                            existing.score = score;
                        }
                    }
                    None => pool.push(Scored { record, score }),
                }
            }
            if excellent {
                debug!(variant = %variant, "excellent match, stopping variant sweep");
                break;
            }
        }
    }

    /// Override rules over the whole pool, in priority order. A later,
    /// lower-scored-but-more-specific candidate can outrank a noisy
    /// high scorer.
    fn select(
        &self,
        source: &SourceIdentity,
        pool: &[Scored],
        tried: &[String],
    ) -> (usize, MatchMethod) {
        // 1. Normalized title equal to any tried variant — highest
        //    scorer among those.
        let mut exact: Option<usize> = None;
        for (idx, scored) in pool.iter().enumerate() {
            if tried.iter().any(|t| *t == normalize(&scored.record.title, false))
                && exact.map_or(true, |e: usize| scored.score > pool[e].score)
            {
                exact = Some(idx);
            }
        }
        if let Some(idx) = exact {
            return (idx, MatchMethod::ExactTitle);
        }

        // 2. Episode count and format both exact.
        if let (Some(episodes), Some(format)) = (source.episodes, source.format) {
            if let Some(idx) = pool.iter().position(|s| {
                s.record.episodes == Some(episodes) && s.record.format == Some(format)
            }) {
                return (idx, MatchMethod::ExactEpisodeFormat);
            }
        }

        // 3. Shared release year.
        let source_years = source_years(source);
        if !source_years.is_empty() {
            if let Some(idx) = pool.iter().position(|s| {
                score::candidate_years(&s.record)
                    .iter()
                    .any(|y| source_years.contains(y))
            }) {
                return (idx, MatchMethod::Year);
            }
        }

        // 4. Shared season number.
        if let Some(season) = source.titles.iter().find_map(|t| season::extract(t).season) {
            if let Some(idx) = pool
                .iter()
                .position(|s| season::extract(&s.record.title).season == Some(season))
            {
                return (idx, MatchMethod::SeasonNumber);
            }
        }

        let top = pool
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.score.total_cmp(&b.1.score))
            .map(|(idx, _)| idx)
            .unwrap_or(0);

        // 5. A TV source prefers a TV candidate close to the top score.
        if source.format == Some(Format::Tv) && pool[top].record.format != Some(Format::Tv) {
            let mut best_tv: Option<usize> = None;
            for (idx, scored) in pool.iter().enumerate() {
                if scored.record.format == Some(Format::Tv)
                    && pool[top].score - scored.score <= self.profile.format_priority_margin
                    && best_tv.map_or(true, |b: usize| scored.score > pool[b].score)
                {
                    best_tv = Some(idx);
                }
            }
            if let Some(idx) = best_tv {
                return (idx, MatchMethod::FormatPriority);
            }
        }

        // 6. Plain highest score.
        (top, MatchMethod::HighestScore)
    }

    /// Threshold gate. Returns `None` when nothing in the pool clears
    /// the bar, which sends the caller into the retry path.
    fn accept(
        &self,
        source: &SourceIdentity,
        pool: &[Scored],
        tried: &[String],
        retry: bool,
    ) -> Option<MatchResult> {
        if pool.is_empty() {
            return None;
        }
        let (idx, method) = self.select(source, pool, tried);
        let chosen = &pool[idx];

        if chosen.score >= self.profile.min_accept {
            let method = if retry { MatchMethod::Alternative } else { method };
            debug!(
                id = %chosen.record.id,
                score = chosen.score,
                method = %method,
                "candidate accepted"
            );
            return Some(MatchResult::accepted(
                chosen.score,
                chosen.record.id.clone(),
                method,
            ));
        }

        // Niche formats see sparse catalogs; accept against the lower
        // bar and tag the result so callers know the evidence was thin.
        if source.format.is_some_and(Format::is_niche) && chosen.score >= self.profile.niche_accept
        {
            debug!(id = %chosen.record.id, score = chosen.score, "niche candidate accepted");
            return Some(MatchResult::accepted(
                chosen.score,
                chosen.record.id.clone(),
                MatchMethod::DirectFallback,
            ));
        }

        None
    }

    /// Source titles de-duplicated by normalized form, order preserved.
    fn title_variants(&self, source: &SourceIdentity) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        let mut variants = Vec::new();
        for title in &source.titles {
            let key = normalize(title, false);
            if key.is_empty() || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            variants.push(title.clone());
        }
        variants
    }

    /// Derived compact variants for a failed first pass: pre-colon and
    /// pre-dash fragments, colon-removed concatenations.
    fn compact_variants(&self, variants: &[String], tried: &[String]) -> Vec<String> {
        let mut seen: Vec<String> = tried.to_vec();
        let mut compact = Vec::new();
        for title in variants {
            let mut derived: Vec<String> = Vec::new();
            if let Some((head, _)) = title.split_once(':') {
                derived.push(head.trim().to_string());
            }
            if let Some((head, _)) = title.split_once(" - ") {
                derived.push(head.trim().to_string());
            }
            if title.contains(':') {
                derived.push(title.replace(':', ""));
            }
            for candidate in derived {
                let key = normalize(&candidate, false);
                if key.chars().count() < MIN_VARIANT_CHARS || seen.contains(&key) {
                    continue;
                }
                seen.push(key);
                compact.push(candidate);
            }
        }
        compact
    }
}

/// Structured year plus years embedded in any source title.
fn source_years(source: &SourceIdentity) -> Vec<i32> {
    let mut years = Vec::new();
    for title in &source.titles {
        for y in score::title_years(source.year, title) {
            if !years.contains(&y) {
                years.push(y);
            }
        }
    }
    if let Some(y) = source.year {
        if !years.contains(&y) {
            years.push(y);
        }
    }
    years
}
