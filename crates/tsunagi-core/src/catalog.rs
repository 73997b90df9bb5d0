//! Collaborator interfaces supplied by the catalog-integration layer.
//!
//! The engine never fetches anything itself; each integration hands it
//! an async search function and, for season-organized catalogs, a
//! season enumerator. Transport concerns (retries, timeouts, caching
//! middleware) live entirely behind these traits.

use std::collections::HashMap;
use std::future::Future;

use thiserror::Error;
use tsunagi_parse::normalize;

use crate::models::{CandidateRecord, SeasonCandidate};

/// Full-text search in a target catalog.
///
/// Failures are recoverable from the engine's point of view: a failed
/// variant degrades to an empty candidate set and resolution continues.
pub trait CatalogSearch: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<CandidateRecord>, Self::Error>> + Send;
}

/// Season-like sub-entries of an already-resolved catalog record.
pub trait CatalogSeasonList: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn seasons(
        &self,
        foreign_id: &str,
    ) -> impl Future<Output = Result<Vec<SeasonCandidate>, Self::Error>> + Send;
}

/// Simulated collaborator failure from [`MemoryCatalog`].
#[derive(Debug, Error)]
#[error("memory catalog failure")]
pub struct MemoryCatalogError;

/// In-memory catalog double used by tests and examples.
///
/// Search matches on word overlap with the normalized query, which is
/// deliberately loose — the scorer is what narrows results down.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    records: Vec<CandidateRecord>,
    seasons: HashMap<String, Vec<SeasonCandidate>>,
    fail: bool,
}

impl MemoryCatalog {
    pub fn new(records: Vec<CandidateRecord>) -> Self {
        Self {
            records,
            seasons: HashMap::new(),
            fail: false,
        }
    }

    /// A catalog whose every call errors, for failure-path tests.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_seasons(mut self, foreign_id: &str, seasons: Vec<SeasonCandidate>) -> Self {
        self.seasons.insert(foreign_id.to_string(), seasons);
        self
    }

    fn matching(&self, query: &str) -> Vec<CandidateRecord> {
        let q = normalize(query, true);
        let q_words: Vec<&str> = q.split_whitespace().collect();
        self.records
            .iter()
            .filter(|r| {
                let overlaps = |text: &str| {
                    normalize(text, true)
                        .split_whitespace()
                        .any(|w| q_words.contains(&w))
                };
                overlaps(&r.title)
                    || r.secondary_title.as_deref().is_some_and(overlaps)
            })
            .cloned()
            .collect()
    }
}

impl CatalogSearch for MemoryCatalog {
    type Error = MemoryCatalogError;

    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<CandidateRecord>, Self::Error>> + Send {
        let result = if self.fail {
            Err(MemoryCatalogError)
        } else {
            Ok(self.matching(query))
        };
        async move { result }
    }
}

impl CatalogSeasonList for MemoryCatalog {
    type Error = MemoryCatalogError;

    fn seasons(
        &self,
        foreign_id: &str,
    ) -> impl Future<Output = Result<Vec<SeasonCandidate>, Self::Error>> + Send {
        let result = if self.fail {
            Err(MemoryCatalogError)
        } else {
            Ok(self.seasons.get(foreign_id).cloned().unwrap_or_default())
        };
        async move { result }
    }
}
