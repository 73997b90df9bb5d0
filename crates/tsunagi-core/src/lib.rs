//! Cross-catalog identity resolution for anime metadata.
//!
//! Catalogs share no common identifier, so linking a record in one to
//! its counterpart in another comes down to fuzzy, multi-signal title
//! matching. This crate hosts the engine: candidate scoring with
//! contextual bonuses, season/part resolution with split-cour
//! detection, and the variant-sweeping match selector. Each catalog
//! integration instantiates a [`Resolver`] with its own
//! [`CatalogProfile`] and supplies the search collaborators.
//!
//! ```no_run
//! use tsunagi_core::{CatalogProfile, MemoryCatalog, Resolver, SourceIdentity};
//!
//! # async fn demo() -> Result<(), tsunagi_core::ResolveError> {
//! let resolver = Resolver::new(CatalogProfile::default())?;
//! let catalog = MemoryCatalog::new(vec![]);
//! let source = SourceIdentity {
//!     titles: vec!["Sousou no Frieren".into()],
//!     ..SourceIdentity::default()
//! };
//! let result = resolver.resolve_identity(&source, &catalog).await;
//! println!("{:?} -> {:?}", result.method, result.foreign_id);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod catalog;
pub mod error;
pub mod models;
pub mod profile;
pub mod resolver;
pub mod score;
pub mod season;

pub use cache::{CacheStats, ResolutionCache, TtlCache};
pub use catalog::{CatalogSearch, CatalogSeasonList, MemoryCatalog};
pub use error::ResolveError;
pub use models::{
    CandidateRecord, Format, MatchMethod, MatchResult, SeasonCandidate, SeasonMatch, SeasonMethod,
    SourceIdentity,
};
pub use profile::{CatalogProfile, ProfileSet};
pub use resolver::Resolver;
pub use score::Scorer;
pub use season::SeasonResolver;
pub use tsunagi_parse::Locale;
