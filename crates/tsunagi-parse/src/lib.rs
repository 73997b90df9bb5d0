//! Text analysis for cross-catalog anime title matching.
//!
//! Pure, stateless building blocks: title normalization, word-variation
//! expansion and season/part/year extraction. The resolution engine in
//! `tsunagi-core` composes these against live catalog data.

pub mod normalize;
pub mod season;
pub mod variations;
pub mod year;

pub use normalize::normalize;
pub use season::TitleMarkers;
pub use variations::{Locale, VariationTable};
