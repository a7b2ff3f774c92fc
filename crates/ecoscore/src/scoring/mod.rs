//! Scoring core: validated product records in, bounded score and letter rating out.

pub mod domain;
mod engine;
pub mod profile;
pub mod suggestions;

pub use domain::{PackagingKind, ProductRecord, Rating, ScoreResult, TransportMode, WeightConfig};
pub use engine::{ScoreBreakdown, Scorer};
pub use profile::{ProfileError, ScoringProfile};
