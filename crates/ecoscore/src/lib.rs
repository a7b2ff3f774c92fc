//! Product sustainability scoring: a weighted scorer with a rating ladder, advisory
//! suggestions with a deterministic fallback, and an append-only ledger with summary analytics.

pub mod advisory;
pub mod config;
pub mod error;
pub mod intake;
pub mod ledger;
pub mod router;
pub mod scoring;
pub mod service;
pub mod telemetry;

pub use router::scoring_router;
pub use service::{ScoreResponse, ScoringService, ScoringServiceError};
