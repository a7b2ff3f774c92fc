//! Append-only record of scored submissions.

pub mod summary;

pub use summary::{summarize, IssueTag, SummaryStats};

use crate::scoring::{ProductRecord, Rating};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// One immutable ledger entry. Serialized flat so history responses carry the product fields
/// next to the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub product: ProductRecord,
    #[serde(rename = "sustainability_score")]
    pub score: f64,
    pub rating: Rating,
    pub suggestions: Vec<String>,
}

/// Storage abstraction so the scoring service and aggregator can run against any backing store.
pub trait Ledger: Send + Sync {
    /// Assigns the next id (`count + 1`) and the current timestamp, then stores the entry.
    fn add(
        &self,
        product: &ProductRecord,
        score: f64,
        rating: Rating,
        suggestions: &[String],
    ) -> Result<Submission, LedgerError>;

    /// The newest `limit` entries, oldest first.
    fn get_recent(&self, limit: usize) -> Result<Vec<Submission>, LedgerError>;

    fn all(&self) -> Result<Vec<Submission>, LedgerError>;

    fn summarize(&self) -> Result<SummaryStats, LedgerError> {
        Ok(summarize(&self.all()?))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
pub struct InMemoryLedger {
    submissions: RwLock<Vec<Submission>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Submission>>, LedgerError> {
        self.submissions
            .read()
            .map_err(|_| LedgerError::Unavailable("ledger lock poisoned".to_string()))
    }
}

impl Ledger for InMemoryLedger {
    fn add(
        &self,
        product: &ProductRecord,
        score: f64,
        rating: Rating,
        suggestions: &[String],
    ) -> Result<Submission, LedgerError> {
        let mut guard = self
            .submissions
            .write()
            .map_err(|_| LedgerError::Unavailable("ledger lock poisoned".to_string()))?;

        let submission = Submission {
            id: guard.len() as u64 + 1,
            created_at: Utc::now(),
            product: product.clone(),
            score,
            rating,
            suggestions: suggestions.to_vec(),
        };
        guard.push(submission.clone());
        Ok(submission)
    }

    fn get_recent(&self, limit: usize) -> Result<Vec<Submission>, LedgerError> {
        let guard = self.read()?;
        let start = guard.len().saturating_sub(limit);
        Ok(guard[start..].to_vec())
    }

    fn all(&self) -> Result<Vec<Submission>, LedgerError> {
        Ok(self.read()?.clone())
    }

    fn summarize(&self) -> Result<SummaryStats, LedgerError> {
        Ok(summarize(&self.read()?))
    }
}
