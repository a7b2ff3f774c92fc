use crate::advisory::{Advisor, SuggestionProvider};
use crate::intake::{ScoreRequest, ValidatedRequest, ValidationErrors};
use crate::ledger::{Ledger, LedgerError, Submission, SummaryStats};
use crate::scoring::{Rating, ScoringProfile, Scorer};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Service composing the scorer, the advisor, and the submission ledger.
pub struct ScoringService<L, P> {
    scorer: Arc<Scorer>,
    advisor: Advisor<P>,
    ledger: Arc<L>,
}

/// Public shape of a scoring result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResponse {
    pub product_name: String,
    pub sustainability_score: f64,
    pub rating: Rating,
    pub suggestions: Vec<String>,
}

impl From<&Submission> for ScoreResponse {
    fn from(submission: &Submission) -> Self {
        Self {
            product_name: submission.product.name.clone(),
            sustainability_score: (submission.score * 10.0).round() / 10.0,
            rating: submission.rating,
            suggestions: submission.suggestions.clone(),
        }
    }
}

impl<L, P> ScoringService<L, P>
where
    L: Ledger + 'static,
    P: SuggestionProvider + 'static,
{
    pub fn new(
        ledger: Arc<L>,
        provider: P,
        profile: ScoringProfile,
        advisory_timeout: Duration,
    ) -> Self {
        let scorer = Arc::new(Scorer::new(profile));
        let advisor = Advisor::new(provider, scorer.clone(), advisory_timeout);
        Self {
            scorer,
            advisor,
            ledger,
        }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn validate(&self, request: ScoreRequest) -> Result<ValidatedRequest, ValidationErrors> {
        request.validate(&self.scorer.profile().default_weights)
    }

    /// Validate, score, and record a raw request.
    pub async fn submit(&self, request: ScoreRequest) -> Result<Submission, ScoringServiceError> {
        let validated = self.validate(request)?;
        self.score(validated).await
    }

    /// Score a validated product and append it to the ledger. The advisory call happens before
    /// the append and outside the ledger's lock; a failed attempt stores nothing.
    pub async fn score(
        &self,
        request: ValidatedRequest,
    ) -> Result<Submission, ScoringServiceError> {
        let ValidatedRequest { product, weights } = request;

        let result = self.scorer.evaluate(&product, weights.as_ref());
        if !result.score.is_finite() {
            return Err(ScoringServiceError::Internal(format!(
                "score for '{}' is not a finite number",
                product.name
            )));
        }
        debug!(
            product = %product.name,
            score = result.score,
            rating = %result.rating,
            "scored product"
        );

        let suggestions = self
            .advisor
            .suggestions(&product, result.score, result.rating)
            .await;

        let submission = self
            .ledger
            .add(&product, result.score, result.rating, &suggestions)?;
        info!(
            id = submission.id,
            product = %submission.product.name,
            rating = %submission.rating,
            provider = self.advisor.provider_name(),
            "recorded submission"
        );
        Ok(submission)
    }

    pub fn history(&self, limit: usize) -> Result<Vec<Submission>, ScoringServiceError> {
        Ok(self.ledger.get_recent(limit)?)
    }

    pub fn summary(&self) -> Result<SummaryStats, ScoringServiceError> {
        Ok(self.ledger.summarize()?)
    }
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ScoringServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("internal scoring fault: {0}")]
    Internal(String),
}
