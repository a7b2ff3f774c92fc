//! Suggestion sources. An external generative provider is consulted once per request; any
//! failure falls back to the deterministic rule set so callers always receive suggestions.

mod gemini;

pub use gemini::{GeminiProvider, DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL};

use crate::config::AdvisoryConfig;
use crate::scoring::{ProductRecord, Rating, Scorer};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const MIN_PROVIDER_SUGGESTIONS: usize = 2;
pub const MAX_PROVIDER_SUGGESTIONS: usize = 3;

/// Context handed to a provider for a single scored product.
#[derive(Debug, Clone, Copy)]
pub struct AdvisoryRequest<'a> {
    pub product: &'a ProductRecord,
    pub score: f64,
    pub rating: Rating,
}

/// External suggestion capability. Implementations make exactly one attempt per call.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn suggest(&self, request: AdvisoryRequest<'_>) -> Result<Vec<String>, AdvisoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AdvisoryError {
    #[error("advisory provider disabled")]
    Disabled,
    #[error("advisory transport failed: {0}")]
    Transport(String),
    #[error("advisory provider returned status {status}")]
    Status { status: u16 },
    #[error("malformed advisory response: {0}")]
    Malformed(String),
    #[error("advisory provider timed out after {0:?}")]
    Timeout(Duration),
}

/// Provider used when no external service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledProvider;

#[async_trait]
impl SuggestionProvider for DisabledProvider {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn suggest(&self, _request: AdvisoryRequest<'_>) -> Result<Vec<String>, AdvisoryError> {
        Err(AdvisoryError::Disabled)
    }
}

#[async_trait]
impl<P> SuggestionProvider for Arc<P>
where
    P: SuggestionProvider + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn suggest(&self, request: AdvisoryRequest<'_>) -> Result<Vec<String>, AdvisoryError> {
        (**self).suggest(request).await
    }
}

/// Builds the provider described by configuration; a missing key or disabled flag yields `None`.
pub fn provider_from_config(config: &AdvisoryConfig) -> Option<GeminiProvider> {
    if !config.enabled {
        return None;
    }
    let api_key = config.api_key.clone()?;
    Some(GeminiProvider::new(
        api_key,
        config.model.clone(),
        config.endpoint.clone(),
        config.timeout,
    ))
}

/// Consults the provider once within `timeout`, falling back to the scorer's rule set.
pub struct Advisor<P> {
    provider: P,
    scorer: Arc<Scorer>,
    timeout: Duration,
}

impl<P> Advisor<P>
where
    P: SuggestionProvider,
{
    pub fn new(provider: P, scorer: Arc<Scorer>, timeout: Duration) -> Self {
        Self {
            provider,
            scorer,
            timeout,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Never fails: provider errors are logged and absorbed.
    pub async fn suggestions(
        &self,
        product: &ProductRecord,
        score: f64,
        rating: Rating,
    ) -> Vec<String> {
        let request = AdvisoryRequest {
            product,
            score,
            rating,
        };

        match self.consult(request).await {
            Ok(suggestions) => {
                debug!(
                    provider = self.provider.name(),
                    count = suggestions.len(),
                    "using provider suggestions"
                );
                suggestions
            }
            Err(AdvisoryError::Disabled) => self.scorer.generate_suggestions(product, score),
            Err(err) => {
                warn!(
                    provider = self.provider.name(),
                    error = %err,
                    "advisory provider failed; using rule-based suggestions"
                );
                self.scorer.generate_suggestions(product, score)
            }
        }
    }

    async fn consult(&self, request: AdvisoryRequest<'_>) -> Result<Vec<String>, AdvisoryError> {
        let suggestions = tokio::time::timeout(self.timeout, self.provider.suggest(request))
            .await
            .map_err(|_| AdvisoryError::Timeout(self.timeout))??;
        check_provider_suggestions(suggestions)
    }
}

/// Providers must answer with two or three non-blank strings.
pub(crate) fn check_provider_suggestions(
    suggestions: Vec<String>,
) -> Result<Vec<String>, AdvisoryError> {
    let suggestions: Vec<String> = suggestions
        .into_iter()
        .map(|suggestion| suggestion.trim().to_string())
        .collect();

    if suggestions.iter().any(String::is_empty) {
        return Err(AdvisoryError::Malformed("blank suggestion".to_string()));
    }
    if !(MIN_PROVIDER_SUGGESTIONS..=MAX_PROVIDER_SUGGESTIONS).contains(&suggestions.len()) {
        return Err(AdvisoryError::Malformed(format!(
            "expected {MIN_PROVIDER_SUGGESTIONS}-{MAX_PROVIDER_SUGGESTIONS} suggestions, got {}",
            suggestions.len()
        )));
    }
    Ok(suggestions)
}
