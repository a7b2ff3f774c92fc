use ecoscore::advisory::{provider_from_config, DisabledProvider, SuggestionProvider};
use ecoscore::config::AdvisoryConfig;
use ecoscore::ledger::InMemoryLedger;
use ecoscore::scoring::ScoringProfile;
use ecoscore::ScoringService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type SharedProvider = Arc<dyn SuggestionProvider>;
pub(crate) type ApiScoringService = ScoringService<InMemoryLedger, SharedProvider>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Picks the generative provider when configured, otherwise the rule-based path only.
pub(crate) fn build_provider(config: &AdvisoryConfig) -> SharedProvider {
    match provider_from_config(config) {
        Some(provider) => {
            info!(model = %config.model, "advisory provider enabled");
            Arc::new(provider)
        }
        None => {
            info!("advisory provider disabled; using rule-based suggestions");
            Arc::new(DisabledProvider)
        }
    }
}

pub(crate) fn build_service(
    provider: SharedProvider,
    profile: ScoringProfile,
    advisory: &AdvisoryConfig,
) -> Arc<ApiScoringService> {
    // Outer bound sits just above the provider's own request timeout.
    Arc::new(ScoringService::new(
        Arc::new(InMemoryLedger::new()),
        provider,
        profile,
        advisory.timeout + std::time::Duration::from_millis(250),
    ))
}
