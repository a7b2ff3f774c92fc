use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::advisory::SuggestionProvider;
use crate::intake::ScoreRequest;
use crate::ledger::{Ledger, DEFAULT_HISTORY_LIMIT};
use crate::service::{ScoreResponse, ScoringService, ScoringServiceError};

/// Router builder exposing scoring, history, and summary endpoints.
pub fn scoring_router<L, P>(service: Arc<ScoringService<L, P>>) -> Router
where
    L: Ledger + 'static,
    P: SuggestionProvider + 'static,
{
    Router::new()
        .route("/score", post(score_handler::<L, P>))
        .route("/history", get(history_handler::<L, P>))
        .route("/score-summary", get(summary_handler::<L, P>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HistoryParams {
    limit: Option<usize>,
}

pub(crate) async fn score_handler<L, P>(
    State(service): State<Arc<ScoringService<L, P>>>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Response
where
    L: Ledger + 'static,
    P: SuggestionProvider + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            let payload = json!({
                "error": "Invalid JSON payload",
                "details": rejection.body_text(),
            });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match service.submit(request).await {
        Ok(submission) => {
            (StatusCode::OK, Json(ScoreResponse::from(&submission))).into_response()
        }
        Err(err) => error_response(err, "Internal server error"),
    }
}

pub(crate) async fn history_handler<L, P>(
    State(service): State<Arc<ScoringService<L, P>>>,
    Query(params): Query<HistoryParams>,
) -> Response
where
    L: Ledger + 'static,
    P: SuggestionProvider + 'static,
{
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    match service.history(limit) {
        Ok(submissions) => (StatusCode::OK, Json(submissions)).into_response(),
        Err(err) => error_response(err, "Failed to retrieve history"),
    }
}

pub(crate) async fn summary_handler<L, P>(
    State(service): State<Arc<ScoringService<L, P>>>,
) -> Response
where
    L: Ledger + 'static,
    P: SuggestionProvider + 'static,
{
    match service.summary() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => error_response(err, "Failed to retrieve summary"),
    }
}

fn error_response(err: ScoringServiceError, internal_message: &'static str) -> Response {
    match err {
        ScoringServiceError::Validation(errors) => {
            let payload = json!({
                "error": "Validation failed",
                "details": errors,
            });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        other => {
            error!(error = %other, "request failed");
            let payload = json!({ "error": internal_message });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
