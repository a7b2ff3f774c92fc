//! End-to-end scenarios for the scoring workflow, exercised through the public service facade
//! and the HTTP router.

mod common {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use ecoscore::advisory::{AdvisoryError, AdvisoryRequest, DisabledProvider, SuggestionProvider};
    use ecoscore::ledger::InMemoryLedger;
    use ecoscore::scoring::ScoringProfile;
    use ecoscore::ScoringService;
    use serde_json::{json, Value};

    pub(super) type Service = ScoringService<InMemoryLedger, DisabledProvider>;

    pub(super) fn build_service() -> (Arc<Service>, Arc<InMemoryLedger>) {
        let ledger = Arc::new(InMemoryLedger::new());
        let service = Arc::new(ScoringService::new(
            ledger.clone(),
            DisabledProvider,
            ScoringProfile::default(),
            Duration::from_millis(200),
        ));
        (service, ledger)
    }

    /// Stands in for an unreachable generative provider.
    pub(super) struct UnreachableProvider;

    #[async_trait]
    impl SuggestionProvider for UnreachableProvider {
        fn name(&self) -> &'static str {
            "unreachable"
        }

        async fn suggest(
            &self,
            _request: AdvisoryRequest<'_>,
        ) -> Result<Vec<String>, AdvisoryError> {
            Err(AdvisoryError::Transport("connection refused".to_string()))
        }
    }

    pub(super) fn scenario_a() -> Value {
        json!({
            "product_name": "Reusable Bottle",
            "materials": ["aluminum", "plastic"],
            "weight_grams": 300,
            "transport": "ship",
            "packaging": "recyclable",
            "gwp": 5.0,
            "cost": 10.0,
            "circularity": 80.0
        })
    }

    pub(super) fn scenario_b() -> Value {
        json!({
            "product_name": "High Impact Product",
            "materials": ["plastic", "steel"],
            "weight_grams": 1000,
            "transport": "air",
            "packaging": "non-recyclable",
            "gwp": 15.0,
            "cost": 5.0,
            "circularity": 20.0
        })
    }
}

mod scoring {
    use super::common::*;
    use ecoscore::intake::ScoreRequest;
    use ecoscore::scoring::suggestions::{
        AIR_TRANSPORT_SUGGESTION, HIGH_GWP_SUGGESTION, PACKAGING_SUGGESTION,
    };
    use ecoscore::scoring::{Rating, ScoringProfile};
    use ecoscore::{ScoreResponse, ScoringService};
    use std::sync::Arc;
    use std::time::Duration;

    fn request(value: serde_json::Value) -> ScoreRequest {
        serde_json::from_value(value).expect("request parses")
    }

    #[tokio::test]
    async fn scenario_a_rates_b() {
        let (service, _) = build_service();
        let submission = service
            .submit(request(scenario_a()))
            .await
            .expect("scenario A scores");
        let response = ScoreResponse::from(&submission);
        assert_eq!(response.sustainability_score, 69.2);
        assert_eq!(response.rating, Rating::B);
    }

    #[tokio::test]
    async fn scenario_b_clamps_to_zero_and_rates_d() {
        let (service, _) = build_service();
        let submission = service
            .submit(request(scenario_b()))
            .await
            .expect("scenario B scores");
        assert_eq!(submission.score, 0.0);
        assert_eq!(submission.rating, Rating::D);
    }

    #[tokio::test]
    async fn unreachable_provider_falls_back_to_rule_order() {
        let service = ScoringService::new(
            Arc::new(ecoscore::ledger::InMemoryLedger::new()),
            UnreachableProvider,
            ScoringProfile::default(),
            Duration::from_millis(200),
        );
        let submission = service
            .submit(request(scenario_b()))
            .await
            .expect("fallback never fails");

        let suggestions = &submission.suggestions;
        assert!(suggestions.len() <= 4);
        let position = |needle: &str| {
            suggestions
                .iter()
                .position(|suggestion| suggestion == needle)
                .unwrap_or_else(|| panic!("missing suggestion {needle:?} in {suggestions:?}"))
        };
        let gwp = position(HIGH_GWP_SUGGESTION);
        let air = position(AIR_TRANSPORT_SUGGESTION);
        let packaging = position(PACKAGING_SUGGESTION);
        assert!(gwp < air && air < packaging);
    }
}

mod http {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use ecoscore::ledger::Ledger;
    use ecoscore::scoring_router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("router dispatch");
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload = serde_json::from_slice(&body).expect("json");
        (status, payload)
    }

    fn post_score(body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/score")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn score_response_has_exactly_the_public_keys() {
        let (service, _) = build_service();
        let router = scoring_router(service);

        let (status, payload) = send(&router, post_score(&scenario_a())).await;
        assert_eq!(status, StatusCode::OK);

        let object = payload.as_object().expect("object response");
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["product_name", "rating", "suggestions", "sustainability_score"]
        );
        assert_eq!(payload["product_name"], "Reusable Bottle");
        assert_eq!(payload["sustainability_score"], 69.2);
        assert_eq!(payload["rating"], "B");
        assert!(payload["suggestions"].is_array());
    }

    #[tokio::test]
    async fn missing_fields_are_reported_per_field() {
        let (service, ledger) = build_service();
        let router = scoring_router(service);

        let mut body = scenario_a();
        body.as_object_mut()
            .expect("object")
            .remove("product_name");
        let (status, payload) = send(&router, post_score(&body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"], "Validation failed");
        assert_eq!(
            payload["details"]["product_name"],
            json!(["Missing data for required field."])
        );
        assert!(ledger.all().expect("read").is_empty());
    }

    #[tokio::test]
    async fn custom_weights_change_the_score() {
        let (service, _) = build_service();
        let router = scoring_router(service);

        let mut body = scenario_a();
        body["weights"] = json!({
            "gwp_weight": 0.2,
            "circularity_weight": 0.6,
            "cost_weight": 0.2
        });
        let (status, payload) = send(&router, post_score(&body)).await;

        // 90 * 0.2 + 104 * 0.6 + 90 * 0.2 - 25 penalties
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["sustainability_score"], 73.4);
        assert_eq!(payload["rating"], "B");
    }

    #[tokio::test]
    async fn weights_that_do_not_sum_to_one_are_rejected() {
        let (service, ledger) = build_service();
        let router = scoring_router(service);

        let mut body = scenario_a();
        body["weights"] = json!({ "gwp_weight": 0.9 });
        let (status, payload) = send(&router, post_score(&body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["details"]["weights"], json!(["Weights must sum to 1.0"]));
        assert!(ledger.all().expect("read").is_empty());
    }

    #[tokio::test]
    async fn history_returns_recent_window_oldest_first() {
        let (service, _) = build_service();
        let router = scoring_router(service);

        for index in 0..12 {
            let mut body = scenario_a();
            body["product_name"] = json!(format!("Bottle {index}"));
            let (status, _) = send(&router, post_score(&body)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, payload) = send(&router, get("/history")).await;
        assert_eq!(status, StatusCode::OK);
        let entries = payload.as_array().expect("array");
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0]["id"], 3);
        assert_eq!(entries[0]["product_name"], "Bottle 2");
        assert_eq!(entries[9]["id"], 12);
        assert_eq!(entries[9]["sustainability_score"].as_f64().map(f64::round), Some(69.0));

        let (_, payload) = send(&router, get("/history?limit=3")).await;
        let ids: Vec<i64> = payload
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|entry| entry["id"].as_i64())
            .collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[tokio::test]
    async fn summary_starts_empty_and_tracks_submissions() {
        let (service, _) = build_service();
        let router = scoring_router(service);

        let (status, payload) = send(&router, get("/score-summary")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            payload,
            json!({ "total_products": 0, "average_score": 0.0, "ratings": {}, "top_issues": [] })
        );

        send(&router, post_score(&scenario_a())).await;
        send(&router, post_score(&scenario_b())).await;

        let (_, payload) = send(&router, get("/score-summary")).await;
        assert_eq!(payload["total_products"], 2);
        assert_eq!(payload["average_score"], 34.6);
        assert_eq!(payload["ratings"], json!({ "B": 1, "D": 1 }));
        assert_eq!(
            payload["top_issues"],
            json!([
                "Plastic/Styrofoam used",
                "Air transport",
                "Non-recyclable packaging",
                "High GWP materials",
                "Low circularity"
            ])
        );
    }
}
