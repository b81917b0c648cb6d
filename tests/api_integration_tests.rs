// API Integration Tests
//
// Purpose: Test all API endpoints against an in-process engine context
// Run with: cargo test --features api --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use crop_suitability::{create_router, AppState, EngineConfig, EngineContext};
    use serde_json::Value;
    use tower::ServiceExt; // for oneshot

    // Helper: Create test app
    fn create_test_app() -> axum::Router {
        let context = EngineContext::initialized(EngineConfig::default()).expect("default config is valid");
        create_router(AppState::new(context))
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    // =========================================================================
    // Section 1: Health Check and System
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let response = create_test_app().oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_system_status_ready() {
        let response = create_test_app().oneshot(get("/api/system/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["system"]["status"], "Ready");
        assert_eq!(body["system"]["initialized"], true);
    }

    #[tokio::test]
    async fn test_analysis_run_clears_cache() {
        let app = create_test_app();

        let _ = app.clone().oneshot(get("/api/system/status")).await.unwrap();
        let response = app
            .clone()
            .oneshot(post_json("/api/analysis/run", Value::Null))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["run"]["runId"], 1);
        assert_eq!(body["run"]["clearedEntries"], 1);
    }

    #[tokio::test]
    async fn test_list_crops() {
        let response = create_test_app().oneshot(get("/api/crops")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["crops"]["rice"]["water"], 0.4);
        assert!(body["crops"]["sweet_potato"].is_object());
    }

    // =========================================================================
    // Section 2: Suitability Evaluation
    // =========================================================================

    #[tokio::test]
    async fn test_evaluate_single_factor() {
        let request = post_json(
            "/api/suitability/evaluate",
            serde_json::json!({
                "factors": [
                    {"name": "temperature", "weight": 1.0, "min": 15.0, "max": 35.0, "currentValue": 22.5}
                ]
            }),
        );
        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["evaluation"]["overallScore"], 95.0);
        assert_eq!(body["evaluation"]["suitabilityLevel"], "MostSuitable");
    }

    #[tokio::test]
    async fn test_evaluate_empty_factors_is_bad_request() {
        let request = post_json("/api/suitability/evaluate", serde_json::json!({"factors": []}));
        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_response(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "invalid_input");
        assert_eq!(body["message"], "Invalid input");
    }

    #[tokio::test]
    async fn test_evaluate_inverted_range_is_configuration_error() {
        let request = post_json(
            "/api/suitability/evaluate",
            serde_json::json!({
                "factors": [{"name": "ph", "weight": 1.0, "min": 7.0, "max": 5.5, "currentValue": 6.5}]
            }),
        );
        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_response(response).await;
        assert_eq!(body["error"], "configuration");
        assert_eq!(body["message"], "Invalid configuration");
    }

    #[tokio::test]
    async fn test_evaluate_malformed_body_is_bad_request() {
        let request = post_json("/api/suitability/evaluate", serde_json::json!({"factors": "lots"}));
        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // =========================================================================
    // Section 3: Zoning
    // =========================================================================

    #[tokio::test]
    async fn test_generate_zoning() {
        let request = post_json(
            "/api/zoning/generate",
            serde_json::json!({
                "cropType": "rice",
                "units": [
                    {"name": "Changsha", "subScores": {"temp": 60.0, "water": 50.0, "soil": 55.0}},
                    {"name": "Zhuzhou", "subScores": {"temp": 90.0, "water": 85.0, "soil": 88.0}}
                ]
            }),
        );
        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        let zoning = &body["zoning"];
        assert_eq!(zoning["cropType"], "rice");
        assert_eq!(zoning["precision"], "county");
        assert_eq!(zoning["spatialData"][0]["level"], "MarginallySuitable");
        assert_eq!(zoning["zones"]["MostSuitable"][0], "Zhuzhou");
        assert_eq!(zoning["statistics"]["MarginallySuitable"]["percentage"], 50.0);
        assert_eq!(zoning["statistics"]["MarginallySuitable"]["area"], 105_900.0);
    }

    #[tokio::test]
    async fn test_generate_zoning_missing_sub_score_is_bad_request() {
        let request = post_json(
            "/api/zoning/generate",
            serde_json::json!({
                "cropType": "rice",
                "units": [{"name": "Changsha", "subScores": {"temp": 60.0, "soil": 55.0}}]
            }),
        );
        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_response(response).await;
        assert_eq!(body["error"], "invalid_input");
    }

    #[tokio::test]
    async fn test_generate_zoning_empty_units_is_bad_request() {
        let request = post_json("/api/zoning/generate", serde_json::json!({"cropType": "tea", "units": []}));
        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_measured_zoning() {
        let request = post_json(
            "/api/zoning/measured",
            serde_json::json!({
                "cropType": "rice",
                "precision": "city",
                "requirements": {
                    "temperature": {"min": 15.0, "max": 35.0},
                    "precipitation": {"min": 1000.0, "max": 2000.0},
                    "ph": {"min": 5.5, "max": 7.5},
                    "organicMatter": {"min": 2.0, "max": 5.0}
                },
                "units": [{
                    "name": "Xiangtan",
                    "meanTemperature": 25.0,
                    "annualPrecipitation": 1500.0,
                    "soilPh": 6.5,
                    "organicMatter": 3.5
                }]
            }),
        );
        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["zoning"]["precision"], "city");
        assert_eq!(body["zoning"]["spatialData"][0]["level"], "MostSuitable");
    }
}
