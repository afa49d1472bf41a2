/// HTTP-level tests driving the router in-process
/// Covers the predict, snapshot, debug and page routes end to end
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use fraud_score_api::api::routes::{router, MAX_BODY_BYTES};
use fraud_score_api::config::Config;
use fraud_score_api::handlers::AppState;
use fraud_score_api::predictor;
use fraud_score_api::scoring::ScoringEngine;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Helper function to create an app rooted in a fresh temp directory
fn create_test_app(engine: ScoringEngine) -> (TempDir, Arc<AppState>, Router) {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(AppState::new(Config::with_base_dir(dir.path()), engine));
    let app = router(state.clone());
    (dir, state, app)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[cfg(test)]
mod predict_tests {
    use super::*;

    #[tokio::test]
    async fn test_predict_fallback_defaults() {
        let (_dir, _state, app) = create_test_app(ScoringEngine::fallback_only());

        let (status, body) = send(&app, post_json("/api/predict", "{}")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], "Legitimate");
        let p = body["probability"].as_f64().unwrap();
        assert!((0.10..=0.20).contains(&p), "probability {} outside 0.15 +- 0.05", p);
    }

    #[tokio::test]
    async fn test_predict_high_risk_is_fraud() {
        let (_dir, _state, app) = create_test_app(ScoringEngine::fallback_only());
        let payload = json!({
            "Amount": 1000,
            "fraud_suspect_score": 1,
            "unusual_activity_score": 1,
            "device_risk_score": 1,
            "transaction_amount_pattern": 1
        });

        let (status, body) = send(&app, post_json("/api/predict", payload.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], "Fraud");
        assert!(body["probability"].as_f64().unwrap() >= 0.95);
    }

    #[tokio::test]
    async fn test_predict_unparseable_body_scores_empty_record() {
        let (_dir, _state, app) = create_test_app(ScoringEngine::fallback_only());

        let (status, body) = send(&app, post_json("/api/predict", "Amount=5000")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], "Legitimate");

        let (status, body) = send(&app, post_json("/api/predict", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], "Legitimate");
    }

    #[tokio::test]
    async fn test_predict_non_numeric_field_is_error_result() {
        let (_dir, _state, app) = create_test_app(ScoringEngine::fallback_only());

        let (status, body) =
            send(&app, post_json("/api/predict", r#"{"Amount": "unknown"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"prediction": "Error", "probability": 0.0}));
    }

    #[tokio::test]
    async fn test_predict_with_loaded_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fraud_model.json");
        std::fs::write(
            &path,
            json!({"kind": "logistic", "weights": vec![0.0; 30], "intercept": 0.0}).to_string(),
        )
        .unwrap();
        let engine = ScoringEngine::new(predictor::load(&path));
        assert!(engine.has_model());
        let (_dir, _state, app) = create_test_app(engine);

        let (status, body) = send(&app, post_json("/api/predict", r#"{"Amount": 99999}"#)).await;

        // sigmoid(0) = 0.5 meets the model threshold exactly
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"prediction": "Fraud", "probability": 0.5}));
    }
}

#[cfg(test)]
mod body_limit_tests {
    use super::*;

    fn oversized_post(uri: &str) -> Request<Body> {
        let body = vec![b' '; MAX_BODY_BYTES + 1];
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_oversized_predict_body_is_413() {
        let (_dir, _state, app) = create_test_app(ScoringEngine::fallback_only());

        let response = app.clone().oneshot(oversized_post("/api/predict")).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        // Bodies under the limit are still scored
        let (status, _) = send(&app, post_json("/api/predict", "{}")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_oversized_snapshot_body_is_413() {
        let (_dir, state, app) = create_test_app(ScoringEngine::fallback_only());

        let response = app
            .clone()
            .oneshot(oversized_post("/api/save_snapshot"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(!state.store.users_path().exists());
    }
}

#[cfg(test)]
mod snapshot_tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_debug_counts() {
        let (_dir, _state, app) = create_test_app(ScoringEngine::fallback_only());

        let (status, body) = send(
            &app,
            post_json("/api/save_snapshot", r#"{"users":[{"a":1}],"predictions":[]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true, "users": 1, "predictions": 0}));

        let (status, body) = send(&app, get("/api/debug_files")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users_count"], 1);
        assert_eq!(body["predictions_count"], 0);
        assert!(body["paths"]["users"].as_str().unwrap().ends_with("users.json"));
        assert!(body["paths"]["predictions"]
            .as_str()
            .unwrap()
            .ends_with("predictions.json"));
    }

    #[tokio::test]
    async fn test_empty_snapshot_replaces_everything() {
        let (_dir, state, app) = create_test_app(ScoringEngine::fallback_only());

        send(
            &app,
            post_json(
                "/api/save_snapshot",
                r#"{"users":[{"a":1},{"b":2}],"predictions":[{"p":0.7}]}"#,
            ),
        )
        .await;
        let (status, body) = send(&app, post_json("/api/save_snapshot", "{}")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true, "users": 0, "predictions": 0}));
        let raw = std::fs::read_to_string(state.store.users_path()).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&raw).unwrap(), json!([]));
    }

    #[tokio::test]
    async fn test_beacon_body_without_content_type() {
        let (_dir, _state, app) = create_test_app(ScoringEngine::fallback_only());
        let mut body = b"\xEF\xBB\xBF".to_vec();
        body.extend_from_slice(
            r#"{"users":[{"name":"Zoë"}],"predictions":[{"p":1},{"p":2}]}"#.as_bytes(),
        );

        let request = Request::builder()
            .method("POST")
            .uri("/api/save_snapshot")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(body))
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true, "users": 1, "predictions": 2}));
    }

    #[tokio::test]
    async fn test_garbage_body_saves_empty_snapshot() {
        let (_dir, _state, app) = create_test_app(ScoringEngine::fallback_only());

        let (status, body) = send(&app, post_json("/api/save_snapshot", "<<garbage>>")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true, "users": 0, "predictions": 0}));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_500_with_message() {
        let (_dir, _state, app) = create_test_app(ScoringEngine::fallback_only());

        let (status, body) =
            send(&app, post_json("/api/save_snapshot", r#"{"users": 5}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], false);
        assert!(body["error"].as_str().unwrap().contains("users"));
    }

    #[tokio::test]
    async fn test_debug_files_initializes_fresh_store() {
        let (_dir, state, app) = create_test_app(ScoringEngine::fallback_only());
        assert!(!state.store.users_path().exists());

        let (status, body) = send(&app, get("/api/debug_files")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users_count"], 0);
        assert_eq!(body["predictions_count"], 0);
        assert!(state.store.users_path().exists());
        assert!(state.store.predictions_path().exists());
    }

    #[tokio::test]
    async fn test_debug_files_reports_corrupt_document() {
        let (_dir, state, app) = create_test_app(ScoringEngine::fallback_only());
        state.store.ensure().await.unwrap();
        std::fs::write(state.store.users_path(), "not json").unwrap();

        let (status, body) = send(&app, get("/api/debug_files")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("users.json"));
    }
}

#[cfg(test)]
mod page_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_fallback_mode() {
        let (_dir, _state, app) = create_test_app(ScoringEngine::fallback_only());

        let (status, body) = send(&app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"]["loaded"], false);
    }

    #[tokio::test]
    async fn test_page_served_from_templates() {
        let (dir, _state, app) = create_test_app(ScoringEngine::fallback_only());
        std::fs::create_dir_all(dir.path().join("templates")).unwrap();
        std::fs::write(dir.path().join("templates/about.html"), "<h1>About</h1>").unwrap();

        let response = app.clone().oneshot(get("/about")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>About</h1>");
    }

    #[tokio::test]
    async fn test_missing_page_is_404() {
        let (_dir, _state, app) = create_test_app(ScoringEngine::fallback_only());

        let response = app.clone().oneshot(get("/admin")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_assets_served() {
        let (dir, _state, app) = create_test_app(ScoringEngine::fallback_only());
        std::fs::create_dir_all(dir.path().join("static/js")).unwrap();
        std::fs::write(dir.path().join("static/js/main.js"), "console.log(1);").unwrap();

        let response = app.clone().oneshot(get("/static/js/main.js")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
