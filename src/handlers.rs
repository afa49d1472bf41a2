use crate::config::Config;
use crate::errors::AppError;
use crate::features::FeatureRecord;
use crate::models::*;
use crate::scoring::ScoringEngine;
use crate::snapshot_store::SnapshotStore;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Scoring configuration, fixed at startup.
    pub engine: ScoringEngine,
    /// Snapshot documents under `<base>/data`.
    pub store: SnapshotStore,
}

impl AppState {
    pub fn new(config: Config, engine: ScoringEngine) -> Self {
        let store = SnapshotStore::new(config.data_dir());
        Self {
            config,
            engine,
            store,
        }
    }
}

/// Health check endpoint.
///
/// Returns the service status, version, and whether a model is loaded.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "model": state.engine.model_status(),
        })),
    )
}

/// POST /api/predict
///
/// Scores the JSON object in the body. A body that is not a JSON object is
/// scored as an empty record; this endpoint always answers 200.
pub async fn predict(State(state): State<Arc<AppState>>, body: Bytes) -> Json<PredictionResult> {
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap_or_else(|e| {
        tracing::debug!("Unparseable predict body, scoring empty record: {}", e);
        serde_json::Value::Null
    });
    let record = FeatureRecord::from_value(value);

    let result = state.engine.score(&record);
    tracing::debug!(
        "POST /api/predict - {} fields -> {:?} ({})",
        record.len(),
        result.prediction,
        result.probability
    );

    Json(result)
}

/// POST /api/save_snapshot
///
/// Replaces the stored users and predictions with the ones in the body. Accepts
/// both regular `fetch` JSON posts and beacon deliveries without a usable
/// content type.
pub async fn save_snapshot(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match persist_snapshot(&state.store, &body).await {
        Ok((users, predictions)) => Json(SaveSnapshotResponse {
            ok: true,
            users,
            predictions,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("save_snapshot error: {}", e);
            (
                e.status_code(),
                Json(SaveSnapshotFailure {
                    ok: false,
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn persist_snapshot(store: &SnapshotStore, body: &[u8]) -> Result<(usize, usize), AppError> {
    let payload = SnapshotPayload::from_body(body)?;
    store.ensure().await?;
    store.save(&payload.users, &payload.predictions).await
}

/// GET /api/debug_files
///
/// Reports how many records each snapshot document holds and where it lives.
pub async fn debug_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SnapshotCounts>, AppError> {
    state.store.ensure().await?;
    let counts = state.store.read_counts().await?;
    Ok(Json(counts))
}

/// Serves `templates/<page>.html` from the base directory.
async fn render_page(state: &AppState, page: &str) -> Response {
    let path = state.config.templates_dir().join(format!("{}.html", page));
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => Html(content).into_response(),
        Err(e) => {
            tracing::warn!("Page {} unavailable ({}): {}", page, path.display(), e);
            (StatusCode::NOT_FOUND, "Page not found").into_response()
        }
    }
}

pub async fn home(State(state): State<Arc<AppState>>) -> Response {
    render_page(&state, "index").await
}

pub async fn about(State(state): State<Arc<AppState>>) -> Response {
    render_page(&state, "about").await
}

pub async fn contact(State(state): State<Arc<AppState>>) -> Response {
    render_page(&state, "contact").await
}

pub async fn login_page(State(state): State<Arc<AppState>>) -> Response {
    render_page(&state, "login").await
}

pub async fn register_page(State(state): State<Arc<AppState>>) -> Response {
    render_page(&state, "register").await
}

pub async fn user_dashboard(State(state): State<Arc<AppState>>) -> Response {
    render_page(&state, "user_dashboard").await
}

pub async fn admin_dashboard(State(state): State<Arc<AppState>>) -> Response {
    render_page(&state, "admin_dashboard").await
}
