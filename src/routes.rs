use crate::handlers::{self, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer,
};

/// Maximum accepted request body (5MB).
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Builds the application router with its middleware stack.
pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(state.config.static_dir());

    let pages = Router::new()
        .route("/", get(handlers::home))
        .route("/about", get(handlers::about))
        .route("/contact", get(handlers::contact))
        .route("/login", get(handlers::login_page))
        .route("/register", get(handlers::register_page))
        .route("/dashboard", get(handlers::user_dashboard))
        .route("/admin", get(handlers::admin_dashboard))
        .nest_service("/static", static_files);

    let api = Router::new()
        .route("/api/predict", post(handlers::predict))
        .route("/api/save_snapshot", post(handlers::save_snapshot))
        .route("/api/debug_files", get(handlers::debug_files))
        .layer(
            ServiceBuilder::new()
                // The beacon client posts the whole snapshot at once
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .merge(pages)
        .merge(api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
