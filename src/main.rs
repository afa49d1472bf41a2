use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fraud_score_api::config::Config;
use fraud_score_api::handlers::AppState;
use fraud_score_api::scoring::ScoringEngine;
use fraud_score_api::{predictor, routes};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The optional fraud model (fallback scoring when absent).
/// - The snapshot data directory.
/// - HTTP routes and middleware.
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fraud_score_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Load the model once; any failure keeps fallback scoring for the process lifetime
    let engine = ScoringEngine::new(predictor::load(&config.model_path));
    if !engine.has_model() {
        tracing::info!("Scoring with fallback heuristic");
    }

    let app_state = Arc::new(AppState::new(config.clone(), engine));

    // Make sure the snapshot documents exist before the first request
    if let Err(e) = app_state.store.ensure().await {
        tracing::error!("Failed to prepare snapshot store: {}", e);
    } else {
        tracing::info!(
            "Snapshot store ready at {}",
            app_state.store.data_dir().display()
        );
    }

    let app = routes::router(app_state);

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
