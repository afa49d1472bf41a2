//! Utility to score transactions offline with the same engine the server uses.
//!
//! Reads one JSON object per line from stdin and prints one prediction per line.
//! Uses `fraud_model.json` from the working directory when present.

use std::io::{self, BufRead, Write};
use std::path::Path;

use fraud_score_api::features::FeatureRecord;
use fraud_score_api::predictor::{self, MODEL_ARTIFACT_PATH};
use fraud_score_api::scoring::ScoringEngine;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let engine = ScoringEngine::new(predictor::load(Path::new(MODEL_ARTIFACT_PATH)));
    tracing::info!(
        "Scoring stdin with {}",
        if engine.has_model() { "loaded model" } else { "fallback heuristic" }
    );

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    let mut scored = 0usize;

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Line {} is not JSON, scoring as empty record: {}", scored + 1, e);
                serde_json::Value::Null
            }
        };

        let result = engine.score(&FeatureRecord::from_value(value));
        writeln!(out, "{}", serde_json::to_string(&result)?)?;
        scored += 1;
    }

    tracing::info!("Scored {} record(s)", scored);
    Ok(())
}
