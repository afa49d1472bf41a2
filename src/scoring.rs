//! Fraud scoring: model-backed when a predictor is loaded, heuristic otherwise.

use crate::features::{FeatureRecord, NotNumeric, FEATURE_NAMES};
use crate::models::{ModelStatus, PredictionResult};
use crate::predictor::LoadedPredictor;
use rand::Rng;
use std::sync::Arc;

/// Fraud cut-off for the heuristic fallback.
pub const FALLBACK_FRAUD_THRESHOLD: f64 = 0.6;
/// Fraud cut-off for model output. Differs from the fallback cut-off.
pub const MODEL_FRAUD_THRESHOLD: f64 = 0.5;

/// Amount contribution is capped at this value.
const AMOUNT_RISK_CAP: f64 = 0.7;
const AMOUNT_SCALE: f64 = 1000.0;
const SIGNAL_WEIGHT: f64 = 0.3;
const SIGNAL_DEFAULT: f64 = 0.5;
/// Half-width of the uniform jitter added to the fallback score.
pub const JITTER_BOUND: f64 = 0.05;

/// Behavioral signals averaged by the fallback formula.
const FALLBACK_SIGNALS: [&str; 4] = [
    "fraud_suspect_score",
    "unusual_activity_score",
    "device_risk_score",
    "transaction_amount_pattern",
];

/// Immutable scoring configuration shared by all requests.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    features: &'static [&'static str],
    predictor: Option<Arc<LoadedPredictor>>,
}

impl ScoringEngine {
    pub fn new(predictor: Option<LoadedPredictor>) -> Self {
        Self {
            features: &FEATURE_NAMES,
            predictor: predictor.map(Arc::new),
        }
    }

    /// Engine that always uses the heuristic.
    pub fn fallback_only() -> Self {
        Self::new(None)
    }

    pub fn has_model(&self) -> bool {
        self.predictor.is_some()
    }

    pub fn features(&self) -> &[&'static str] {
        self.features
    }

    /// Scores a record with the thread-local RNG for jitter.
    pub fn score(&self, record: &FeatureRecord) -> PredictionResult {
        self.score_with_rng(record, &mut rand::thread_rng())
    }

    /// Scores a record, drawing fallback jitter from `rng`.
    ///
    /// A model failure only affects this call: it falls back to the heuristic.
    pub fn score_with_rng<R: Rng>(
        &self,
        record: &FeatureRecord,
        rng: &mut R,
    ) -> PredictionResult {
        let Some(predictor) = &self.predictor else {
            return fallback_score(record, rng);
        };

        let vector = record.to_vector(self.features);
        match predictor.fraud_probability(&vector) {
            Ok(probability) => {
                PredictionResult::from_probability(probability, MODEL_FRAUD_THRESHOLD)
            }
            Err(e) => {
                tracing::warn!("Model predict failed: {}", e);
                fallback_score(record, rng)
            }
        }
    }

    pub fn model_status(&self) -> ModelStatus {
        match &self.predictor {
            Some(p) => ModelStatus {
                loaded: true,
                kind: Some(p.capability.kind().to_string()),
                name: p.name.clone(),
                fingerprint: Some(p.fingerprint.clone()),
                loaded_at: Some(p.loaded_at),
            },
            None => ModelStatus {
                loaded: false,
                kind: None,
                name: None,
                fingerprint: None,
                loaded_at: None,
            },
        }
    }
}

/// Heuristic score used when no model is available.
///
/// Returns the `Error` result when a field is not numeric or the arithmetic
/// does not produce a finite probability.
pub fn fallback_score<R: Rng>(record: &FeatureRecord, rng: &mut R) -> PredictionResult {
    let jitter = rng.gen_range(-JITTER_BOUND..=JITTER_BOUND);
    match fallback_base_risk(record) {
        Ok(risk) if (risk + jitter).is_finite() => {
            PredictionResult::from_probability(risk + jitter, FALLBACK_FRAUD_THRESHOLD)
        }
        Ok(risk) => {
            tracing::debug!("Fallback risk is not finite: {}", risk);
            PredictionResult::error()
        }
        Err(e) => {
            tracing::debug!("Fallback scoring failed: {}", e);
            PredictionResult::error()
        }
    }
}

/// Fallback risk before jitter and clamping.
///
/// NaN and infinite inputs are rejected before capping.
pub fn fallback_base_risk(record: &FeatureRecord) -> Result<f64, NotNumeric> {
    let amount = finite_number_or(record, "Amount", 0.0)?;
    let amount_risk = (amount / AMOUNT_SCALE).min(AMOUNT_RISK_CAP);

    let mut signal_sum = 0.0;
    for name in FALLBACK_SIGNALS {
        signal_sum += finite_number_or(record, name, SIGNAL_DEFAULT)?;
    }
    let adjustment = signal_sum / FALLBACK_SIGNALS.len() as f64 * SIGNAL_WEIGHT;

    Ok(amount_risk + adjustment)
}

fn finite_number_or(record: &FeatureRecord, name: &str, default: f64) -> Result<f64, NotNumeric> {
    let value = record.number_or(name, default)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NotNumeric {
            field: name.to_string(),
            value: record.get(name).cloned().unwrap_or(serde_json::Value::Null),
        })
    }
}
