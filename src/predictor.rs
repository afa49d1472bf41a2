//! Optional fraud model loaded from a JSON artifact at startup.
//!
//! The artifact declares which capability the model has, and that is resolved
//! once into [`LoadedPredictor`]. Nothing here is reloaded at runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

/// Default artifact location, relative to the working directory.
pub const MODEL_ARTIFACT_PATH: &str = "fraud_model.json";

/// On-disk model description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// Logistic regression: yields class probabilities.
    Logistic {
        #[serde(default)]
        name: Option<String>,
        weights: Vec<f64>,
        #[serde(default)]
        intercept: f64,
    },
    /// Plain linear regressor: yields a raw score only.
    Linear {
        #[serde(default)]
        name: Option<String>,
        weights: Vec<f64>,
        #[serde(default)]
        intercept: f64,
    },
}

/// Failure while invoking a loaded model.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictError {
    /// The feature vector does not match the model's weights.
    DimensionMismatch { expected: usize, actual: usize },
    /// The model produced NaN or infinity.
    NonFinite(f64),
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictError::DimensionMismatch { expected, actual } => write!(
                f,
                "model expects {} features, got {}",
                expected, actual
            ),
            PredictError::NonFinite(v) => write!(f, "model produced a non-finite value: {}", v),
        }
    }
}

impl std::error::Error for PredictError {}

/// Models that can report class probabilities.
pub trait ProbabilityModel: Send + Sync {
    /// Probabilities for `[legitimate, fraud]`.
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], PredictError>;
}

/// Models that only produce a raw label/score.
pub trait LabelModel: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError>;
}

/// Weighted sum over a feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    fn decision(&self, features: &[f64]) -> Result<f64, PredictError> {
        if features.len() != self.weights.len() {
            return Err(PredictError::DimensionMismatch {
                expected: self.weights.len(),
                actual: features.len(),
            });
        }
        let z = self
            .weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        if z.is_finite() {
            Ok(z)
        } else {
            Err(PredictError::NonFinite(z))
        }
    }
}

impl LabelModel for LinearModel {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        self.decision(features)
    }
}

/// Logistic regression on top of [`LinearModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel(pub LinearModel);

impl ProbabilityModel for LogisticModel {
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], PredictError> {
        let z = self.0.decision(features)?;
        let p = 1.0 / (1.0 + (-z).exp());
        Ok([1.0 - p, p])
    }
}

/// What a loaded model can do, resolved once at load time.
pub enum Capability {
    ProbabilityCapable(Box<dyn ProbabilityModel>),
    LabelOnly(Box<dyn LabelModel>),
}

impl Capability {
    pub fn kind(&self) -> &'static str {
        match self {
            Capability::ProbabilityCapable(_) => "probability",
            Capability::LabelOnly(_) => "label",
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability::{}", self.kind())
    }
}

/// A model ready for scoring, plus metadata for the health endpoint.
#[derive(Debug)]
pub struct LoadedPredictor {
    pub capability: Capability,
    pub name: Option<String>,
    /// SHA-256 of the artifact bytes, hex encoded.
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedPredictor {
    /// Resolves an artifact into its capability.
    pub fn from_artifact(artifact: ModelArtifact, fingerprint: String) -> Self {
        let (capability, name) = match artifact {
            ModelArtifact::Logistic {
                name,
                weights,
                intercept,
            } => (
                Capability::ProbabilityCapable(Box::new(LogisticModel(LinearModel {
                    weights,
                    intercept,
                }))),
                name,
            ),
            ModelArtifact::Linear {
                name,
                weights,
                intercept,
            } => (
                Capability::LabelOnly(Box::new(LinearModel { weights, intercept })),
                name,
            ),
        };

        Self {
            capability,
            name,
            fingerprint,
            loaded_at: Utc::now(),
        }
    }

    /// Parses artifact bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes)?;
        Ok(Self::from_artifact(artifact, fingerprint(bytes)))
    }

    /// Fraud probability for one feature vector.
    ///
    /// Probability models report the positive class; label-only models have
    /// their raw output clamped to [0,1].
    pub fn fraud_probability(&self, features: &[f64]) -> Result<f64, PredictError> {
        let p = match &self.capability {
            Capability::ProbabilityCapable(model) => model.predict_proba(features)?[1],
            Capability::LabelOnly(model) => model.predict(features)?.clamp(0.0, 1.0),
        };
        if p.is_finite() {
            Ok(p)
        } else {
            Err(PredictError::NonFinite(p))
        }
    }
}

/// Hex SHA-256 of the artifact bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Attempts to load the model artifact at `path`.
///
/// A missing file or any read/parse failure leaves the service in fallback
/// mode; neither is an error for the caller.
pub fn load(path: &Path) -> Option<LoadedPredictor> {
    if !path.exists() {
        tracing::info!(
            "{} not found. Using fallback scoring.",
            path.display()
        );
        return None;
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Model load failed ({}): {}", path.display(), e);
            return None;
        }
    };

    match LoadedPredictor::from_bytes(&bytes) {
        Ok(predictor) => {
            tracing::info!(
                "{} loaded (kind: {}, name: {}, sha256: {})",
                path.display(),
                predictor.capability.kind(),
                predictor.name.as_deref().unwrap_or("unnamed"),
                predictor.fingerprint
            );
            Some(predictor)
        }
        Err(e) => {
            tracing::warn!("Model load failed ({}): {}", path.display(), e);
            None
        }
    }
}
