use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============ Scoring ============

/// Outcome label of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Fraud,
    Legitimate,
    /// Scoring failed; probability is reported as 0.0.
    Error,
}

/// Response body of `POST /api/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: Verdict,
    /// Clamped to [0,1] and rounded to 4 decimals.
    pub probability: f64,
}

impl PredictionResult {
    /// Builds a result from a raw probability, clamping and rounding it.
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        let probability = round4(probability.clamp(0.0, 1.0));
        let prediction = if probability >= threshold {
            Verdict::Fraud
        } else {
            Verdict::Legitimate
        };
        Self {
            prediction,
            probability,
        }
    }

    pub fn error() -> Self {
        Self {
            prediction: Verdict::Error,
            probability: 0.0,
        }
    }
}

/// Rounds to 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

// ============ Snapshot ============

/// Client-held state pushed to `POST /api/save_snapshot`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    #[serde(default)]
    pub users: Vec<Value>,
    #[serde(default)]
    pub predictions: Vec<Value>,
}

impl SnapshotPayload {
    /// Parses a request body leniently.
    ///
    /// The body is first read as text and parsed strictly. If that fails the raw
    /// bytes are parsed again ignoring encoding noise (BOM, NUL padding, stray
    /// whitespace), which is how background beacons sometimes arrive. If both
    /// fail the payload is empty. Only a well-formed body of the wrong shape is
    /// an error.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        let value = parse_lenient(body);
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, AppError> {
        let mut object = match value {
            Value::Object(object) => object,
            Value::Null => Map::new(),
            other => {
                return Err(AppError::InvalidSnapshot(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(Self {
            users: take_array(&mut object, "users")?,
            predictions: take_array(&mut object, "predictions")?,
        })
    }
}

fn take_array(object: &mut Map<String, Value>, key: &str) -> Result<Vec<Value>, AppError> {
    match object.remove(key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(AppError::InvalidSnapshot(format!(
            "'{}' must be an array, got {}",
            key,
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Two-stage lenient JSON parse that never fails.
pub fn parse_lenient(body: &[u8]) -> Value {
    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        return Value::Object(Map::new());
    }
    if let Ok(value) = serde_json::from_str::<Value>(&text) {
        return value;
    }

    let trimmed = strip_noise(body);
    match serde_json::from_slice::<Value>(trimmed) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Unparseable body ({} bytes), using empty object: {}", body.len(), e);
            Value::Object(Map::new())
        }
    }
}

fn strip_noise(body: &[u8]) -> &[u8] {
    let body = body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body);
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace() && *b != 0)
        .unwrap_or(body.len());
    let end = body
        .iter()
        .rposition(|b| !b.is_ascii_whitespace() && *b != 0)
        .map_or(start, |i| i + 1);
    &body[start..end]
}

/// Response body of a successful `POST /api/save_snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSnapshotResponse {
    pub ok: bool,
    pub users: usize,
    pub predictions: usize,
}

/// Response body of a failed `POST /api/save_snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSnapshotFailure {
    pub ok: bool,
    pub error: String,
}

/// Absolute locations of the two snapshot documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPaths {
    pub users: String,
    pub predictions: String,
}

/// Response body of `GET /api/debug_files`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotCounts {
    pub users_count: usize,
    pub predictions_count: usize,
    pub paths: SnapshotPaths,
}

// ============ Health ============

/// Model section of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub kind: Option<String>,
    pub name: Option<String>,
    pub fingerprint: Option<String>,
    pub loaded_at: Option<chrono::DateTime<chrono::Utc>>,
}
