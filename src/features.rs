//! Transaction feature schema and numeric coercion of request values.

use serde_json::{Map, Value};

/// Number of features the model vector carries.
pub const FEATURE_COUNT: usize = 30;

/// Ordered feature names expected by a loaded model.
///
/// The order is part of the model contract: weight `i` of an artifact applies
/// to `FEATURE_NAMES[i]`.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "transaction_time",
    "Amount",
    "transaction_type_score",
    "transaction_pattern_score",
    "transaction_amount_pattern",
    "transaction_context_score",
    "transaction_frequency_score",
    "location_risk_score",
    "merchant_category_score",
    "merchant_trust_score",
    "geo_location_score",
    "customer_profile_score",
    "customer_behavior_score",
    "spending_behavior_score",
    "spending_risk_score",
    "device_risk_score",
    "unusual_device_score",
    "card_usage_pattern",
    "card_risk_score",
    "payment_channel_score",
    "velocity_score",
    "unusual_activity_score",
    "historical_risk_score",
    "anomaly_detection_score",
    "network_activity_score",
    "fraud_suspect_score",
    "fraud_tendency_score",
    "fraud_probability_score",
    "fraud_indicator_score",
    "suspicious_pattern_score",
];

/// A value that could not be read as a number.
#[derive(Debug, Clone, PartialEq)]
pub struct NotNumeric {
    pub field: String,
    pub value: Value,
}

impl std::fmt::Display for NotNumeric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "field '{}' is not numeric: {}", self.field, self.value)
    }
}

impl std::error::Error for NotNumeric {}

/// Named values submitted for a single prediction.
///
/// Keys outside the schema are kept but ignored by the model vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    values: Map<String, Value>,
}

impl FeatureRecord {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Builds a record from an arbitrary JSON value. Anything but an object
    /// yields an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reads `name` strictly, returning `default` when the key is absent.
    ///
    /// Present values that are not numbers, numeric strings or booleans are an error.
    pub fn number_or(&self, name: &str, default: f64) -> Result<f64, NotNumeric> {
        match self.values.get(name) {
            None => Ok(default),
            Some(value) => to_number(value).ok_or_else(|| NotNumeric {
                field: name.to_string(),
                value: value.clone(),
            }),
        }
    }

    /// Ordered numeric vector over `names`. Missing or unparseable values become 0.0.
    pub fn to_vector(&self, names: &[&str]) -> Vec<f64> {
        names
            .iter()
            .map(|name| self.values.get(*name).and_then(to_number).unwrap_or(0.0))
            .collect()
    }
}

impl From<Map<String, Value>> for FeatureRecord {
    fn from(values: Map<String, Value>) -> Self {
        Self::new(values)
    }
}

/// Numeric reading of a JSON value: numbers, trimmed numeric strings and booleans.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
