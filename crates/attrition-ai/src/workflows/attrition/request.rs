use serde::Serialize;
use serde_json::{Map, Value};

use super::domain::{EmployeeProfile, RiskScore};

/// Inputs forwarded to the narrative service. Values are kept as given by the
/// caller; only numeric well-formedness is checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub tenure: f64,
    pub promotion: f64,
    pub satisfaction: f64,
    pub hours: f64,
    pub calculated_score: f64,
}

/// Rejection of a prediction payload; surfaced to callers as a 400.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInput {
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` must be a finite number")]
    NotNumeric(&'static str),
}

impl PredictionRequest {
    pub const FIELDS: [&'static str; 5] =
        ["tenure", "promotion", "satisfaction", "hours", "calculated_score"];

    pub fn from_profile(profile: &EmployeeProfile, score: RiskScore) -> Self {
        Self {
            tenure: f64::from(profile.tenure_years),
            promotion: f64::from(profile.promotion_gap_years),
            satisfaction: f64::from(profile.satisfaction),
            hours: profile.monthly_hours,
            calculated_score: f64::from(score.value()),
        }
    }

    pub fn from_slice(body: &[u8]) -> Result<Self, InvalidInput> {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Err(InvalidInput::NotAnObject),
        }
    }

    /// Accepts JSON numbers and numeric strings, matching how loosely typed
    /// form clients submit slider values.
    pub fn from_value(value: &Value) -> Result<Self, InvalidInput> {
        let object = value.as_object().ok_or(InvalidInput::NotAnObject)?;

        Ok(Self {
            tenure: numeric_field(object, "tenure")?,
            promotion: numeric_field(object, "promotion")?,
            satisfaction: numeric_field(object, "satisfaction")?,
            hours: numeric_field(object, "hours")?,
            calculated_score: numeric_field(object, "calculated_score")?,
        })
    }
}

fn numeric_field(object: &Map<String, Value>, field: &'static str) -> Result<f64, InvalidInput> {
    let parsed = match object.get(field) {
        None | Some(Value::Null) => return Err(InvalidInput::MissingField(field)),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Some(_) => None,
    };

    parsed
        .filter(|number| number.is_finite())
        .ok_or(InvalidInput::NotNumeric(field))
}
