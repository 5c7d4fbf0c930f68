use serde_json::{Map, Value};

use super::domain::DecisionRecord;
use super::metrics::FairnessError;

/// The decision value counted as the favorable outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum FavorableLabel {
    Numeric(f64),
    Text(String),
}

impl Default for FavorableLabel {
    fn default() -> Self {
        FavorableLabel::Numeric(1.0)
    }
}

impl FavorableLabel {
    pub fn from_value(value: &Value) -> Result<Self, FairnessError> {
        match value {
            Value::Number(number) => number
                .as_f64()
                .map(FavorableLabel::Numeric)
                .ok_or_else(|| invalid_label(value)),
            Value::Bool(flag) => Ok(FavorableLabel::Numeric(if *flag { 1.0 } else { 0.0 })),
            Value::String(text) if !text.trim().is_empty() => {
                Ok(FavorableLabel::Text(text.trim().to_string()))
            }
            _ => Err(invalid_label(value)),
        }
    }

    /// Whether a raw decision value is the favorable outcome.
    ///
    /// Numeric labels only accept 0/1 decisions; text labels compare case-insensitively.
    pub fn is_favorable(&self, decision: &Value) -> Result<bool, String> {
        match self {
            FavorableLabel::Numeric(label) => {
                let numeric = binary_value(decision).ok_or_else(|| {
                    format!("decision must be 0 or 1 for a numeric favorable label, found {decision}")
                })?;
                Ok(f64::from(numeric) == *label)
            }
            FavorableLabel::Text(label) => {
                let text = match decision {
                    Value::String(text) => text.trim().to_string(),
                    Value::Number(number) => number.to_string(),
                    Value::Bool(flag) => flag.to_string(),
                    other => return Err(format!("decision must be a scalar value, found {other}")),
                };
                Ok(text.eq_ignore_ascii_case(label))
            }
        }
    }
}

fn invalid_label(value: &Value) -> FairnessError {
    FairnessError::InvalidLabel(format!(
        "favorable_label must be a number, boolean, or non-empty string, found {value}"
    ))
}

/// Interpret 0/1 numbers, booleans, and their string spellings.
pub fn binary_value(value: &Value) -> Option<u8> {
    match value {
        Value::Number(number) => match number.as_f64() {
            Some(v) if v == 0.0 => Some(0),
            Some(v) if v == 1.0 => Some(1),
            _ => None,
        },
        Value::Bool(flag) => Some(u8::from(*flag)),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "0" | "false" => Some(0),
            "1" | "true" => Some(1),
            _ => None,
        },
        _ => None,
    }
}

fn group_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Convert loosely-typed application objects into decision records.
///
/// Each object carries the protected attribute, a `decision` (or `status`) value,
/// and a 0/1 `ground_truth`.
pub fn records_from_applications(
    applications: &[Value],
    protected_attribute: &str,
    label: &FavorableLabel,
) -> Result<Vec<DecisionRecord>, FairnessError> {
    let attribute = protected_attribute.trim();
    if attribute.is_empty() {
        return Err(FairnessError::MissingAttributeName);
    }

    applications
        .iter()
        .enumerate()
        .map(|(index, application)| {
            let object = application
                .as_object()
                .ok_or_else(|| invalid(index, "application must be a JSON object".to_string()))?;
            record_from_object(index, object, attribute, label)
        })
        .collect()
}

fn record_from_object(
    index: usize,
    object: &Map<String, Value>,
    attribute: &str,
    label: &FavorableLabel,
) -> Result<DecisionRecord, FairnessError> {
    let group = object
        .get(attribute)
        .and_then(group_value)
        .ok_or_else(|| invalid(index, format!("missing protected attribute '{attribute}'")))?;

    let decision = object
        .get("decision")
        .or_else(|| object.get("status"))
        .ok_or_else(|| invalid(index, "missing decision or status".to_string()))?;
    let favorable = label
        .is_favorable(decision)
        .map_err(|reason| invalid(index, reason))?;

    let ground_truth = object
        .get("ground_truth")
        .and_then(binary_value)
        .ok_or_else(|| invalid(index, "ground_truth must be 0 or 1".to_string()))?;

    Ok(DecisionRecord::new(group, u8::from(favorable), ground_truth))
}

fn invalid(index: usize, reason: String) -> FairnessError {
    FairnessError::InvalidRecord { index, reason }
}
