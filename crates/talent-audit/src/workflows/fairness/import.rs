use std::io::Read;
use std::path::Path;

use serde_json::{Map, Number, Value};

use super::domain::DecisionRecord;
use super::intake::{records_from_applications, FavorableLabel};
use super::metrics::FairnessError;

#[derive(Debug)]
pub enum DecisionImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn(String),
    Records(FairnessError),
}

impl std::fmt::Display for DecisionImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionImportError::Io(err) => write!(f, "failed to read decision export: {}", err),
            DecisionImportError::Csv(err) => write!(f, "invalid decision CSV data: {}", err),
            DecisionImportError::MissingColumn(column) => {
                write!(f, "decision CSV is missing the '{}' column", column)
            }
            DecisionImportError::Records(err) => {
                write!(f, "decision CSV rows are invalid: {}", err)
            }
        }
    }
}

impl std::error::Error for DecisionImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecisionImportError::Io(err) => Some(err),
            DecisionImportError::Csv(err) => Some(err),
            DecisionImportError::MissingColumn(_) => None,
            DecisionImportError::Records(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for DecisionImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for DecisionImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<FairnessError> for DecisionImportError {
    fn from(err: FairnessError) -> Self {
        Self::Records(err)
    }
}

/// Reads hiring decisions exported as CSV.
///
/// Expected columns: the protected attribute, `decision` (or `status`), and `ground_truth`.
pub struct DecisionCsvImporter;

impl DecisionCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        protected_attribute: &str,
        label: &FavorableLabel,
    ) -> Result<Vec<DecisionRecord>, DecisionImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, protected_attribute, label)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        protected_attribute: &str,
        label: &FavorableLabel,
    ) -> Result<Vec<DecisionRecord>, DecisionImportError> {
        let attribute = protected_attribute.trim();
        if attribute.is_empty() {
            return Err(FairnessError::MissingAttributeName.into());
        }

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|header| header == name);

        let attribute_column =
            column(attribute).ok_or_else(|| DecisionImportError::MissingColumn(attribute.to_string()))?;
        let (decision_key, decision_column) = match column("decision") {
            Some(index) => ("decision", index),
            None => (
                "status",
                column("status")
                    .ok_or_else(|| DecisionImportError::MissingColumn("decision".to_string()))?,
            ),
        };
        let truth_column = column("ground_truth")
            .ok_or_else(|| DecisionImportError::MissingColumn("ground_truth".to_string()))?;

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let cell = |index: usize| record.get(index).map(cell_value).unwrap_or(Value::Null);
            let mut object = Map::new();
            let group = record
                .get(attribute_column)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(|value| Value::String(value.to_string()))
                .unwrap_or(Value::Null);
            object.insert(attribute.to_string(), group);
            object.insert(decision_key.to_string(), cell(decision_column));
            object.insert("ground_truth".to_string(), cell(truth_column));
            rows.push(Value::Object(object));
        }

        Ok(records_from_applications(&rows, attribute, label)?)
    }
}

fn cell_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Some(number) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    Value::String(trimmed.to_string())
}
