//! Record sources for the dashboard.
//!
//! [`RecordProvider`] hides whether records come from a JSON dataset on disk
//! ([`FileProvider`]) or from the built-in demo scenario ([`MockProvider`]).
//! Every query takes the active survey explicitly; `None` returns all records.

mod file;
mod mock;

pub use file::FileProvider;
pub use mock::{HARBOUR_SURVEY, MockProvider, RIDGE_SURVEY};

use serde::{Deserialize, Serialize};

use crate::models::{Device, DynamicRecord, Survey, ValveOperation};
use crate::survey::SurveyId;

/// Errors raised while loading a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// I/O error while reading data.
    Io(String),
    /// Malformed dataset.
    Parse(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Io(msg) => write!(f, "I/O error: {}", msg),
            ProviderError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<std::io::Error> for ProviderError {
    fn from(e: std::io::Error) -> Self {
        ProviderError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Parse(e.to_string())
    }
}

/// Complete record set of one dataset file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub surveys: Vec<Survey>,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub valve_operations: Vec<ValveOperation>,
    #[serde(default)]
    pub assets: Vec<DynamicRecord>,
}

impl Dataset {
    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn in_survey(record_survey: Option<&SurveyId>, wanted: Option<&SurveyId>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => record_survey == Some(wanted),
    }
}

/// Abstraction over record sources.
///
/// The trait is object-safe and designed to be used with `Box<dyn RecordProvider>`.
pub trait RecordProvider {
    /// Currently loaded dataset.
    fn dataset(&self) -> &Dataset;

    /// Re-reads the underlying source. On error the previous data stays.
    fn reload(&mut self) -> Result<(), ProviderError>;

    /// Human readable origin, shown in the header.
    fn source_name(&self) -> String;

    fn surveys(&self) -> Vec<Survey> {
        self.dataset().surveys.clone()
    }

    fn devices(&self, survey: Option<&SurveyId>) -> Vec<Device> {
        self.dataset()
            .devices
            .iter()
            .filter(|d| in_survey(Some(&d.survey_id), survey))
            .cloned()
            .collect()
    }

    fn valve_operations(&self, survey: Option<&SurveyId>) -> Vec<ValveOperation> {
        self.dataset()
            .valve_operations
            .iter()
            .filter(|op| in_survey(Some(&op.survey_id), survey))
            .cloned()
            .collect()
    }

    fn assets(&self, survey: Option<&SurveyId>) -> Vec<DynamicRecord> {
        self.dataset()
            .assets
            .iter()
            .filter(|a| in_survey(a.survey_id().as_ref(), survey))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_arrays_default_to_empty() {
        let ds = Dataset::from_json(r#"{"surveys": [{"id": "S-1", "name": "loop"}]}"#).unwrap();
        assert_eq!(ds.surveys.len(), 1);
        assert!(ds.devices.is_empty());
        assert!(ds.valve_operations.is_empty());
        assert!(ds.assets.is_empty());
    }

    #[test]
    fn test_parse_error() {
        let err = Dataset::from_json("{not json").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_in_survey() {
        let s1 = SurveyId::new("S-1");
        let s2 = SurveyId::new("S-2");
        assert!(in_survey(Some(&s1), None));
        assert!(in_survey(None, None));
        assert!(in_survey(Some(&s1), Some(&s1)));
        assert!(!in_survey(Some(&s1), Some(&s2)));
        assert!(!in_survey(None, Some(&s1)));
    }
}
