//! JSON dataset file provider.

use std::path::{Path, PathBuf};

use tracing::info;

use super::{Dataset, ProviderError, RecordProvider};

pub struct FileProvider {
    path: PathBuf,
    dataset: Dataset,
}

impl FileProvider {
    /// Loads `path` eagerly; fails if the file is unreadable or malformed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref().to_path_buf();
        let dataset = load(&path)?;
        Ok(Self { path, dataset })
    }
}

fn load(path: &Path) -> Result<Dataset, ProviderError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ProviderError::Io(format!("{}: {}", path.display(), e)))?;
    let dataset = Dataset::from_json(&content)?;
    info!(
        "Loaded {}: {} surveys, {} devices, {} valve operations, {} assets",
        path.display(),
        dataset.surveys.len(),
        dataset.devices.len(),
        dataset.valve_operations.len(),
        dataset.assets.len()
    );
    Ok(dataset)
}

impl RecordProvider for FileProvider {
    fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    fn reload(&mut self) -> Result<(), ProviderError> {
        self.dataset = load(&self.path)?;
        Ok(())
    }

    fn source_name(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::SurveyId;

    const DATASET: &str = r#"{
        "surveys": [{"id": "S-1", "name": "North"}, {"id": "S-2", "name": "South"}],
        "devices": [
            {"id": "D1", "survey_id": "S-1", "name": "a", "kind": "gas_detector", "status": "active"},
            {"id": "D2", "survey_id": "S-2", "name": "b", "kind": "gps_tracker", "status": "fault"}
        ],
        "assets": [
            {"id": "A1", "survey_id": "S-1", "material": "steel"},
            {"id": "A2", "material": "pe"}
        ]
    }"#;

    #[test]
    fn test_open_and_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.json");
        std::fs::write(&path, DATASET).unwrap();

        let provider = FileProvider::open(&path).unwrap();
        let s1 = SurveyId::new("S-1");
        assert_eq!(provider.surveys().len(), 2);
        assert_eq!(provider.devices(None).len(), 2);
        let devices = provider.devices(Some(&s1));
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, "D1");
        assert_eq!(provider.assets(Some(&s1)).len(), 1);
        assert_eq!(provider.assets(None).len(), 2);
        assert!(provider.valve_operations(None).is_empty());
        assert!(provider.source_name().ends_with("survey.json"));
    }

    #[test]
    fn test_reload_picks_up_changes_and_keeps_data_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.json");
        std::fs::write(&path, DATASET).unwrap();
        let mut provider = FileProvider::open(&path).unwrap();

        std::fs::write(&path, r#"{"surveys": [{"id": "S-9", "name": "West"}]}"#).unwrap();
        provider.reload().unwrap();
        assert_eq!(provider.surveys().len(), 1);
        assert!(provider.devices(None).is_empty());

        std::fs::write(&path, "garbage").unwrap();
        assert!(matches!(provider.reload(), Err(ProviderError::Parse(_))));
        assert_eq!(provider.surveys().len(), 1);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let res = FileProvider::open(dir.path().join("absent.json"));
        assert!(matches!(res, Err(ProviderError::Io(_))));
    }
}
