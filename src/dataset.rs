//! JSON dataset loading for training and scoring runs

use crate::types::credential::{Credential, LabeledCredential};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Labeled training data split into parallel credential and label lists
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub credentials: Vec<Credential>,
    pub labels: Vec<u8>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Number of samples labeled fraudulent
    pub fn fraud_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }
}

impl FromIterator<LabeledCredential> for TrainingSet {
    fn from_iter<I: IntoIterator<Item = LabeledCredential>>(iter: I) -> Self {
        let (credentials, labels) = iter
            .into_iter()
            .map(|sample| (sample.credential, sample.label))
            .unzip();
        Self {
            credentials,
            labels,
        }
    }
}

/// Load a JSON array of labeled credentials
pub fn load_training_set<P: AsRef<Path>>(path: P) -> Result<TrainingSet> {
    let path = path.as_ref();
    let samples: Vec<LabeledCredential> = read_json(path)?;
    let set: TrainingSet = samples.into_iter().collect();

    info!(
        path = %path.display(),
        samples = set.len(),
        fraudulent = set.fraud_count(),
        "Training set loaded"
    );
    Ok(set)
}

/// Load a JSON array of credentials to score
pub fn load_credentials<P: AsRef<Path>>(path: P) -> Result<Vec<Credential>> {
    let path = path.as_ref();
    let credentials: Vec<Credential> = read_json(path)?;
    info!(path = %path.display(), count = credentials.len(), "Credentials loaded");
    Ok(credentials)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_training_set() {
        let file = write_temp(
            r#"[
                {"credential": {"verification_count": 150, "issuer_trust_score": 0.2}, "label": 1},
                {"credential": {"issuer_trust_score": "0.9", "credential_age": 12}, "label": 0},
                {"credential": {}, "label": 0}
            ]"#,
        );

        let set = load_training_set(file.path()).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.labels, vec![1, 0, 0]);
        assert_eq!(set.fraud_count(), 1);
        assert_eq!(set.credentials[1].issuer_trust_score, Some(0.9));
    }

    #[test]
    fn test_malformed_field_reports_path() {
        let file = write_temp(r#"[{"credential": {"verification_count": [1]}, "label": 1}]"#);
        let err = load_training_set(file.path()).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Failed to parse"));
        assert!(message.contains("verification_count"));
    }

    #[test]
    fn test_load_credentials() {
        let file = write_temp(r#"[{"id": "a", "holder_signature": "sig"}, {}]"#);
        let credentials = load_credentials(file.path()).unwrap();
        assert_eq!(credentials.len(), 2);
        assert_eq!(credentials[0].holder_signature_len(), 3);
    }

    #[test]
    fn test_missing_file() {
        assert!(load_credentials("no/such/file.json").is_err());
    }
}
