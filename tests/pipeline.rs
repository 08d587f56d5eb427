use credential_fraud_detector::dataset::{load_credentials, load_training_set};
use credential_fraud_detector::metrics::DetectionMetrics;
use credential_fraud_detector::types::detection::{CredentialAlert, RiskLevel, RiskLevelThresholds};
use credential_fraud_detector::{AppConfig, CredentialFraudDetector, DetectorError};
use serde_json::json;
use std::io::Write;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn labeled_samples(count: usize) -> serde_json::Value {
    let samples: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            let fraud = i % 4 == 0;
            json!({
                "credential": {
                    "id": format!("cred_{i}"),
                    "issuer_signature": "0xabcdef",
                    "holder_signature": if fraud { "" } else { "0x123456" },
                    "verification_count": if fraud { 180 } else { 12 },
                    "issuer_trust_score": if fraud { 0.2 } else { 0.85 },
                    "holder_trust_score": if fraud { 0.4 } else { 0.9 },
                    "credential_age": if fraud { 0 } else { 30 },
                    "revocation_status": fraud
                },
                "label": u8::from(fraud)
            })
        })
        .collect();
    serde_json::Value::Array(samples)
}

fn write_json(value: &serde_json::Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    serde_json::to_writer(&mut file, value).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn train_and_score_from_files() {
    let training_file = write_json(&labeled_samples(60));
    let credentials_file = write_json(&json!([
        { "id": "fresh", "verification_count": 250, "issuer_trust_score": 0.1 },
        { "id": "settled", "verification_count": 3, "issuer_trust_score": 0.95,
          "holder_trust_score": 0.9, "credential_age": 400 },
        {}
    ]));

    let training_set = load_training_set(training_file.path()).unwrap();
    assert_eq!(training_set.len(), 60);
    assert_eq!(training_set.fraud_count(), 15);

    let mut detector = CredentialFraudDetector::with_seed(42);
    let history = detector
        .train(&training_set.credentials, &training_set.labels)
        .unwrap();
    assert_eq!(history.len(), 10);
    assert!(detector.is_trained());

    let credentials = load_credentials(credentials_file.path()).unwrap();
    let metrics = DetectionMetrics::new();
    let thresholds = RiskLevelThresholds::default();

    for credential in &credentials {
        let result = detector.detect_fraud(credential);
        assert!((0.0..=1.0).contains(&result.fraud_probability));
        metrics.record_detection(Duration::from_micros(10), &result);

        if result.is_suspicious {
            let id = credential.id.clone().unwrap_or_default();
            let alert = CredentialAlert::from_result(id, &result, &thresholds);
            assert_ne!(alert.risk_level, RiskLevel::Low);
            metrics.record_alert(alert.risk_level);
        }
    }

    assert_eq!(metrics.credentials_scored.load(Ordering::Relaxed), 3);
    assert_eq!(
        detector.detect_fraud(&credentials[1]).risk_factors,
        Vec::<String>::new()
    );
}

#[test]
fn empty_training_file_is_rejected() {
    let file = write_json(&json!([]));
    let training_set = load_training_set(file.path()).unwrap();

    let mut detector = CredentialFraudDetector::with_seed(1);
    assert_eq!(
        detector.train(&training_set.credentials, &training_set.labels),
        Err(DetectorError::EmptyTrainingSet)
    );
    assert!(!detector.is_trained());
}

#[test]
fn config_points_at_datasets() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[data]\ntraining_set = \"a.json\"\ncredentials = \"b.json\"\n\n[output]\nalerts = \"alerts.jsonl\"\n"
    )
    .unwrap();

    let config = AppConfig::load_from_path(file.path()).unwrap();
    assert_eq!(config.data.training_set.to_str(), Some("a.json"));
    assert_eq!(
        config.output.alerts.as_deref().and_then(|p| p.to_str()),
        Some("alerts.jsonl")
    );
    assert_eq!(config.model.seed, None);
    assert_eq!(config.logging.format, "pretty");
}
