//! Credential Fraud Detector - Main Entry Point
//!
//! Trains the fraud network on a labeled credential set, scores a batch of
//! credentials, and writes an alert for every suspicious one.

use anyhow::{Context, Result};
use credential_fraud_detector::{
    config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH},
    dataset,
    metrics::DetectionMetrics,
    types::detection::CredentialAlert,
    CredentialFraudDetector,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config_path = std::env::args().nth(1);
    let config = match &config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    let config_path = config_path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

    init_logging(&config.logging)?;
    info!(config = %config_path, "Starting Credential Fraud Detector");

    let mut detector = match config.model.seed {
        Some(seed) => CredentialFraudDetector::with_seed(seed),
        None => CredentialFraudDetector::new(),
    };

    // Train
    let training_set = dataset::load_training_set(&config.data.training_set)?;
    let history = detector
        .train(&training_set.credentials, &training_set.labels)
        .context("Training failed")?;
    if let Some(last) = history.last() {
        info!(
            loss = last.loss,
            accuracy = last.accuracy,
            val_loss = last.val_loss,
            val_accuracy = last.val_accuracy,
            "Training complete"
        );
    }

    // Score
    let credentials = dataset::load_credentials(&config.data.credentials)?;
    let metrics = DetectionMetrics::new();
    let mut alerts = alert_writer(&config)?;

    for (index, credential) in credentials.iter().enumerate() {
        let start_time = Instant::now();
        let result = detector.detect_fraud(credential);
        metrics.record_detection(start_time.elapsed(), &result);

        let credential_id = credential
            .id
            .clone()
            .unwrap_or_else(|| format!("credential_{}", index));

        if result.is_suspicious {
            let alert = CredentialAlert::from_result(
                credential_id,
                &result,
                &config.detection.risk_levels,
            );
            metrics.record_alert(alert.risk_level);

            serde_json::to_writer(&mut alerts, &alert).context("Failed to serialize alert")?;
            writeln!(alerts).context("Failed to write alert")?;

            info!(
                credential_id = %alert.credential_id,
                fraud_probability = alert.fraud_probability,
                risk_level = ?alert.risk_level,
                "Suspicious credential"
            );
        } else {
            debug!(
                credential_id = %credential_id,
                fraud_probability = result.fraud_probability,
                risk_factors = ?result.risk_factors,
                "Credential below threshold"
            );
        }
    }

    alerts.flush().context("Failed to flush alerts")?;
    metrics.print_summary();

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .with_context(|| format!("Invalid log level: {}", logging.level))?;

    // Logs go to stderr so alerts on stdout stay machine-readable.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match logging.format.as_str() {
        "json" => builder.json().init(),
        _ => builder.pretty().init(),
    }
    Ok(())
}

fn alert_writer(config: &AppConfig) -> Result<Box<dyn Write>> {
    Ok(match &config.output.alerts {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create alert file {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    })
}
