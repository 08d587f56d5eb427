//! Credential fraud detector: feature extraction, network inference and
//! heuristic risk factors behind one owned object.

use crate::error::{DetectorError, Result};
use crate::feature_extractor::{FeatureExtractor, FEATURE_COUNT};
use crate::models::network::FraudNetwork;
use crate::models::training::{Trainer, TrainingHistory};
use crate::risk_factors::RiskFactorAnalyzer;
use crate::types::credential::Credential;
use crate::types::detection::DetectionResult;
use ndarray::{Array1, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Scores credentials for fraud.
///
/// The detector exclusively owns its network weights. Inference borrows it
/// immutably and training mutably, so the two never overlap. Each call to
/// [`train`](Self::train) continues from the current weights.
pub struct CredentialFraudDetector {
    network: FraudNetwork,
    trainer: Trainer,
    extractor: FeatureExtractor,
    analyzer: RiskFactorAnalyzer,
    rng: StdRng,
    trained: bool,
    untrained_warned: AtomicBool,
}

impl CredentialFraudDetector {
    /// Create a detector with randomly initialized weights.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a detector whose initialization, dropout and shuffling are
    /// reproducible from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: StdRng) -> Self {
        let network = FraudNetwork::build(&mut rng);
        info!(
            parameters = network.parameter_count(),
            "Fraud detection network initialized"
        );

        Self {
            network,
            trainer: Trainer::new(),
            extractor: FeatureExtractor::new(),
            analyzer: RiskFactorAnalyzer::new(),
            rng,
            trained: false,
            untrained_warned: AtomicBool::new(false),
        }
    }

    /// Feature vector the network sees for `credential`
    pub fn preprocess(&self, credential: &Credential) -> [f32; FEATURE_COUNT] {
        self.extractor.extract(credential)
    }

    /// Network fraud probability for a single credential, in [0, 1].
    pub fn fraud_probability(&self, credential: &Credential) -> f64 {
        if !self.trained && !self.untrained_warned.swap(true, Ordering::Relaxed) {
            warn!("Scoring with an untrained model; probabilities are not meaningful");
        }

        let features = Array1::from(self.preprocess(credential).to_vec()).insert_axis(Axis(0));
        let output = self.network.predict(features.view());

        match output.iter().next().copied() {
            Some(p) if !p.is_nan() => (p as f64).clamp(0.0, 1.0),
            _ => {
                warn!(
                    credential_id = credential.id.as_deref().unwrap_or("-"),
                    "Network produced no usable output, using neutral score 0.5"
                );
                0.5
            }
        }
    }

    /// Heuristic risk factors, independent of the network
    pub fn analyze_risk_factors(&self, credential: &Credential) -> Vec<String> {
        self.analyzer.analyze(credential)
    }

    /// Score a credential and list its risk factors.
    pub fn detect_fraud(&self, credential: &Credential) -> DetectionResult {
        let fraud_probability = self.fraud_probability(credential);
        let risk_factors = self.analyze_risk_factors(credential);
        let result = DetectionResult::new(fraud_probability, risk_factors);

        debug!(
            credential_id = credential.id.as_deref().unwrap_or("-"),
            fraud_probability = result.fraud_probability,
            is_suspicious = result.is_suspicious,
            risk_factors = result.risk_factors.len(),
            "Credential scored"
        );

        result
    }

    /// Fit the network to labeled credentials (label 1 = fraudulent).
    pub fn train(&mut self, credentials: &[Credential], labels: &[u8]) -> Result<TrainingHistory> {
        if credentials.len() != labels.len() {
            return Err(DetectorError::LengthMismatch {
                credentials: credentials.len(),
                labels: labels.len(),
            });
        }
        if credentials.is_empty() {
            return Err(DetectorError::EmptyTrainingSet);
        }
        if let Some((index, &label)) = labels.iter().enumerate().find(|(_, l)| **l > 1) {
            return Err(DetectorError::NonBinaryLabel { index, label });
        }

        let features = self.extractor.extract_batch(credentials);
        let targets: Array1<f32> = labels.iter().map(|&l| f32::from(l)).collect();

        let history = self
            .trainer
            .fit(&mut self.network, &features, &targets, &mut self.rng)?;
        self.trained = true;
        Ok(history)
    }

    /// Whether at least one training call has succeeded
    pub fn is_trained(&self) -> bool {
        self.trained
    }

    pub fn network(&self) -> &FraudNetwork {
        &self.network
    }
}

impl Default for CredentialFraudDetector {
    fn default() -> Self {
        Self::new()
    }
}
