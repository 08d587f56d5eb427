//! Credential Fraud Detector Library
//!
//! Scores digital credentials for fraud with a small dense neural network
//! and reports heuristic risk factors found on the raw fields.

pub mod config;
pub mod dataset;
pub mod detector;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod risk_factors;
pub mod types;

pub use crate::config::AppConfig;
pub use detector::CredentialFraudDetector;
pub use error::{DetectorError, Result};
pub use feature_extractor::FeatureExtractor;
pub use models::training::TrainingHistory;
pub use risk_factors::RiskFactorAnalyzer;
pub use types::{credential::Credential, detection::DetectionResult};
