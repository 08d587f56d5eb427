//! Type definitions for credential fraud detection

pub mod credential;
pub mod detection;

pub use credential::{Credential, LabeledCredential};
pub use detection::{CredentialAlert, DetectionResult, RiskLevel, RiskLevelThresholds};
