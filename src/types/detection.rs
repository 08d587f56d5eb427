//! Detection results and alert data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Probability above which a credential is flagged as suspicious
pub const SUSPICIOUS_THRESHOLD: f64 = 0.7;

/// Outcome of scoring a single credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Network output (0.0 - 1.0)
    pub fraud_probability: f64,
    /// True iff the probability is strictly above [`SUSPICIOUS_THRESHOLD`]
    pub is_suspicious: bool,
    /// Heuristic findings on the raw fields, in rule order
    pub risk_factors: Vec<String>,
}

impl DetectionResult {
    pub fn new(fraud_probability: f64, risk_factors: Vec<String>) -> Self {
        Self {
            fraud_probability,
            is_suspicious: fraud_probability > SUSPICIOUS_THRESHOLD,
            risk_factors,
        }
    }
}

/// Risk level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Determine risk level from probability and thresholds
    pub fn from_score(score: f64, thresholds: &RiskLevelThresholds) -> Self {
        if score >= thresholds.critical {
            RiskLevel::Critical
        } else if score >= thresholds.high {
            RiskLevel::High
        } else if score >= thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Configurable risk level thresholds.
///
/// Each field is the lowest score classified at that level; anything below
/// `medium` is low risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskLevelThresholds {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            medium: 0.5,
            high: 0.8,
            critical: 0.95,
        }
    }
}

/// Alert raised for a credential flagged as suspicious
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialAlert {
    /// Unique alert identifier
    pub alert_id: String,

    /// Identifier of the scored credential
    pub credential_id: String,

    /// Fraud probability from the network
    pub fraud_probability: f64,

    /// Risk level classification
    pub risk_level: RiskLevel,

    /// Heuristic risk factors found on the credential
    pub risk_factors: Vec<String>,

    /// Alert generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl CredentialAlert {
    /// Build an alert from a detection result
    pub fn from_result(
        credential_id: String,
        result: &DetectionResult,
        thresholds: &RiskLevelThresholds,
    ) -> Self {
        Self {
            alert_id: uuid::Uuid::new_v4().to_string(),
            credential_id,
            fraud_probability: result.fraud_probability,
            risk_level: RiskLevel::from_score(result.fraud_probability, thresholds),
            risk_factors: result.risk_factors.clone(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suspicious_is_strictly_above_threshold() {
        assert!(!DetectionResult::new(0.7, Vec::new()).is_suspicious);
        assert!(DetectionResult::new(0.700_001, Vec::new()).is_suspicious);
        assert!(!DetectionResult::new(0.0, Vec::new()).is_suspicious);
        assert!(DetectionResult::new(1.0, Vec::new()).is_suspicious);
    }

    #[test]
    fn test_risk_level_from_score() {
        let thresholds = RiskLevelThresholds::default();

        assert_eq!(RiskLevel::from_score(0.1, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.49, &thresholds), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.5, &thresholds), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.85, &thresholds), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.97, &thresholds), RiskLevel::Critical);
    }

    #[test]
    fn test_alert_serialization() {
        let result = DetectionResult::new(0.9, vec!["Low issuer trust score".to_string()]);
        let alert = CredentialAlert::from_result(
            "cred_123".to_string(),
            &result,
            &RiskLevelThresholds::default(),
        );

        let json = serde_json::to_string(&alert).unwrap();
        assert!(json.contains(r#""risk_level":"high""#));

        let deserialized: CredentialAlert = serde_json::from_str(&json).unwrap();
        assert_eq!(alert.credential_id, deserialized.credential_id);
        assert_eq!(alert.fraud_probability, deserialized.fraud_probability);
        assert_eq!(alert.risk_factors, deserialized.risk_factors);
    }
}
