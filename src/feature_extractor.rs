//! Feature extraction for credential fraud model inference.
//!
//! Turns a credential into the fixed 10-feature vector the network consumes.
//! Values are passed through unscaled.

use crate::types::credential::Credential;
use ndarray::Array2;

/// Number of features produced per credential
pub const FEATURE_COUNT: usize = 10;

/// Feature names, in vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "issue_date",
    "expiry_date",
    "issuer_signature_len",
    "holder_signature_len",
    "credential_type",
    "verification_count",
    "revocation_status",
    "issuer_trust_score",
    "holder_trust_score",
    "credential_age",
];

/// Feature extractor that transforms credentials into model input features.
///
/// Absent fields contribute 0 at their position.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract features from a credential.
    pub fn extract(&self, credential: &Credential) -> [f32; FEATURE_COUNT] {
        [
            numeric(credential.issue_date),
            numeric(credential.expiry_date),
            credential.issuer_signature_len() as f32,
            credential.holder_signature_len() as f32,
            numeric(credential.credential_type),
            numeric(credential.verification_count),
            numeric(credential.revocation_status),
            numeric(credential.issuer_trust_score),
            numeric(credential.holder_trust_score),
            numeric(credential.credential_age),
        ]
    }

    /// Extract a `(n, FEATURE_COUNT)` matrix, one row per credential.
    pub fn extract_batch(&self, credentials: &[Credential]) -> Array2<f32> {
        let mut matrix = Array2::zeros((credentials.len(), FEATURE_COUNT));
        for (mut row, credential) in matrix.rows_mut().into_iter().zip(credentials) {
            for (cell, value) in row.iter_mut().zip(self.extract(credential)) {
                *cell = value;
            }
        }
        matrix
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Get feature names in vector order.
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

/// Narrow to f32, mapping NaN to 0 and saturating infinities
fn numeric(value: Option<f64>) -> f32 {
    match value {
        None => 0.0,
        Some(v) if v.is_nan() => 0.0,
        Some(v) => (v as f32).clamp(f32::MIN, f32::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_extraction() {
        let extractor = FeatureExtractor::new();
        let credential = Credential {
            issue_date: Some(1_700_000_000.0),
            issuer_signature: Some("0xdeadbeef".to_string()),
            verification_count: Some(150.0),
            issuer_trust_score: Some(0.3),
            credential_age: Some(5.0),
            ..Default::default()
        };

        let features = extractor.extract(&credential);

        assert_eq!(features.len(), extractor.feature_count());
        assert_eq!(features[0], 1_700_000_000.0);
        assert_eq!(features[1], 0.0);
        assert_eq!(features[2], 10.0); // issuer signature length
        assert_eq!(features[3], 0.0);
        assert_eq!(features[5], 150.0);
        assert_eq!(features[7], 0.3);
        assert_eq!(features[9], 5.0);
    }

    #[test]
    fn test_empty_credential_is_all_zero() {
        let features = FeatureExtractor::new().extract(&Credential::default());
        assert_eq!(features, [0.0; FEATURE_COUNT]);
    }

    #[test]
    fn test_non_finite_values_are_sanitized() {
        let credential = Credential {
            issue_date: Some(f64::NAN),
            expiry_date: Some(f64::INFINITY),
            credential_type: Some(f64::NEG_INFINITY),
            verification_count: Some(1e300),
            ..Default::default()
        };

        let features = FeatureExtractor::new().extract(&credential);
        assert_eq!(features[0], 0.0);
        assert_eq!(features[1], f32::MAX);
        assert_eq!(features[4], f32::MIN);
        assert_eq!(features[5], f32::MAX);
        assert!(features.iter().all(|f| f.is_finite()));
    }

    #[test]
    fn test_batch_extraction() {
        let extractor = FeatureExtractor::new();
        let credentials = vec![
            Credential {
                credential_age: Some(2.0),
                ..Default::default()
            },
            Credential::default(),
            Credential {
                holder_signature: Some("sig".to_string()),
                ..Default::default()
            },
        ];

        let matrix = extractor.extract_batch(&credentials);
        assert_eq!(matrix.shape(), &[3, FEATURE_COUNT]);
        assert_eq!(matrix[[0, 9]], 2.0);
        assert_eq!(matrix[[2, 3]], 3.0);
        assert_eq!(matrix.row(1).sum(), 0.0);
    }

    #[test]
    fn test_feature_count() {
        let extractor = FeatureExtractor::new();
        assert_eq!(extractor.feature_count(), 10);
        assert_eq!(extractor.feature_names().len(), 10);
    }
}
