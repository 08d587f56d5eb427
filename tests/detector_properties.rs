use credential_fraud_detector::risk_factors::{
    HIGH_VERIFICATION_COUNT, LOW_HOLDER_TRUST, LOW_ISSUER_TRUST, VERY_NEW_CREDENTIAL,
};
use credential_fraud_detector::{Credential, CredentialFraudDetector, FeatureExtractor};
use proptest::prelude::*;
use serde_json::json;

fn numeric() -> impl Strategy<Value = Option<f64>> {
    prop::option::of(-1.0e12..1.0e12f64)
}

fn arb_credential() -> impl Strategy<Value = Credential> {
    (
        (numeric(), numeric(), numeric(), numeric(), numeric()),
        (numeric(), numeric(), numeric()),
        (
            prop::option::of("[0-9a-f]{0,140}"),
            prop::option::of("[0-9a-zA-Z]{0,140}"),
        ),
    )
        .prop_map(
            |(
                (issue_date, expiry_date, credential_type, verification_count, revocation_status),
                (issuer_trust_score, holder_trust_score, credential_age),
                (issuer_signature, holder_signature),
            )| Credential {
                id: None,
                issue_date,
                expiry_date,
                issuer_signature,
                holder_signature,
                credential_type,
                verification_count,
                revocation_status,
                issuer_trust_score,
                holder_trust_score,
                credential_age,
            },
        )
}

#[test]
fn extraction_always_yields_ten_finite_features() {
    let extractor = FeatureExtractor::new();
    proptest!(|(credential in arb_credential())| {
        let features = extractor.extract(&credential);
        prop_assert_eq!(features.len(), 10);
        prop_assert!(features.iter().all(|f| f.is_finite()));
    });
}

#[test]
fn probability_is_bounded_and_threshold_is_strict() {
    let detector = CredentialFraudDetector::with_seed(17);
    proptest!(|(credential in arb_credential())| {
        let result = detector.detect_fraud(&credential);
        prop_assert!((0.0..=1.0).contains(&result.fraud_probability));
        prop_assert_eq!(result.is_suspicious, result.fraud_probability > 0.7);
    });
}

#[test]
fn risk_factors_are_independent_and_ordered() {
    let detector = CredentialFraudDetector::with_seed(17);
    proptest!(|(credential in arb_credential())| {
        let mut expected = Vec::new();
        if credential.verification_count.unwrap_or(0.0) > 100.0 {
            expected.push(HIGH_VERIFICATION_COUNT);
        }
        if credential.issuer_trust_score.is_some_and(|s| s < 0.5) {
            expected.push(LOW_ISSUER_TRUST);
        }
        if credential.holder_trust_score.is_some_and(|s| s < 0.5) {
            expected.push(LOW_HOLDER_TRUST);
        }
        if credential.credential_age.unwrap_or(0.0) < 1.0 {
            expected.push(VERY_NEW_CREDENTIAL);
        }
        prop_assert_eq!(detector.analyze_risk_factors(&credential), expected);
    });
}

#[test]
fn json_objects_with_numeric_fields_always_parse() {
    proptest!(|(count in 0u32..1000, score in 0.0..1.0f64, age in prop::option::of(0u32..5000))| {
        let mut value = json!({
            "verification_count": count,
            "issuer_trust_score": score,
            "holder_trust_score": score.to_string(),
        });
        if let Some(age) = age {
            value["credential_age"] = json!(age);
        }
        let credential = Credential::from_json(value).unwrap();
        prop_assert_eq!(credential.verification_count, Some(count as f64));
        prop_assert_eq!(credential.holder_trust_score, Some(score));
    });
}

#[test]
fn documented_examples() {
    let detector = CredentialFraudDetector::with_seed(0);

    let credential = Credential::from_json(json!({
        "verification_count": 150,
        "issuer_trust_score": 0.3,
        "holder_trust_score": 0.9,
        "credential_age": 5
    }))
    .unwrap();
    assert_eq!(
        detector.detect_fraud(&credential).risk_factors,
        vec![HIGH_VERIFICATION_COUNT, LOW_ISSUER_TRUST]
    );

    let empty = Credential::from_json(json!({})).unwrap();
    assert_eq!(detector.preprocess(&empty), [0.0; 10]);
    assert_eq!(detector.detect_fraud(&empty).risk_factors, vec![VERY_NEW_CREDENTIAL]);
}

#[test]
fn all_four_rules_trigger_together() {
    let detector = CredentialFraudDetector::with_seed(0);
    let credential = Credential::from_json(json!({
        "verification_count": 500,
        "issuer_trust_score": 0.1,
        "holder_trust_score": 0.2,
        "credential_age": 0
    }))
    .unwrap();

    assert_eq!(
        detector.detect_fraud(&credential).risk_factors,
        vec![
            HIGH_VERIFICATION_COUNT,
            LOW_ISSUER_TRUST,
            LOW_HOLDER_TRUST,
            VERY_NEW_CREDENTIAL
        ]
    );
}
