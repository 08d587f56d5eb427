//! Heuristic risk factors evaluated directly on credential fields.
//!
//! These checks are independent of the network and of each other.

use crate::types::credential::Credential;

pub const HIGH_VERIFICATION_COUNT: &str = "Unusually high verification count";
pub const LOW_ISSUER_TRUST: &str = "Low issuer trust score";
pub const LOW_HOLDER_TRUST: &str = "Low holder trust score";
pub const VERY_NEW_CREDENTIAL: &str = "Very new credential";

const MAX_VERIFICATION_COUNT: f64 = 100.0;
const MIN_TRUST_SCORE: f64 = 0.5;
const MIN_CREDENTIAL_AGE: f64 = 1.0;

/// A single threshold rule over a credential
struct RiskRule {
    message: &'static str,
    check: fn(&Credential) -> bool,
}

/// Rules in reporting order
const RULES: [RiskRule; 4] = [
    RiskRule {
        message: HIGH_VERIFICATION_COUNT,
        check: |c| c.verification_count.unwrap_or(0.0) > MAX_VERIFICATION_COUNT,
    },
    // Absent trust scores are unknown rather than low.
    RiskRule {
        message: LOW_ISSUER_TRUST,
        check: |c| c.issuer_trust_score.is_some_and(|s| s < MIN_TRUST_SCORE),
    },
    RiskRule {
        message: LOW_HOLDER_TRUST,
        check: |c| c.holder_trust_score.is_some_and(|s| s < MIN_TRUST_SCORE),
    },
    RiskRule {
        message: VERY_NEW_CREDENTIAL,
        check: |c| c.credential_age.unwrap_or(0.0) < MIN_CREDENTIAL_AGE,
    },
];

/// Evaluates the threshold rules against a credential
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskFactorAnalyzer;

impl RiskFactorAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Messages of every triggered rule, in fixed rule order.
    pub fn analyze(&self, credential: &Credential) -> Vec<String> {
        RULES
            .iter()
            .filter(|rule| (rule.check)(credential))
            .map(|rule| rule.message.to_string())
            .collect()
    }

    /// All rule messages, in reporting order
    pub fn rule_messages(&self) -> [&'static str; 4] {
        RULES.map(|rule| rule.message)
    }
}
