//! Synthetic Credential Generator
//!
//! Writes a JSON array of generated credentials to stdout, for trying out the
//! detector without real data.
//!
//! Usage: generate-credentials [count] [fraud_rate] [training|credentials] [seed]

use anyhow::{ensure, Result};
use chrono::Utc;
use credential_fraud_detector::types::credential::{Credential, LabeledCredential};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, Write};
use tracing::info;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Credential generator for testing
struct CredentialGenerator {
    rng: StdRng,
    credential_counter: u64,
    now: f64,
}

impl CredentialGenerator {
    fn new(rng: StdRng) -> Self {
        Self {
            rng,
            credential_counter: 0,
            now: Utc::now().timestamp() as f64,
        }
    }

    fn next_id(&mut self) -> String {
        self.credential_counter += 1;
        format!("cred_{:08}", self.credential_counter)
    }

    /// Generate a credential from a reputable issuer with normal usage
    fn generate_legitimate(&mut self) -> Credential {
        let age_days = self.rng.gen_range(30.0..1500.0_f64).floor();
        let issue_date = self.now - age_days * SECONDS_PER_DAY;

        Credential {
            id: Some(self.next_id()),
            issue_date: Some(issue_date),
            expiry_date: Some(issue_date + 3.0 * 365.0 * SECONDS_PER_DAY),
            issuer_signature: Some(self.signature(130)),
            holder_signature: Some(self.signature(130)),
            credential_type: Some(self.rng.gen_range(1..=5) as f64),
            verification_count: Some(self.rng.gen_range(0..60) as f64),
            revocation_status: Some(0.0),
            issuer_trust_score: Some(self.rng.gen_range(0.6..1.0)),
            holder_trust_score: Some(self.rng.gen_range(0.55..1.0)),
            credential_age: Some(age_days),
        }
    }

    /// Generate a credential with fraud indicators
    fn generate_suspicious(&mut self) -> Credential {
        let age_days = self.rng.gen_range(0.0..5.0_f64).floor();
        let issue_date = self.now - age_days * SECONDS_PER_DAY;
        let issuer_signature_len = if self.rng.gen_bool(0.5) { 64 } else { 130 };
        let holder_signature_len = self.rng.gen_range(0..=130);

        Credential {
            id: Some(self.next_id()),
            issue_date: Some(issue_date),
            expiry_date: Some(issue_date + self.rng.gen_range(1.0..30.0) * SECONDS_PER_DAY),
            issuer_signature: Some(self.signature(issuer_signature_len)),
            holder_signature: Some(self.signature(holder_signature_len)),
            credential_type: Some(self.rng.gen_range(1..=5) as f64),
            verification_count: Some(self.rng.gen_range(80..400) as f64),
            revocation_status: Some(if self.rng.gen_bool(0.3) { 1.0 } else { 0.0 }),
            issuer_trust_score: Some(self.rng.gen_range(0.0..0.6)),
            holder_trust_score: Some(self.rng.gen_range(0.0..0.7)),
            credential_age: Some(age_days),
        }
    }

    /// Hex signature with a `0x` prefix and `len` characters in total
    fn signature(&mut self, len: usize) -> String {
        let digits: String = (0..len.saturating_sub(2))
            .map(|_| char::from_digit(self.rng.gen_range(0..16), 16).unwrap_or('0'))
            .collect();
        format!("0x{}", digits)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_credentials=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let count: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(500);
    let fraud_rate: f64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(0.2);
    let kind = args.get(3).map(|s| s.as_str()).unwrap_or("training");
    let seed: Option<u64> = args.get(4).and_then(|s| s.parse().ok());

    ensure!(
        (0.0..=1.0).contains(&fraud_rate),
        "fraud_rate must be within [0, 1], got {}",
        fraud_rate
    );
    ensure!(
        kind == "training" || kind == "credentials",
        "output kind must be `training` or `credentials`, got `{}`",
        kind
    );

    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut generator = CredentialGenerator::new(rng);

    let mut legitimate_count = 0;
    let mut suspicious_count = 0;
    let samples: Vec<LabeledCredential> = (0..count)
        .map(|_| {
            let fraudulent = generator.rng.gen_bool(fraud_rate);
            let credential = if fraudulent {
                suspicious_count += 1;
                generator.generate_suspicious()
            } else {
                legitimate_count += 1;
                generator.generate_legitimate()
            };
            LabeledCredential {
                credential,
                label: u8::from(fraudulent),
            }
        })
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if kind == "training" {
        serde_json::to_writer_pretty(&mut out, &samples)?;
    } else {
        let credentials: Vec<&Credential> = samples.iter().map(|s| &s.credential).collect();
        serde_json::to_writer_pretty(&mut out, &credentials)?;
    }
    writeln!(out)?;

    info!(
        count = count,
        legitimate = legitimate_count,
        suspicious = suspicious_count,
        kind = kind,
        "Generated credentials"
    );

    Ok(())
}
