//! Detection statistics for a scoring run.

use crate::types::detection::{DetectionResult, RiskLevel};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Latency samples kept before the oldest half is discarded
const MAX_LATENCY_SAMPLES: usize = 10_000;

/// Metrics collector for credential scoring
pub struct DetectionMetrics {
    /// Credentials scored
    pub credentials_scored: AtomicU64,
    /// Credentials flagged as suspicious
    pub suspicious_detected: AtomicU64,
    /// Alerts by risk level
    alerts_by_level: RwLock<BTreeMap<&'static str, u64>>,
    /// Occurrences of each risk factor message
    risk_factor_counts: RwLock<BTreeMap<String, u64>>,
    /// Detection latencies (in microseconds)
    detection_times: RwLock<Vec<u64>>,
    /// Fraud probability distribution buckets
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl DetectionMetrics {
    pub fn new() -> Self {
        Self {
            credentials_scored: AtomicU64::new(0),
            suspicious_detected: AtomicU64::new(0),
            alerts_by_level: RwLock::new(BTreeMap::new()),
            risk_factor_counts: RwLock::new(BTreeMap::new()),
            detection_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a scored credential
    pub fn record_detection(&self, elapsed: Duration, result: &DetectionResult) {
        self.credentials_scored.fetch_add(1, Ordering::Relaxed);
        if result.is_suspicious {
            self.suspicious_detected.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.detection_times.write() {
            times.push(elapsed.as_micros() as u64);
            if times.len() > MAX_LATENCY_SAMPLES {
                times.drain(0..MAX_LATENCY_SAMPLES / 2);
            }
        }

        let bucket = (result.fraud_probability * 10.0).clamp(0.0, 9.0) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut counts) = self.risk_factor_counts.write() {
            for factor in &result.risk_factors {
                *counts.entry(factor.clone()).or_insert(0) += 1;
            }
        }
    }

    /// Record an emitted alert
    pub fn record_alert(&self, level: RiskLevel) {
        if let Ok(mut by_level) = self.alerts_by_level.write() {
            *by_level.entry(level.as_str()).or_insert(0) += 1;
        }
    }

    /// Detection latency statistics
    pub fn get_detection_stats(&self) -> LatencyStats {
        let Ok(times) = self.detection_times.read() else {
            return LatencyStats::default();
        };
        if times.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();
        let percentile = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Credentials scored per second since creation
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.credentials_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or_default()
    }

    pub fn get_alerts_by_level(&self) -> BTreeMap<&'static str, u64> {
        self.alerts_by_level
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn get_risk_factor_counts(&self) -> BTreeMap<String, u64> {
        self.risk_factor_counts
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Log a summary of the run
    pub fn print_summary(&self) {
        let scored = self.credentials_scored.load(Ordering::Relaxed);
        let suspicious = self.suspicious_detected.load(Ordering::Relaxed);
        let suspicious_rate = if scored > 0 {
            (suspicious as f64 / scored as f64) * 100.0
        } else {
            0.0
        };

        let latency = self.get_detection_stats();
        let throughput = self.get_throughput();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║          CREDENTIAL FRAUD DETECTION - METRICS SUMMARY        ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Credentials Scored:     {:>8}  │  Throughput: {:>8.1} /s ║",
            scored, throughput
        );
        info!(
            "║ Suspicious:             {:>8}  │  Rate: {:>6.1}%           ║",
            suspicious, suspicious_rate
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Detection Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            latency.mean_us, latency.p50_us, latency.p95_us, latency.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Alerts by Risk Level:                                        ║");
        for (level, count) in &self.get_alerts_by_level() {
            info!("║   {:10}: {:>6}                                          ║", level, count);
        }
        info!("║ Risk Factors:                                                ║");
        for (factor, count) in &self.get_risk_factor_counts() {
            info!("║   {:35}: {:>6}                   ║", factor, count);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Fraud Probability Distribution:                              ║");
        let score_dist = self.get_score_distribution();
        let total: u64 = score_dist.iter().sum();
        for (i, &count) in score_dist.iter().enumerate() {
            let pct = if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for DetectionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Detection latency statistics
#[derive(Debug, Default, PartialEq)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}
