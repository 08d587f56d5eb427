//! Mini-batch training for the fraud network.
//!
//! Fixed schedule: 10 epochs, batches of 32, the last 20% of the samples held
//! out for validation. Training rows are reshuffled every epoch.

use crate::error::{DetectorError, Result};
use crate::models::network::FraudNetwork;
use crate::models::optimizer::Adam;
use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

pub const EPOCHS: usize = 10;
pub const BATCH_SIZE: usize = 32;
pub const VALIDATION_SPLIT: f64 = 0.2;

/// Probability clip applied before taking logarithms
const LOSS_EPSILON: f64 = 1e-7;

/// Metrics recorded at the end of one epoch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub loss: f64,
    pub accuracy: f64,
    pub val_loss: f64,
    pub val_accuracy: f64,
}

/// Per-epoch metrics from one training call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochMetrics>,
}

impl TrainingHistory {
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }
}

/// Mean binary cross-entropy over a batch
pub fn binary_cross_entropy(predictions: ArrayView1<'_, f32>, labels: ArrayView1<'_, f32>) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let total: f64 = predictions
        .iter()
        .zip(labels.iter())
        .map(|(&p, &y)| {
            let p = (p as f64).clamp(LOSS_EPSILON, 1.0 - LOSS_EPSILON);
            let y = y as f64;
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    total / predictions.len() as f64
}

/// Fraction of predictions on the right side of 0.5
pub fn binary_accuracy(predictions: ArrayView1<'_, f32>, labels: ArrayView1<'_, f32>) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(labels.iter())
        .filter(|(&p, &y)| (p > 0.5) == (y > 0.5))
        .count();
    correct as f64 / predictions.len() as f64
}

/// Index at which the validation rows start
pub fn validation_split_index(samples: usize) -> usize {
    (samples as f64 * (1.0 - VALIDATION_SPLIT)).floor() as usize
}

fn diverged(epoch: usize) -> DetectorError {
    warn!(epoch, "Training diverged, restoring previous weights");
    DetectorError::NonFiniteLoss { epoch }
}

/// Owns the optimizer state shared by successive training calls
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    optimizer: Adam,
}

impl Trainer {
    pub fn new() -> Self {
        Self {
            optimizer: Adam::new(),
        }
    }

    /// Optimizer steps applied across all training calls
    pub fn steps(&self) -> u64 {
        self.optimizer.iterations()
    }

    /// Fit `network` to `features` (n, 10) and binary `labels` (n).
    pub fn fit<R: Rng + ?Sized>(
        &mut self,
        network: &mut FraudNetwork,
        features: &Array2<f32>,
        labels: &Array1<f32>,
        rng: &mut R,
    ) -> Result<TrainingHistory> {
        let samples = features.nrows();
        if samples == 0 {
            return Err(DetectorError::EmptyTrainingSet);
        }
        if samples != labels.len() {
            return Err(DetectorError::LengthMismatch {
                credentials: samples,
                labels: labels.len(),
            });
        }

        let split = validation_split_index(samples);
        if split == 0 {
            return Err(DetectorError::InsufficientSamples { samples });
        }

        let train_x = features.slice(s![..split, ..]);
        let train_y = labels.slice(s![..split]);
        let val_x = features.slice(s![split.., ..]);
        let val_y = labels.slice(s![split..]);

        info!(
            train_samples = split,
            val_samples = samples - split,
            epochs = EPOCHS,
            batch_size = BATCH_SIZE,
            "Training fraud network"
        );

        // Restored if the run diverges, so a failed call changes nothing
        let network_snapshot = network.clone();
        let optimizer_snapshot = self.optimizer.clone();

        let mut history = TrainingHistory::default();
        let mut order: Vec<usize> = (0..split).collect();

        for epoch in 1..=EPOCHS {
            order.shuffle(rng);

            let mut loss_sum = 0.0;
            let mut accuracy_sum = 0.0;

            for batch in order.chunks(BATCH_SIZE) {
                let x = train_x.select(Axis(0), batch);
                let y = train_y.select(Axis(0), batch);
                let size = batch.len();

                let pass = network.forward_train(x, rng);
                let predictions = pass.output().column(0).to_owned();
                loss_sum += binary_cross_entropy(predictions.view(), y.view()) * size as f64;
                accuracy_sum += binary_accuracy(predictions.view(), y.view()) * size as f64;

                let delta = ((predictions - &y) / size as f32).insert_axis(Axis(1));
                let gradients = pass.backward(delta);
                if !loss_sum.is_finite() {
                    *network = network_snapshot;
                    self.optimizer = optimizer_snapshot;
                    return Err(diverged(epoch));
                }
                self.optimizer.step(network, &gradients);
            }

            let val_predictions = network.predict(val_x);
            let metrics = EpochMetrics {
                epoch,
                loss: loss_sum / split as f64,
                accuracy: accuracy_sum / split as f64,
                val_loss: binary_cross_entropy(val_predictions.view(), val_y),
                val_accuracy: binary_accuracy(val_predictions.view(), val_y),
            };

            if !metrics.val_loss.is_finite() || !network.is_finite() {
                *network = network_snapshot;
                self.optimizer = optimizer_snapshot;
                return Err(diverged(epoch));
            }

            info!(
                epoch = metrics.epoch,
                loss = metrics.loss,
                accuracy = metrics.accuracy,
                val_loss = metrics.val_loss,
                val_accuracy = metrics.val_accuracy,
                "Epoch complete"
            );
            history.epochs.push(metrics);
        }

        debug!(steps = self.optimizer.iterations(), "Training finished");
        Ok(history)
    }
}
