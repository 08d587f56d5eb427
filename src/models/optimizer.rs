//! Adam optimizer

use crate::models::network::{DenseGradients, FraudNetwork};
use ndarray::{Array, Array1, Array2, Dimension, Zip};

pub const LEARNING_RATE: f32 = 0.001;
pub const BETA_1: f32 = 0.9;
pub const BETA_2: f32 = 0.999;
pub const EPSILON: f32 = 1e-7;

/// First and second moment estimates for one dense layer
#[derive(Debug, Clone)]
struct Moments {
    m_weights: Array2<f32>,
    v_weights: Array2<f32>,
    m_bias: Array1<f32>,
    v_bias: Array1<f32>,
}

impl Moments {
    fn zeros_like(gradients: &DenseGradients) -> Self {
        Self {
            m_weights: Array2::zeros(gradients.weights.raw_dim()),
            v_weights: Array2::zeros(gradients.weights.raw_dim()),
            m_bias: Array1::zeros(gradients.bias.raw_dim()),
            v_bias: Array1::zeros(gradients.bias.raw_dim()),
        }
    }
}

/// Adaptive moment estimation with bias-corrected step size.
///
/// Moment state persists across calls, so repeated training sessions
/// continue where the previous one stopped.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta_1: f32,
    beta_2: f32,
    epsilon: f32,
    iterations: u64,
    moments: Vec<Moments>,
}

impl Adam {
    pub fn new() -> Self {
        Self {
            learning_rate: LEARNING_RATE,
            beta_1: BETA_1,
            beta_2: BETA_2,
            epsilon: EPSILON,
            iterations: 0,
            moments: Vec::new(),
        }
    }

    /// Number of update steps applied so far
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Apply one update. `gradients` are in forward dense-layer order.
    pub fn step(&mut self, network: &mut FraudNetwork, gradients: &[DenseGradients]) {
        if self.moments.len() != gradients.len() {
            self.moments = gradients.iter().map(Moments::zeros_like).collect();
        }

        self.iterations += 1;
        let t = self.iterations as i32;
        let step_size = self.learning_rate * (1.0 - self.beta_2.powi(t)).sqrt()
            / (1.0 - self.beta_1.powi(t));

        let rule = UpdateRule {
            step_size,
            beta_1: self.beta_1,
            beta_2: self.beta_2,
            epsilon: self.epsilon,
        };

        for ((layer, grads), moments) in network
            .dense_layers_mut()
            .zip(gradients)
            .zip(self.moments.iter_mut())
        {
            let (weights, bias) = layer.parameters_mut();
            rule.apply(
                weights,
                &grads.weights,
                &mut moments.m_weights,
                &mut moments.v_weights,
            );
            rule.apply(bias, &grads.bias, &mut moments.m_bias, &mut moments.v_bias);
        }
    }
}

/// Hyperparameters for a single update step
#[derive(Debug, Clone, Copy)]
struct UpdateRule {
    step_size: f32,
    beta_1: f32,
    beta_2: f32,
    epsilon: f32,
}

impl UpdateRule {
    fn apply<D: Dimension>(
        self,
        param: &mut Array<f32, D>,
        grad: &Array<f32, D>,
        m: &mut Array<f32, D>,
        v: &mut Array<f32, D>,
    ) {
        Zip::from(param)
            .and(grad)
            .and(m)
            .and(v)
            .for_each(|p, &g, m, v| {
                *m += (g - *m) * (1.0 - self.beta_1);
                *v += (g * g - *v) * (1.0 - self.beta_2);
                *p -= self.step_size * *m / (v.sqrt() + self.epsilon);
            });
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new()
    }
}
