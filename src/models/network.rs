//! Dense feed-forward network used for fraud scoring.
//!
//! The topology is fixed: 10 → dense(64, relu) → dropout(0.2) →
//! dense(32, relu) → dropout(0.2) → dense(1, sigmoid).

use crate::feature_extractor::FEATURE_COUNT;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// Units in each hidden dense layer
pub const HIDDEN_UNITS: [usize; 2] = [64, 32];

/// Fraction of activations dropped after each hidden layer during training
pub const DROPOUT_RATE: f32 = 0.2;

/// Element-wise activation applied after a dense layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Sigmoid,
}

impl Activation {
    fn apply(self, z: &mut Array2<f32>) {
        match self {
            Activation::Relu => z.mapv_inplace(|v| v.max(0.0)),
            Activation::Sigmoid => z.mapv_inplace(sigmoid),
        }
    }

    /// Multiply `delta` by the activation derivative, given the layer output.
    fn backprop(self, delta: &mut Array2<f32>, output: &Array2<f32>) {
        match self {
            Activation::Relu => delta.zip_mut_with(output, |d, &out| {
                if out <= 0.0 {
                    *d = 0.0;
                }
            }),
            Activation::Sigmoid => delta.zip_mut_with(output, |d, &out| *d *= out * (1.0 - out)),
        }
    }
}

/// Logistic function, split on sign so `exp` never overflows.
pub fn sigmoid(z: f32) -> f32 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Fully connected layer: `activation(x · W + b)`
#[derive(Debug, Clone)]
pub struct DenseLayer {
    /// Kernel of shape (inputs, units)
    weights: Array2<f32>,
    /// Bias of shape (units)
    bias: Array1<f32>,
    activation: Activation,
}

impl DenseLayer {
    /// Glorot-uniform kernel, zero bias.
    pub fn glorot_uniform<R: Rng + ?Sized>(
        inputs: usize,
        units: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        let limit = (6.0 / (inputs + units) as f32).sqrt();
        let dist = Uniform::new_inclusive(-limit, limit);
        Self {
            weights: Array2::from_shape_fn((inputs, units), |_| dist.sample(rng)),
            bias: Array1::zeros(units),
            activation,
        }
    }

    pub fn forward(&self, input: ArrayView2<'_, f32>) -> Array2<f32> {
        let mut z = input.dot(&self.weights) + &self.bias;
        self.activation.apply(&mut z);
        z
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    pub fn bias(&self) -> &Array1<f32> {
        &self.bias
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn input_dim(&self) -> usize {
        self.weights.nrows()
    }

    pub fn units(&self) -> usize {
        self.weights.ncols()
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }

    pub(crate) fn parameters_mut(&mut self) -> (&mut Array2<f32>, &mut Array1<f32>) {
        (&mut self.weights, &mut self.bias)
    }
}

/// Inverted dropout: survivors are scaled by `1 / (1 - rate)` during training,
/// and the layer is the identity at inference.
#[derive(Debug, Clone, Copy)]
pub struct Dropout {
    rate: f32,
}

impl Dropout {
    pub fn new(rate: f32) -> Self {
        Self { rate }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    fn mask<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Array2<f32> {
        let keep = 1.0 / (1.0 - self.rate);
        Array2::from_shape_fn(shape, |_| {
            if rng.gen::<f32>() < self.rate {
                0.0
            } else {
                keep
            }
        })
    }
}

#[derive(Debug, Clone)]
pub enum Layer {
    Dense(DenseLayer),
    Dropout(Dropout),
}

/// Gradients for one dense layer
#[derive(Debug, Clone)]
pub struct DenseGradients {
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
}

enum LayerCache<'a> {
    Dense {
        layer: &'a DenseLayer,
        input: Array2<f32>,
        output: Array2<f32>,
    },
    Dropout {
        mask: Array2<f32>,
    },
}

/// Activations recorded by a training-mode forward pass
pub struct ForwardPass<'a> {
    caches: Vec<LayerCache<'a>>,
    output: Array2<f32>,
}

impl<'a> ForwardPass<'a> {
    /// Network output, shape (batch, 1)
    pub fn output(&self) -> &Array2<f32> {
        &self.output
    }

    /// Backpropagate from the output layer.
    ///
    /// `output_delta` is the loss gradient with respect to the output layer's
    /// pre-activation (for sigmoid + binary cross-entropy this is
    /// `(p - y) / batch`). Gradients come back in forward layer order.
    pub fn backward(self, output_delta: Array2<f32>) -> Vec<DenseGradients> {
        let mut delta = output_delta;
        let mut gradients = Vec::new();
        let mut at_output = true;

        for cache in self.caches.iter().rev() {
            match cache {
                LayerCache::Dense {
                    layer,
                    input,
                    output,
                } => {
                    if !at_output {
                        layer.activation.backprop(&mut delta, output);
                    }
                    let weights = input.t().dot(&delta);
                    let bias = delta.sum_axis(Axis(0));
                    delta = delta.dot(&layer.weights.t());
                    gradients.push(DenseGradients { weights, bias });
                    at_output = false;
                }
                LayerCache::Dropout { mask } => {
                    delta *= mask;
                }
            }
        }

        gradients.reverse();
        gradients
    }
}

/// The fraud scoring network
#[derive(Debug, Clone)]
pub struct FraudNetwork {
    layers: Vec<Layer>,
}

impl FraudNetwork {
    /// Build the fixed topology with freshly initialized weights.
    pub fn build<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let [first, second] = HIDDEN_UNITS;
        let layers = vec![
            Layer::Dense(DenseLayer::glorot_uniform(
                FEATURE_COUNT,
                first,
                Activation::Relu,
                rng,
            )),
            Layer::Dropout(Dropout::new(DROPOUT_RATE)),
            Layer::Dense(DenseLayer::glorot_uniform(
                first,
                second,
                Activation::Relu,
                rng,
            )),
            Layer::Dropout(Dropout::new(DROPOUT_RATE)),
            Layer::Dense(DenseLayer::glorot_uniform(
                second,
                1,
                Activation::Sigmoid,
                rng,
            )),
        ];
        Self { layers }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Dense layers in forward order
    pub fn dense_layers(&self) -> impl Iterator<Item = &DenseLayer> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::Dense(dense) => Some(dense),
            Layer::Dropout(_) => None,
        })
    }

    pub(crate) fn dense_layers_mut(&mut self) -> impl Iterator<Item = &mut DenseLayer> {
        self.layers.iter_mut().filter_map(|layer| match layer {
            Layer::Dense(dense) => Some(dense),
            Layer::Dropout(_) => None,
        })
    }

    pub fn parameter_count(&self) -> usize {
        self.dense_layers().map(DenseLayer::parameter_count).sum()
    }

    /// Whether every weight and bias is a finite number
    pub fn is_finite(&self) -> bool {
        self.dense_layers().all(|layer| {
            layer
                .weights()
                .iter()
                .chain(layer.bias().iter())
                .all(|v| v.is_finite())
        })
    }

    /// Inference-mode forward pass. Returns one probability per input row.
    pub fn predict(&self, input: ArrayView2<'_, f32>) -> Array1<f32> {
        let mut activations = input.to_owned();
        for layer in &self.layers {
            if let Layer::Dense(dense) = layer {
                activations = dense.forward(activations.view());
            }
        }
        activations.column(0).to_owned()
    }

    /// Training-mode forward pass with dropout active.
    pub fn forward_train<R: Rng + ?Sized>(&self, input: Array2<f32>, rng: &mut R) -> ForwardPass<'_> {
        let mut caches = Vec::with_capacity(self.layers.len());
        let mut activations = input;

        for layer in &self.layers {
            match layer {
                Layer::Dense(dense) => {
                    let output = dense.forward(activations.view());
                    caches.push(LayerCache::Dense {
                        layer: dense,
                        input: activations,
                        output: output.clone(),
                    });
                    activations = output;
                }
                Layer::Dropout(dropout) => {
                    let mask = dropout.mask(activations.dim(), rng);
                    activations *= &mask;
                    caches.push(LayerCache::Dropout { mask });
                }
            }
        }

        ForwardPass {
            caches,
            output: activations,
        }
    }
}
