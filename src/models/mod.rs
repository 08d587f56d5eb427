//! Neural network components: layers, optimizer and training loop

pub mod network;
pub mod optimizer;
pub mod training;

pub use network::FraudNetwork;
pub use optimizer::Adam;
pub use training::{EpochMetrics, Trainer, TrainingHistory};
