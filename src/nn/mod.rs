//! Feed-forward network trained by backpropagation
//!
//! - [`NeuralNet`]: one hidden layer, sigmoid units, momentum updates
//! - [`Trainer`]: epoch loop with an error target and [`EpochObserver`] hooks
//! - [`NetworkValueFunction`]: a network behind the agent's value-function port
//! - [`distill`]: fit a network to a learned lookup table
//!
//! [`EpochObserver`]: crate::ports::EpochObserver

pub mod activation;
pub mod distill;
pub mod network;
pub mod observers;
pub mod serialization;
pub mod trainer;
pub mod value_function;

pub use activation::Activation;
pub use distill::{distill, distill_samples, value_scale_for};
pub use network::{ConnectionWeight, ForwardPass, NetworkConfig, NeuralNet, UpdateMode};
pub use observers::{ErrorLogObserver, ProgressObserver};
pub use serialization::NetworkSnapshot;
pub use trainer::{ErrorMetric, Sample, Trainer, TrainerConfig, TrainingReport, xor_patterns};
pub use value_function::NetworkValueFunction;
