//! Learning agents for a turn-based robot arena
//!
//! This crate provides:
//! - State quantization of arena observations into bounded integer keys
//! - A tabular Q-learning control loop (`Scan → Select → Perform → AwaitReward`)
//! - Wave tracking, wall smoothing and intercept geometry for the action plans
//! - A backpropagation-trained feed-forward network, usable as a value function
//! - Lookup-table and network persistence (CSV, MessagePack, JSON)

pub mod adapters;
pub mod agent;
pub mod cli;
pub mod error;
pub mod export;
pub mod geometry;
pub mod nn;
pub mod ports;
pub mod q_learning;
pub mod quantizer;
pub mod types;
pub mod waves;

pub use agent::{AgentConfig, CardinalAgent, ControlLoop, SurfAgent};
pub use error::{Error, Result};
pub use nn::{NetworkConfig, NeuralNet, Trainer, TrainerConfig};
pub use q_learning::{LookupTable, StateActionKey};
pub use types::{Command, Observation, RewardEvent};
