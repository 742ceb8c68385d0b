//! Temporal-difference back-step

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Result, error::Error, ports::ValueFunction, q_learning::StateActionKey};

/// Learning rate and discount factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TdParams {
    /// Learning rate α
    pub alpha: f64,
    /// Discount factor γ
    pub gamma: f64,
}

impl Default for TdParams {
    fn default() -> Self {
        Self {
            alpha: 0.7,
            gamma: 0.9,
        }
    }
}

impl TdParams {
    pub fn new(alpha: f64, gamma: f64) -> Result<Self> {
        let params = Self { alpha, gamma };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(Error::invalid_config(format!(
                "alpha must be in [0, 1], got {}",
                self.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::invalid_config(format!(
                "gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }
        Ok(())
    }

    /// `α (r + γ current_q − previous_q)`
    pub fn error(&self, previous_q: f64, current_q: f64, reward: f64) -> f64 {
        self.alpha * (reward + self.gamma * current_q - previous_q)
    }
}

/// One learning step: move `previous_key` towards the TD target.
///
/// ```text
/// error = α (r + γ current_q − previous_q)
/// V(previous_key) ← previous_q + error
/// ```
///
/// Returns the applied error.
pub fn back_step<V: ValueFunction + ?Sized>(
    values: &mut V,
    params: &TdParams,
    previous_key: &StateActionKey,
    previous_q: f64,
    current_q: f64,
    reward: f64,
) -> Result<f64> {
    let error = params.error(previous_q, current_q, reward);
    values.update(previous_key, previous_q + error)?;
    debug!(key = %previous_key, reward, error, "back-step");
    Ok(error)
}
