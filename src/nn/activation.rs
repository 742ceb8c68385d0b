//! Sigmoid activations

use serde::{Deserialize, Serialize};

/// Logistic activation shared by the hidden and output layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// `1 / (1 + e^-x)`, range `(0, 1)`
    #[default]
    Unipolar,
    /// `2 / (1 + e^-x) - 1`, range `(-1, 1)`
    Bipolar,
}

impl Activation {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Unipolar => 1.0 / (1.0 + (-x).exp()),
            Activation::Bipolar => 2.0 / (1.0 + (-x).exp()) - 1.0,
        }
    }

    /// Derivative expressed in terms of the unit's output `y`.
    pub fn derivative(self, y: f64) -> f64 {
        match self {
            Activation::Unipolar => y * (1.0 - y),
            Activation::Bipolar => 0.5 * (1.0 - y * y),
        }
    }

    /// Closed output range `(low, high)`.
    pub fn range(self) -> (f64, f64) {
        match self {
            Activation::Unipolar => (0.0, 1.0),
            Activation::Bipolar => (-1.0, 1.0),
        }
    }
}
