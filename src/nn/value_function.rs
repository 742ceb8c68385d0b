//! A network standing in for the lookup table

use crate::{
    Result,
    error::Error,
    nn::NeuralNet,
    ports::ValueFunction,
    q_learning::StateActionKey,
    quantizer::KeySpace,
};

/// Scalar-output network that reads state-action keys.
///
/// Keys are normalised by the key space into `[-1, 1]` per component. The
/// network output is multiplied by `value_scale` to give a Q-value, and
/// updates train towards `value / value_scale` clamped into the activation
/// range.
#[derive(Debug, Clone)]
pub struct NetworkValueFunction {
    network: NeuralNet,
    key_space: KeySpace,
    value_scale: f64,
}

impl NetworkValueFunction {
    pub fn new(network: NeuralNet, key_space: KeySpace, value_scale: f64) -> Result<Self> {
        let config = network.config();
        if config.outputs != 1 {
            return Err(Error::DimensionMismatch {
                what: "value network outputs",
                expected: 1,
                got: config.outputs,
            });
        }
        if config.inputs != key_space.arity() {
            return Err(Error::DimensionMismatch {
                what: "value network inputs",
                expected: key_space.arity(),
                got: config.inputs,
            });
        }
        if !(value_scale.is_finite() && value_scale > 0.0) {
            return Err(Error::invalid_config(format!(
                "value scale must be positive, got {value_scale}"
            )));
        }
        Ok(Self {
            network,
            key_space,
            value_scale,
        })
    }

    pub fn network(&self) -> &NeuralNet {
        &self.network
    }

    pub fn key_space(&self) -> &KeySpace {
        &self.key_space
    }

    pub fn value_scale(&self) -> f64 {
        self.value_scale
    }

    pub fn into_network(self) -> NeuralNet {
        self.network
    }

    fn inputs(&self, key: &StateActionKey) -> Result<Vec<f64>> {
        self.key_space.normalize(key.components())
    }
}

impl ValueFunction for NetworkValueFunction {
    fn value_of(&self, key: &StateActionKey) -> f64 {
        // Arity is fixed at construction, so only foreign keys read as zero.
        self.inputs(key)
            .and_then(|input| self.network.output_for(&input))
            .map(|output| output[0] * self.value_scale)
            .unwrap_or(0.0)
    }

    fn update(&mut self, key: &StateActionKey, value: f64) -> Result<()> {
        let input = self.inputs(key)?;
        let (low, high) = self.network.config().activation.range();
        let target = (value / self.value_scale).clamp(low, high);
        self.network.train(&input, &[target])?;
        self.network.end_epoch();
        Ok(())
    }

    fn name(&self) -> &str {
        "network"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        nn::{Activation, NetworkConfig},
        quantizer::DimensionBounds,
    };

    fn space() -> KeySpace {
        KeySpace::new(vec![DimensionBounds::new(-3, 3), DimensionBounds::new(0, 4)])
    }

    fn value_function() -> NetworkValueFunction {
        let net = NeuralNet::new(
            NetworkConfig::new(2, 6, 1)
                .with_activation(Activation::Bipolar)
                .with_seed(5),
        )
        .unwrap();
        NetworkValueFunction::new(net, space(), 10.0).unwrap()
    }

    #[test]
    fn test_shape_checks() {
        let wide = NeuralNet::new(NetworkConfig::new(3, 4, 1).with_seed(1)).unwrap();
        assert!(NetworkValueFunction::new(wide, space(), 1.0).is_err());

        let two_outputs = NeuralNet::new(NetworkConfig::new(2, 4, 2).with_seed(1)).unwrap();
        assert!(NetworkValueFunction::new(two_outputs, space(), 1.0).is_err());

        let net = NeuralNet::new(NetworkConfig::new(2, 4, 1).with_seed(1)).unwrap();
        assert!(NetworkValueFunction::new(net, space(), 0.0).is_err());
    }

    #[test]
    fn test_updates_pull_estimate_towards_value() {
        let mut values = value_function();
        let key = StateActionKey::new(vec![2, 1]);
        for _ in 0..500 {
            values.update(&key, 5.0).unwrap();
        }
        assert!((values.value_of(&key) - 5.0).abs() < 1.0);
    }

    #[test]
    fn test_value_bounded_by_scale() {
        let mut values = value_function();
        let key = StateActionKey::new(vec![-3, 0]);
        for _ in 0..50 {
            values.update(&key, 1_000.0).unwrap();
        }
        assert!(values.value_of(&key) <= 10.0);
    }

    #[test]
    fn test_foreign_key_reads_zero() {
        let values = value_function();
        assert_eq!(values.value_of(&StateActionKey::new(vec![1])), 0.0);
    }
}
