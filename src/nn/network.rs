//! Single-hidden-layer feed-forward network with momentum backpropagation

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{Result, error::Error, nn::Activation};

/// When computed weight changes are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// After every training sample
    #[default]
    Immediate,
    /// Accumulated and applied once per epoch by [`NeuralNet::end_epoch`]
    Batch,
}

/// Shape and learning parameters of a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub inputs: usize,
    pub hidden: usize,
    pub outputs: usize,
    /// Learning rate η
    pub learning_rate: f64,
    /// Momentum μ
    pub momentum: f64,
    pub activation: Activation,
    pub update_mode: UpdateMode,
    /// Initial weights are drawn uniformly from `[-weight_range, weight_range]`
    pub weight_range: f64,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            inputs: 2,
            hidden: 4,
            outputs: 1,
            learning_rate: 0.2,
            momentum: 0.9,
            activation: Activation::Unipolar,
            update_mode: UpdateMode::Immediate,
            weight_range: 0.5,
            seed: None,
        }
    }
}

impl NetworkConfig {
    pub fn new(inputs: usize, hidden: usize, outputs: usize) -> Self {
        Self {
            inputs,
            hidden,
            outputs,
            ..Self::default()
        }
    }

    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    pub fn with_weight_range(mut self, range: f64) -> Self {
        self.weight_range = range;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.inputs == 0 || self.hidden == 0 || self.outputs == 0 {
            return Err(Error::invalid_config(format!(
                "network shape {}-{}-{} has an empty layer",
                self.inputs, self.hidden, self.outputs
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::invalid_config(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(Error::invalid_config(format!(
                "momentum must be in [0, 1), got {}",
                self.momentum
            )));
        }
        if !(self.weight_range.is_finite() && self.weight_range >= 0.0) {
            return Err(Error::invalid_config(format!(
                "weight range must be non-negative, got {}",
                self.weight_range
            )));
        }
        Ok(())
    }
}

/// One weight addressed by layer and endpoints.
///
/// `layer` 0 connects inputs to hidden units, 1 connects hidden units to
/// outputs. `from` 0 is the bias unit and `from = i + 1` is source unit `i`;
/// `to` is the 0-based target unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionWeight {
    pub layer: u8,
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

/// Fully connected layer. Row `to` holds the bias weight followed by one
/// weight per source unit.
#[derive(Debug, Clone, PartialEq)]
struct Layer {
    sources: usize,
    units: usize,
    weights: Vec<f64>,
    previous_delta: Vec<f64>,
    accumulated: Vec<f64>,
}

impl Layer {
    fn new(sources: usize, units: usize) -> Self {
        let size = (sources + 1) * units;
        Self {
            sources,
            units,
            weights: vec![0.0; size],
            previous_delta: vec![0.0; size],
            accumulated: vec![0.0; size],
        }
    }

    fn index(&self, from: usize, to: usize) -> usize {
        to * (self.sources + 1) + from
    }

    fn weight(&self, from: usize, to: usize) -> f64 {
        self.weights[self.index(from, to)]
    }

    fn reset_history(&mut self) {
        self.previous_delta.fill(0.0);
        self.accumulated.fill(0.0);
    }

    fn activate(&self, input: &[f64], activation: Activation) -> Vec<f64> {
        (0..self.units)
            .map(|to| {
                let row = &self.weights[self.index(0, to)..self.index(0, to + 1)];
                let net = row[0]
                    + row[1..]
                        .iter()
                        .zip(input)
                        .map(|(weight, x)| weight * x)
                        .sum::<f64>();
                activation.apply(net)
            })
            .collect()
    }

    /// Record `Δw = η δ x` for every connection into each unit.
    fn adjust(&mut self, input: &[f64], deltas: &[f64], eta: f64, momentum: f64, mode: UpdateMode) {
        for (to, &delta) in deltas.iter().enumerate() {
            for from in 0..=self.sources {
                let x = if from == 0 { 1.0 } else { input[from - 1] };
                let index = self.index(from, to);
                let change = eta * delta * x;
                match mode {
                    UpdateMode::Immediate => {
                        self.weights[index] += change + momentum * self.previous_delta[index];
                        self.previous_delta[index] = change;
                    }
                    UpdateMode::Batch => self.accumulated[index] += change,
                }
            }
        }
    }

    fn apply_accumulated(&mut self, momentum: f64) {
        for index in 0..self.weights.len() {
            let change = self.accumulated[index];
            self.weights[index] += change + momentum * self.previous_delta[index];
            self.previous_delta[index] = change;
            self.accumulated[index] = 0.0;
        }
    }
}

/// Activations of one forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
    pub hidden: Vec<f64>,
    pub output: Vec<f64>,
}

/// Input → hidden → output perceptron trained by backpropagation.
#[derive(Debug, Clone)]
pub struct NeuralNet {
    config: NetworkConfig,
    hidden: Layer,
    output: Layer,
    rng: StdRng,
}

impl NeuralNet {
    /// Build a network with randomly initialised weights.
    pub fn new(config: NetworkConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let mut net = Self {
            hidden: Layer::new(config.inputs, config.hidden),
            output: Layer::new(config.hidden, config.outputs),
            config,
            rng,
        };
        net.initialize_weights();
        Ok(net)
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Redraw every weight from `[-r, r]` and clear momentum history.
    pub fn initialize_weights(&mut self) {
        let range = self.config.weight_range;
        for layer in [&mut self.hidden, &mut self.output] {
            for weight in layer.weights.iter_mut() {
                *weight = if range > 0.0 {
                    self.rng.random_range(-range..=range)
                } else {
                    0.0
                };
            }
            layer.reset_history();
        }
    }

    /// Set every weight to `weight` and clear momentum history.
    pub fn set_all_weights(&mut self, weight: f64) {
        for layer in [&mut self.hidden, &mut self.output] {
            layer.weights.fill(weight);
            layer.reset_history();
        }
    }

    fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.config.inputs {
            return Err(Error::DimensionMismatch {
                what: "network inputs",
                expected: self.config.inputs,
                got: input.len(),
            });
        }
        Ok(())
    }

    pub fn forward(&self, input: &[f64]) -> Result<ForwardPass> {
        self.check_input(input)?;
        let activation = self.config.activation;
        let hidden = self.hidden.activate(input, activation);
        let output = self.output.activate(&hidden, activation);
        Ok(ForwardPass { hidden, output })
    }

    /// Network outputs for `input`, without learning.
    pub fn output_for(&self, input: &[f64]) -> Result<Vec<f64>> {
        Ok(self.forward(input)?.output)
    }

    /// One backpropagation step towards `target`.
    ///
    /// Returns the outputs of the forward pass that preceded the update.
    pub fn train(&mut self, input: &[f64], target: &[f64]) -> Result<Vec<f64>> {
        if target.len() != self.config.outputs {
            return Err(Error::DimensionMismatch {
                what: "network targets",
                expected: self.config.outputs,
                got: target.len(),
            });
        }
        let pass = self.forward(input)?;
        let activation = self.config.activation;

        let output_deltas: Vec<f64> = pass
            .output
            .iter()
            .zip(target)
            .map(|(&y, &t)| (t - y) * activation.derivative(y))
            .collect();

        // Hidden deltas use the output weights from before this update.
        let hidden_deltas: Vec<f64> = pass
            .hidden
            .iter()
            .enumerate()
            .map(|(j, &h)| {
                let back: f64 = output_deltas
                    .iter()
                    .enumerate()
                    .map(|(k, delta)| delta * self.output.weight(j + 1, k))
                    .sum();
                back * activation.derivative(h)
            })
            .collect();

        let NetworkConfig {
            learning_rate,
            momentum,
            update_mode,
            ..
        } = self.config;
        self.output
            .adjust(&pass.hidden, &output_deltas, learning_rate, momentum, update_mode);
        self.hidden
            .adjust(input, &hidden_deltas, learning_rate, momentum, update_mode);

        Ok(pass.output)
    }

    /// Apply accumulated changes in batch mode; no-op when updating immediately.
    pub fn end_epoch(&mut self) {
        if self.config.update_mode == UpdateMode::Batch {
            let momentum = self.config.momentum;
            self.hidden.apply_accumulated(momentum);
            self.output.apply_accumulated(momentum);
        }
    }

    /// Every weight, hidden layer first, each row bias first.
    pub fn weights(&self) -> Vec<ConnectionWeight> {
        let mut weights = Vec::with_capacity(self.hidden.weights.len() + self.output.weights.len());
        for (layer_index, layer) in [(0u8, &self.hidden), (1u8, &self.output)] {
            for to in 0..layer.units {
                for from in 0..=layer.sources {
                    weights.push(ConnectionWeight {
                        layer: layer_index,
                        from,
                        to,
                        weight: layer.weight(from, to),
                    });
                }
            }
        }
        weights
    }

    /// Overwrite the listed weights and clear momentum history.
    ///
    /// Every connection is checked first; on error the network is unchanged.
    pub fn set_weights(&mut self, weights: &[ConnectionWeight]) -> Result<()> {
        for connection in weights {
            let layer = self.layer(connection.layer)?;
            if connection.from > layer.sources || connection.to >= layer.units {
                return Err(Error::invalid_config(format!(
                    "connection {} -> {} is outside layer {}",
                    connection.from, connection.to, connection.layer
                )));
            }
        }
        for connection in weights {
            let layer = match connection.layer {
                0 => &mut self.hidden,
                _ => &mut self.output,
            };
            let index = layer.index(connection.from, connection.to);
            layer.weights[index] = connection.weight;
        }
        self.hidden.reset_history();
        self.output.reset_history();
        Ok(())
    }

    fn layer(&self, index: u8) -> Result<&Layer> {
        match index {
            0 => Ok(&self.hidden),
            1 => Ok(&self.output),
            other => Err(Error::invalid_config(format!(
                "network has no weight layer {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xor_net() -> NeuralNet {
        NeuralNet::new(NetworkConfig::default().with_seed(1)).unwrap()
    }

    #[test]
    fn test_constant_weight_forward_pass() {
        let mut net = xor_net();
        net.set_all_weights(0.2);
        let cases = [
            ([0.0, 0.0], 0.6547),
            ([0.0, 1.0], 0.6635),
            ([1.0, 0.0], 0.6635),
            ([1.0, 1.0], 0.6718),
        ];
        for (input, expected) in cases {
            let output = net.output_for(&input).unwrap()[0];
            assert!((output - expected).abs() < 1e-3, "{input:?} -> {output}");
        }
    }

    #[test]
    fn test_zero_weights_give_half() {
        let mut net = xor_net();
        net.set_all_weights(0.0);
        assert_eq!(net.output_for(&[1.0, 0.0]).unwrap(), vec![0.5]);
    }

    #[test]
    fn test_initial_weights_within_range() {
        let net = NeuralNet::new(NetworkConfig::default().with_weight_range(0.3).with_seed(9)).unwrap();
        assert!(net.weights().iter().all(|w| w.weight.abs() <= 0.3));
        assert_eq!(net.weights().len(), 4 * 3 + 5);
    }

    #[test]
    fn test_training_step_moves_towards_target() {
        let mut net = xor_net();
        let before = net.output_for(&[1.0, 0.0]).unwrap()[0];
        for _ in 0..20 {
            net.train(&[1.0, 0.0], &[1.0]).unwrap();
        }
        let after = net.output_for(&[1.0, 0.0]).unwrap()[0];
        assert!(after > before);
    }

    #[test]
    fn test_batch_mode_defers_updates() {
        let config = NetworkConfig::default()
            .with_update_mode(UpdateMode::Batch)
            .with_seed(4);
        let mut net = NeuralNet::new(config).unwrap();
        let weights = net.weights();
        net.train(&[1.0, 1.0], &[0.0]).unwrap();
        assert_eq!(net.weights(), weights);
        net.end_epoch();
        assert_ne!(net.weights(), weights);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut net = xor_net();
        assert!(matches!(
            net.output_for(&[1.0]),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(matches!(
            net.train(&[1.0, 0.0], &[1.0, 0.0]),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_weight_snapshot_roundtrip() {
        let source = xor_net();
        let mut target = NeuralNet::new(NetworkConfig::default().with_seed(2)).unwrap();
        target.set_weights(&source.weights()).unwrap();
        assert_eq!(target.weights(), source.weights());
        assert!(target
            .set_weights(&[ConnectionWeight { layer: 2, from: 0, to: 0, weight: 1.0 }])
            .is_err());
    }

    #[test]
    fn test_rejected_weights_leave_network_unchanged() {
        let mut net = xor_net();
        let before = net.weights();
        let batch = [
            ConnectionWeight { layer: 0, from: 0, to: 0, weight: 9.0 },
            ConnectionWeight { layer: 1, from: 7, to: 0, weight: 9.0 },
        ];
        assert!(matches!(
            net.set_weights(&batch),
            Err(Error::InvalidConfiguration { .. })
        ));
        assert_eq!(net.weights(), before);
    }

    #[test]
    fn test_invalid_shape_is_rejected() {
        assert!(NeuralNet::new(NetworkConfig::new(2, 0, 1)).is_err());
        assert!(NeuralNet::new(NetworkConfig::default().with_momentum(1.0)).is_err());
    }
}
