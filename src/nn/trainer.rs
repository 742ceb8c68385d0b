//! Epoch loop over a fixed sample set

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Result,
    error::Error,
    nn::{Activation, NeuralNet},
    ports::EpochObserver,
};

/// One regression example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

impl Sample {
    pub fn new(input: Vec<f64>, target: Vec<f64>) -> Self {
        Self { input, target }
    }
}

/// How the per-epoch error is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMetric {
    /// Σ (t − y)² over every sample and output
    #[default]
    SumSquared,
    /// `sqrt(Σ (t − y)² / n)` over every sample and output
    Rms,
}

impl ErrorMetric {
    fn finish(self, squared_sum: f64, count: usize) -> f64 {
        match self {
            ErrorMetric::SumSquared => squared_sum,
            ErrorMetric::Rms if count == 0 => 0.0,
            ErrorMetric::Rms => (squared_sum / count as f64).sqrt(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub max_epochs: usize,
    /// Training stops once the epoch error is at or below this value
    pub target_error: f64,
    pub metric: ErrorMetric,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_epochs: 10_000,
            target_error: 0.05,
            metric: ErrorMetric::SumSquared,
        }
    }
}

impl TrainerConfig {
    pub fn with_max_epochs(mut self, epochs: usize) -> Self {
        self.max_epochs = epochs;
        self
    }

    pub fn with_target_error(mut self, target: f64) -> Self {
        self.target_error = target;
        self
    }

    pub fn with_metric(mut self, metric: ErrorMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_epochs == 0 {
            return Err(Error::invalid_config("max epochs must be at least 1"));
        }
        if !(self.target_error.is_finite() && self.target_error >= 0.0) {
            return Err(Error::invalid_config(format!(
                "target error must be non-negative, got {}",
                self.target_error
            )));
        }
        Ok(())
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Epochs actually run
    pub epochs: usize,
    pub final_error: f64,
    pub converged: bool,
    /// Error after each epoch, in order
    pub errors: Vec<f64>,
}

/// Runs epochs of [`NeuralNet::train`] until the error target is met.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Present every sample once and return the epoch error.
    ///
    /// The error is measured on the outputs produced during the pass, before
    /// each sample's own update.
    pub fn run_epoch(&self, net: &mut NeuralNet, samples: &[Sample]) -> Result<f64> {
        let mut squared_sum = 0.0;
        let mut count = 0;
        for sample in samples {
            let output = net.train(&sample.input, &sample.target)?;
            for (y, t) in output.iter().zip(&sample.target) {
                squared_sum += (t - y).powi(2);
                count += 1;
            }
        }
        net.end_epoch();
        Ok(self.config.metric.finish(squared_sum, count))
    }

    pub fn fit(&self, net: &mut NeuralNet, samples: &[Sample]) -> Result<TrainingReport> {
        self.fit_with_observers(net, samples, &mut [])
    }

    /// Train while `epoch <= max_epochs` and the error is above target.
    pub fn fit_with_observers(
        &self,
        net: &mut NeuralNet,
        samples: &[Sample],
        observers: &mut [&mut dyn EpochObserver],
    ) -> Result<TrainingReport> {
        for observer in observers.iter_mut() {
            observer.on_training_start(self.config.max_epochs)?;
        }

        let mut errors = Vec::new();
        let mut error = f64::INFINITY;
        while errors.len() < self.config.max_epochs && error > self.config.target_error {
            error = self.run_epoch(net, samples)?;
            errors.push(error);
            let epoch = errors.len();
            if epoch % 1000 == 0 {
                debug!(epoch, error, "training");
            }
            for observer in observers.iter_mut() {
                observer.on_epoch_end(epoch, error)?;
            }
        }

        let report = TrainingReport {
            epochs: errors.len(),
            final_error: error,
            converged: error <= self.config.target_error,
            errors,
        };
        info!(
            epochs = report.epochs,
            final_error = report.final_error,
            converged = report.converged,
            "training finished"
        );
        for observer in observers.iter_mut() {
            observer.on_training_end(&report)?;
        }
        Ok(report)
    }
}

/// The four XOR patterns encoded for `activation`: `{0, 1}` when unipolar,
/// `{-1, 1}` when bipolar.
pub fn xor_patterns(activation: Activation) -> Vec<Sample> {
    let (low, high) = activation.range();
    [(false, false), (false, true), (true, false), (true, true)]
        .into_iter()
        .map(|(a, b)| {
            let level = |bit: bool| if bit { high } else { low };
            Sample::new(vec![level(a), level(b)], vec![level(a ^ b)])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::NetworkConfig;

    #[derive(Default)]
    struct Recorder {
        started: Option<usize>,
        epochs: Vec<usize>,
        finished: bool,
    }

    impl EpochObserver for Recorder {
        fn on_training_start(&mut self, max_epochs: usize) -> Result<()> {
            self.started = Some(max_epochs);
            Ok(())
        }

        fn on_epoch_end(&mut self, epoch: usize, _error: f64) -> Result<()> {
            self.epochs.push(epoch);
            Ok(())
        }

        fn on_training_end(&mut self, _report: &TrainingReport) -> Result<()> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn test_xor_patterns() {
        let unipolar = xor_patterns(Activation::Unipolar);
        assert_eq!(unipolar[1], Sample::new(vec![0.0, 1.0], vec![1.0]));
        assert_eq!(unipolar[3].target, vec![0.0]);

        let bipolar = xor_patterns(Activation::Bipolar);
        assert_eq!(bipolar[0], Sample::new(vec![-1.0, -1.0], vec![-1.0]));
        assert_eq!(bipolar[2].target, vec![1.0]);
    }

    #[test]
    fn test_metrics() {
        assert_eq!(ErrorMetric::SumSquared.finish(2.0, 4), 2.0);
        assert!((ErrorMetric::Rms.finish(4.0, 4) - 1.0).abs() < 1e-12);
        assert_eq!(ErrorMetric::Rms.finish(0.0, 0), 0.0);
    }

    #[test]
    fn test_epoch_cap_and_observer_sequence() {
        let mut net = NeuralNet::new(NetworkConfig::default().with_seed(3)).unwrap();
        let trainer = Trainer::new(
            TrainerConfig::default()
                .with_max_epochs(5)
                .with_target_error(0.0),
        )
        .unwrap();
        let mut recorder = Recorder::default();
        let report = trainer
            .fit_with_observers(&mut net, &xor_patterns(Activation::Unipolar), &mut [&mut recorder])
            .unwrap();
        assert_eq!(report.epochs, 5);
        assert_eq!(report.errors.len(), 5);
        assert!(!report.converged);
        assert_eq!(recorder.started, Some(5));
        assert_eq!(recorder.epochs, vec![1, 2, 3, 4, 5]);
        assert!(recorder.finished);
    }

    #[test]
    fn test_loose_target_stops_after_first_epoch() {
        let mut net = NeuralNet::new(NetworkConfig::default().with_seed(3)).unwrap();
        let trainer = Trainer::new(TrainerConfig::default().with_target_error(100.0)).unwrap();
        let report = trainer.fit(&mut net, &xor_patterns(Activation::Unipolar)).unwrap();
        assert_eq!(report.epochs, 1);
        assert!(report.converged);
    }

    #[test]
    fn test_invalid_config() {
        assert!(Trainer::new(TrainerConfig::default().with_max_epochs(0)).is_err());
        assert!(Trainer::new(TrainerConfig::default().with_target_error(-1.0)).is_err());
    }
}
