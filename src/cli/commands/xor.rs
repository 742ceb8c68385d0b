//! XOR command - train networks on the XOR patterns and report convergence

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use statrs::statistics::Statistics;

use crate::{
    cli::{
        config::{TrainingFile, load_or_default},
        output::{format_number, print_kv, print_section, print_subsection},
    },
    nn::{
        Activation, ErrorLogObserver, ErrorMetric, NetworkConfig, NetworkSnapshot, NeuralNet,
        ProgressObserver, Trainer, TrainingReport, UpdateMode, xor_patterns,
    },
    ports::EpochObserver,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ActivationArg {
    Unipolar,
    Bipolar,
}

impl From<ActivationArg> for Activation {
    fn from(arg: ActivationArg) -> Self {
        match arg {
            ActivationArg::Unipolar => Activation::Unipolar,
            ActivationArg::Bipolar => Activation::Bipolar,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train networks on XOR", allow_negative_numbers = true)]
pub struct XorArgs {
    /// JSON file with `network` and `trainer` sections
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Input encoding and activation function
    #[arg(long, value_enum)]
    pub activation: Option<ActivationArg>,

    /// Hidden units
    #[arg(long)]
    pub hidden: Option<usize>,

    /// Learning rate η
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Momentum μ
    #[arg(long)]
    pub momentum: Option<f64>,

    /// Stop once the epoch error reaches this value
    #[arg(long)]
    pub target_error: Option<f64>,

    /// Epoch cap per trial
    #[arg(long)]
    pub max_epochs: Option<usize>,

    /// Apply weight changes once per epoch instead of per sample
    #[arg(long, default_value_t = false)]
    pub batch: bool,

    /// Report RMS error instead of the sum of squared errors
    #[arg(long, default_value_t = false)]
    pub rms: bool,

    /// Independent trials, each with freshly drawn weights
    #[arg(long, short = 't', default_value_t = 1)]
    pub trials: usize,

    /// Base random seed; trial `i` uses `seed + i`
    #[arg(long)]
    pub seed: Option<u64>,

    /// Per-epoch error log (CSV); trials after the first get a `_N` suffix
    #[arg(long)]
    pub error_log: Option<PathBuf>,

    /// Save the first converged network (or the last one) here
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    /// Show progress bar
    #[arg(long, default_value_t = true)]
    pub progress: bool,
}

impl XorArgs {
    fn resolve(&self) -> Result<TrainingFile> {
        let mut file: TrainingFile = load_or_default(self.config.as_deref())?;
        let network = &mut file.network;
        network.inputs = 2;
        network.outputs = 1;
        if let Some(activation) = self.activation {
            network.activation = activation.into();
        }
        if let Some(hidden) = self.hidden {
            network.hidden = hidden;
        }
        if let Some(rate) = self.learning_rate {
            network.learning_rate = rate;
        }
        if let Some(momentum) = self.momentum {
            network.momentum = momentum;
        }
        if self.batch {
            network.update_mode = UpdateMode::Batch;
        }
        if let Some(seed) = self.seed {
            network.seed = Some(seed);
        }

        let trainer = &mut file.trainer;
        if let Some(target) = self.target_error {
            trainer.target_error = target;
        }
        if let Some(epochs) = self.max_epochs {
            trainer.max_epochs = epochs;
        }
        if self.rms {
            trainer.metric = ErrorMetric::Rms;
        }
        Ok(file)
    }
}

fn trial_log_path(base: &Path, trial: usize) -> PathBuf {
    if trial == 0 {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "errors".to_string());
    let name = match base.extension() {
        Some(ext) => format!("{stem}_{trial}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{trial}"),
    };
    base.with_file_name(name)
}

fn run_trial(
    args: &XorArgs,
    config: NetworkConfig,
    trainer: &Trainer,
    trial: usize,
) -> Result<(NeuralNet, TrainingReport)> {
    let samples = xor_patterns(config.activation);
    let mut net = NeuralNet::new(config)?;

    let mut progress = ProgressObserver::new();
    let mut log = args
        .error_log
        .as_deref()
        .map(|base| ErrorLogObserver::create(trial_log_path(base, trial)))
        .transpose()?;

    let mut observers: Vec<&mut dyn EpochObserver> = Vec::new();
    if args.progress {
        observers.push(&mut progress);
    }
    if let Some(log) = log.as_mut() {
        observers.push(log);
    }

    let report = trainer.fit_with_observers(&mut net, &samples, &mut observers)?;
    Ok((net, report))
}

pub fn execute(args: XorArgs) -> Result<()> {
    if args.trials == 0 {
        return Err(anyhow!("At least one trial is required"));
    }
    let file = args.resolve()?;
    let trainer = Trainer::new(file.trainer.clone())?;

    print_section("XOR Training");
    let network = &file.network;
    print_kv(
        "Shape",
        &format!("{}-{}-{}", network.inputs, network.hidden, network.outputs),
    );
    print_kv("Activation", &format!("{:?}", network.activation));
    print_kv("Learning rate", &network.learning_rate.to_string());
    print_kv("Momentum", &network.momentum.to_string());
    print_kv("Update mode", &format!("{:?}", network.update_mode));
    print_kv(
        "Target error",
        &format!("{} ({:?})", file.trainer.target_error, file.trainer.metric),
    );
    print_kv("Max epochs", &format_number(file.trainer.max_epochs));

    let mut kept: Option<(NeuralNet, bool)> = None;
    let mut converged_epochs = Vec::new();
    print_subsection("Trials");
    for trial in 0..args.trials {
        let mut config = file.network.clone();
        config.seed = config.seed.map(|seed| seed.wrapping_add(trial as u64));
        let (net, report) = run_trial(&args, config, &trainer, trial)?;

        print_kv(
            &format!("Trial {}", trial + 1),
            &format!(
                "{} epochs, error {:.5}{}",
                format_number(report.epochs),
                report.final_error,
                if report.converged { "" } else { " (not converged)" }
            ),
        );
        if report.converged {
            converged_epochs.push(report.epochs as f64);
        }
        let keep = match &kept {
            None => true,
            Some((_, converged)) => !converged,
        };
        if keep {
            kept = Some((net, report.converged));
        }
    }

    print_subsection("Summary");
    print_kv(
        "Converged",
        &format!("{}/{}", converged_epochs.len(), args.trials),
    );
    if !converged_epochs.is_empty() {
        print_kv(
            "Mean epochs",
            &format!("{:.1}", converged_epochs.iter().mean()),
        );
    }

    if let Some((net, _)) = &kept {
        print_subsection("Outputs");
        for sample in xor_patterns(net.config().activation) {
            let output = net.output_for(&sample.input)?;
            print_kv(
                &format!("{:?}", sample.input),
                &format!("{:.4} (target {})", output[0], sample.target[0]),
            );
        }
        if let Some(path) = &args.output {
            NetworkSnapshot::from_network(net).save_to_file(path)?;
            println!("\nSaved network to {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trial_log_paths() {
        let base = Path::new("out/errors.csv");
        assert_eq!(trial_log_path(base, 0), PathBuf::from("out/errors.csv"));
        assert_eq!(trial_log_path(base, 2), PathBuf::from("out/errors_2.csv"));
        assert_eq!(
            trial_log_path(Path::new("log"), 1),
            PathBuf::from("log_1")
        );
    }
}
