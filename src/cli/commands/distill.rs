//! Distill command - fit a network to a saved lookup table

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{
        commands::{KeySpaceSource, load_table, resolve_key_space},
        config::{QuantizerFile, TrainingFile, load_or_default},
        output::{format_number, print_kv, print_section, print_subsection},
    },
    nn::{ErrorLogObserver, NetworkSnapshot, ProgressObserver, Trainer, distill},
    ports::{EpochObserver, ValueFunction},
};

#[derive(Parser, Debug)]
#[command(about = "Fit a network to a saved lookup table")]
pub struct DistillArgs {
    /// Saved table (`.csv`, otherwise MessagePack)
    pub table: PathBuf,

    /// Network snapshot to write (`.json`, otherwise MessagePack)
    #[arg(long, short = 'O')]
    pub output: PathBuf,

    /// Key ranges used to normalise network inputs
    #[arg(long, value_enum, default_value = "observed")]
    pub key_space: KeySpaceSource,

    /// JSON file with `network` and `trainer` sections
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// JSON file with a `quantizer` section for declared key spaces
    #[arg(long)]
    pub quantizer: Option<PathBuf>,

    /// Hidden units
    #[arg(long)]
    pub hidden: Option<usize>,

    /// Epoch cap
    #[arg(long)]
    pub max_epochs: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Per-epoch error log (CSV)
    #[arg(long)]
    pub error_log: Option<PathBuf>,

    /// Show progress bar
    #[arg(long, default_value_t = true)]
    pub progress: bool,
}

pub fn execute(args: DistillArgs) -> Result<()> {
    let quantizer: QuantizerFile = load_or_default(args.quantizer.as_deref())?;
    let declared = args.key_space.declared(&quantizer.quantizer)?;
    let table = load_table(&args.table, declared.as_ref())?;
    let key_space = resolve_key_space(declared, &table)?;

    let mut file: TrainingFile = load_or_default(args.config.as_deref())?;
    file.network.inputs = key_space.arity();
    file.network.outputs = 1;
    if let Some(hidden) = args.hidden {
        file.network.hidden = hidden;
    }
    if let Some(epochs) = args.max_epochs {
        file.trainer.max_epochs = epochs;
    }
    if let Some(seed) = args.seed {
        file.network.seed = Some(seed);
    }
    let trainer = Trainer::new(file.trainer.clone())?;

    print_section("Distilling Lookup Table");
    print_kv("Table", &args.table.display().to_string());
    print_kv("Entries", &format_number(table.len()));
    print_kv("Key arity", &key_space.arity().to_string());
    print_kv("Key space", &format!("{:?}", args.key_space));
    print_kv(
        "Shape",
        &format!(
            "{}-{}-{}",
            file.network.inputs, file.network.hidden, file.network.outputs
        ),
    );

    let mut progress = ProgressObserver::new();
    let mut log = args
        .error_log
        .as_deref()
        .map(ErrorLogObserver::create)
        .transpose()?;
    let mut observers: Vec<&mut dyn EpochObserver> = Vec::new();
    if args.progress {
        observers.push(&mut progress);
    }
    if let Some(log) = log.as_mut() {
        observers.push(log);
    }

    let (values, report) = distill(&table, &key_space, file.network, &trainer, &mut observers)?;

    print_subsection("Result");
    print_kv("Epochs", &format_number(report.epochs));
    print_kv("Final error", &format!("{:.6}", report.final_error));
    print_kv("Converged", &report.converged.to_string());
    print_kv("Value scale", &format!("{}", values.value_scale()));

    let worst = table
        .entries()
        .map(|(key, value)| (values.value_of(key) - value).abs())
        .fold(0.0, f64::max);
    print_kv("Max abs deviation", &format!("{worst:.4}"));

    NetworkSnapshot::from_network(values.network())
        .save_to_file(&args.output)
        .with_context(|| format!("Failed to write snapshot: {}", args.output.display()))?;
    println!("\nSaved network to {}", args.output.display());

    Ok(())
}
