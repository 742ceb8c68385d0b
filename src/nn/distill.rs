//! Fitting a network to a learned lookup table

use tracing::info;

use crate::{
    Result,
    error::Error,
    nn::{NetworkConfig, NetworkValueFunction, NeuralNet, Sample, Trainer, TrainingReport},
    ports::EpochObserver,
    q_learning::LookupTable,
    quantizer::KeySpace,
};

/// Largest absolute stored value, or `1.0` for an empty or all-zero table.
pub fn value_scale_for(table: &LookupTable) -> f64 {
    match table.value_range() {
        Some((lo, hi)) if lo.abs().max(hi.abs()) > 0.0 => lo.abs().max(hi.abs()),
        _ => 1.0,
    }
}

/// One regression sample per table entry, in key order.
///
/// Inputs are the key normalised by `key_space`; targets are the value
/// divided by `value_scale` and clamped to `range`.
pub fn distill_samples(
    table: &LookupTable,
    key_space: &KeySpace,
    value_scale: f64,
    range: (f64, f64),
) -> Result<Vec<Sample>> {
    table.check_key_space(key_space)?;
    table
        .sorted_entries()
        .into_iter()
        .map(|(key, value)| {
            let input = key_space.normalize(key.components())?;
            let target = (value / value_scale).clamp(range.0, range.1);
            Ok(Sample::new(input, vec![target]))
        })
        .collect()
}

/// Train a fresh network on `table` and wrap it as a value function.
pub fn distill(
    table: &LookupTable,
    key_space: &KeySpace,
    network: NetworkConfig,
    trainer: &Trainer,
    observers: &mut [&mut dyn EpochObserver],
) -> Result<(NetworkValueFunction, TrainingReport)> {
    if table.is_empty() {
        return Err(Error::invalid_config("cannot distill an empty lookup table"));
    }
    if network.inputs != key_space.arity() || network.outputs != 1 {
        return Err(Error::invalid_config(format!(
            "distillation needs a {}-input single-output network, got {}-{}-{}",
            key_space.arity(),
            network.inputs,
            network.hidden,
            network.outputs
        )));
    }

    let value_scale = value_scale_for(table);
    let samples = distill_samples(table, key_space, value_scale, network.activation.range())?;
    let mut net = NeuralNet::new(network)?;
    let report = trainer.fit_with_observers(&mut net, &samples, observers)?;
    info!(
        samples = samples.len(),
        value_scale,
        converged = report.converged,
        "distilled lookup table"
    );

    let values = NetworkValueFunction::new(net, key_space.clone(), value_scale)?;
    Ok((values, report))
}
