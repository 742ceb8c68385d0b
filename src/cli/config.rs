//! Configuration files shared across CLI commands

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    nn::{NetworkConfig, TrainerConfig},
    quantizer::QuantizerConfig,
};

/// Network and trainer settings, as read from a JSON file.
///
/// Missing sections and fields fall back to their defaults, so `{}` is a
/// valid file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingFile {
    pub network: NetworkConfig,
    pub trainer: TrainerConfig,
}

/// Key-space settings for commands that inspect saved tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizerFile {
    pub quantizer: QuantizerConfig,
}

/// Read `path` as JSON, or use the default when no path is given.
pub fn load_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let file =
        File::open(path).with_context(|| format!("Failed to open config: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}
