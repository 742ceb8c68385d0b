//! Network snapshots
//!
//! A snapshot is the network configuration plus every weight addressed by
//! `(layer, from, to)`. Files ending in `.json` are written as JSON, anything
//! else as MessagePack.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    nn::{ConnectionWeight, NetworkConfig, NeuralNet},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub version: u32,
    pub config: NetworkConfig,
    pub weights: Vec<ConnectionWeight>,
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

impl NetworkSnapshot {
    pub const VERSION: u32 = 1;

    pub fn from_network(net: &NeuralNet) -> Self {
        Self {
            version: Self::VERSION,
            config: net.config().clone(),
            weights: net.weights(),
        }
    }

    /// Rebuild a network with exactly the stored weights.
    pub fn into_network(self) -> Result<NeuralNet> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedVersion {
                format: "network snapshot",
                found: self.version,
                expected: Self::VERSION,
            });
        }
        let mut net = NeuralNet::new(self.config)?;
        net.set_weights(&self.weights)?;
        Ok(net)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
        self.write_to(file, is_json(path))
            .with_context(|| format!("Failed to write network snapshot: {}", path.display()))
    }

    fn write_to<W: Write>(&self, writer: W, json: bool) -> anyhow::Result<()> {
        let mut writer = BufWriter::new(writer);
        if json {
            serde_json::to_writer_pretty(&mut writer, self)
                .context("Failed to serialize network snapshot")?;
        } else {
            rmp_serde::encode::write(&mut writer, self)
                .context("Failed to serialize network snapshot")?;
        }
        writer.flush().context("Failed to flush network snapshot")?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let reader = BufReader::new(file);

        if is_json(path) {
            serde_json::from_reader(reader).context("Failed to deserialize network snapshot")
        } else {
            rmp_serde::decode::from_read(reader).context("Failed to deserialize network snapshot")
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::nn::{Activation, NetworkConfig};

    fn network() -> NeuralNet {
        NeuralNet::new(
            NetworkConfig::new(3, 5, 2)
                .with_activation(Activation::Bipolar)
                .with_seed(11),
        )
        .unwrap()
    }

    #[test]
    fn test_roundtrip_both_formats() {
        let dir = tempdir().unwrap();
        let net = network();
        let snapshot = NetworkSnapshot::from_network(&net);

        for name in ["net.json", "net.msgpack"] {
            let path = dir.path().join(name);
            snapshot.save_to_file(&path).unwrap();
            let restored = NetworkSnapshot::load_from_file(&path)
                .unwrap()
                .into_network()
                .unwrap();
            assert_eq!(restored.weights(), net.weights());
            assert_eq!(restored.config(), net.config());
            assert_eq!(
                restored.output_for(&[0.1, -0.4, 0.9]).unwrap(),
                net.output_for(&[0.1, -0.4, 0.9]).unwrap()
            );
        }
    }

    struct RejectingSink;

    impl Write for RejectingSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("device full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_is_reported() {
        let snapshot = NetworkSnapshot::from_network(&network());
        for json in [true, false] {
            let err = snapshot.write_to(RejectingSink, json).unwrap_err();
            assert!(format!("{err:#}").contains("device full"), "{err:#}");
        }
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut snapshot = NetworkSnapshot::from_network(&network());
        snapshot.version = 7;
        assert!(matches!(
            snapshot.into_network(),
            Err(Error::UnsupportedVersion { found: 7, .. })
        ));
    }
}
