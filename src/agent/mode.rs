//! Control loop phases

use std::fmt;

use serde::{Deserialize, Serialize};

/// Phase of the decision cycle `Scan → Select → Perform → AwaitReward → Scan`.
///
/// `Select` and `Perform` complete inside a single observation, so between
/// events the loop rests in `Scan` or `AwaitReward`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Scan,
    Select,
    Perform,
    AwaitReward,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Scan => "scan",
            Mode::Select => "select",
            Mode::Perform => "perform",
            Mode::AwaitReward => "await_reward",
        };
        f.write_str(name)
    }
}
