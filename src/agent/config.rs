//! Agent configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    geometry::{Arena, MAX_BULLET_POWER, MIN_BULLET_POWER},
    q_learning::TdParams,
};

/// When the TD back-up runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupTrigger {
    /// Wait in `AwaitReward` and back up on the first reward event
    #[default]
    OnReward,
    /// Accumulate rewards and back up at the next selection
    OnNextDecision,
}

/// How the gun is pointed when firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AimMode {
    /// Straight at the opponent's current position
    #[default]
    HeadOn,
    /// Closed-form linear intercept
    Linear,
    /// Secant-method intercept
    Iterative,
}

/// Configuration for a control loop.
///
/// # Examples
///
/// ```
/// use arena_rl::agent::{AgentConfig, BackupTrigger};
///
/// let config = AgentConfig::default()
///     .with_epsilon(0.1)
///     .with_seed(42)
///     .with_backup_trigger(BackupTrigger::OnNextDecision);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Learning rate α
    pub alpha: f64,
    /// Discount factor γ
    pub gamma: f64,
    /// Exploration probability
    pub epsilon: f64,
    /// Bootstrap from the taken action instead of the greedy one
    pub on_policy: bool,
    /// Whether back-ups write to the value function
    pub learning: bool,
    pub backup_trigger: BackupTrigger,
    /// Zero every non-terminal reward
    pub terminal_reward_only: bool,
    /// Multiplier applied to every reward
    pub reward_scale: f64,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
    pub arena: Arena,
    /// Distance driven by one movement action
    pub step_distance: f64,
    /// Distance from a wall at which cardinal moves are smoothed
    pub wall_buffer: f64,
    pub gun_power: f64,
    pub aim_mode: AimMode,
    /// Rounds per statistics window
    pub sample_window: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.7,
            gamma: 0.9,
            epsilon: 0.25,
            on_policy: false,
            learning: true,
            backup_trigger: BackupTrigger::default(),
            terminal_reward_only: false,
            reward_scale: 1.0,
            seed: None,
            arena: Arena::default(),
            step_distance: 100.0,
            wall_buffer: 150.0,
            gun_power: 2.0,
            aim_mode: AimMode::default(),
            sample_window: 500,
        }
    }
}

impl AgentConfig {
    /// Defaults for the wave-surfing agent: scaled rewards, lighter bullets.
    pub fn surf() -> Self {
        Self {
            reward_scale: 0.005,
            gun_power: 1.9,
            ..Self::default()
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_on_policy(mut self, on_policy: bool) -> Self {
        self.on_policy = on_policy;
        self
    }

    pub fn with_learning(mut self, learning: bool) -> Self {
        self.learning = learning;
        self
    }

    pub fn with_backup_trigger(mut self, trigger: BackupTrigger) -> Self {
        self.backup_trigger = trigger;
        self
    }

    pub fn with_terminal_reward_only(mut self, terminal_only: bool) -> Self {
        self.terminal_reward_only = terminal_only;
        self
    }

    pub fn with_reward_scale(mut self, scale: f64) -> Self {
        self.reward_scale = scale;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_arena(mut self, arena: Arena) -> Self {
        self.arena = arena;
        self
    }

    pub fn with_step_distance(mut self, distance: f64) -> Self {
        self.step_distance = distance;
        self
    }

    pub fn with_wall_buffer(mut self, buffer: f64) -> Self {
        self.wall_buffer = buffer;
        self
    }

    pub fn with_gun_power(mut self, power: f64) -> Self {
        self.gun_power = power;
        self
    }

    pub fn with_aim_mode(mut self, mode: AimMode) -> Self {
        self.aim_mode = mode;
        self
    }

    pub fn with_sample_window(mut self, rounds: usize) -> Self {
        self.sample_window = rounds;
        self
    }

    pub fn td_params(&self) -> TdParams {
        TdParams {
            alpha: self.alpha,
            gamma: self.gamma,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.td_params().validate()?;
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(Error::invalid_config(format!(
                "epsilon must be in [0, 1], got {}",
                self.epsilon
            )));
        }
        if !self.reward_scale.is_finite() {
            return Err(Error::invalid_config("reward scale must be finite"));
        }
        if !(self.arena.width > 0.0 && self.arena.height > 0.0) {
            return Err(Error::invalid_config(format!(
                "arena must have positive size, got {} x {}",
                self.arena.width, self.arena.height
            )));
        }
        if !(MIN_BULLET_POWER..=MAX_BULLET_POWER).contains(&self.gun_power) {
            return Err(Error::invalid_config(format!(
                "gun power must be in [{MIN_BULLET_POWER}, {MAX_BULLET_POWER}], got {}",
                self.gun_power
            )));
        }
        if !(self.step_distance.is_finite() && self.step_distance > 0.0) {
            return Err(Error::invalid_config("step distance must be positive"));
        }
        if self.wall_buffer < 0.0 {
            return Err(Error::invalid_config("wall buffer must not be negative"));
        }
        if self.sample_window == 0 {
            return Err(Error::invalid_config("sample window must hold at least one round"));
        }
        Ok(())
    }

    /// Read a JSON configuration file; missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|source| Error::Io {
            operation: format!("read config {:?}", path.as_ref()),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}
