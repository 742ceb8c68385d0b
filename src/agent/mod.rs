//! Online learning agent
//!
//! - [`config`]: [`AgentConfig`] and its enums
//! - [`actions`]: the cardinal and wave-surfing action sets
//! - [`control`]: the `Scan → Select → Perform → AwaitReward` machine
//! - [`rewards`]: event → reward mapping
//! - [`statistics`]: per-round counters and windowed aggregates
//!
//! ## Usage Example
//!
//! ```no_run
//! use arena_rl::agent::{AgentConfig, CardinalAgent};
//! use arena_rl::geometry::Arena;
//! use arena_rl::q_learning::LookupTable;
//! use arena_rl::quantizer::{QuantizerConfig, RelativeEncoder};
//! use arena_rl::types::RewardEvent;
//!
//! let config = AgentConfig::default().with_seed(7);
//! let encoder = RelativeEncoder::new(QuantizerConfig::default())?;
//! let mut agent = CardinalAgent::new(config, encoder, LookupTable::new())?;
//! agent.start(Arena::default())?;
//! // for each scan: let commands = agent.on_observation(&observation)?;
//! agent.on_event(RewardEvent::HitWall)?;
//! agent.end_episode();
//! # Ok::<(), arena_rl::Error>(())
//! ```

pub mod actions;
pub mod config;
pub mod control;
pub mod mode;
pub mod rewards;
pub mod statistics;

pub use actions::{ActionSet, CardinalAction, PlanContext, SurfAction};
pub use config::{AgentConfig, AimMode, BackupTrigger};
pub use control::{CardinalAgent, ControlLoop, Selection, SurfAgent, select_greedy};
pub use mode::Mode;
pub use rewards::RewardSchedule;
pub use statistics::{AgentStatistics, RoundCounters, StatisticsWindow};
