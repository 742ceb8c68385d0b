//! The decision state machine
//!
//! `Scan → Select → Perform → AwaitReward → Scan`, driven entirely by
//! simulator events. Each event is processed to completion; waiting for a
//! reward is a state, never a blocking call.

use std::marker::PhantomData;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

use crate::{
    Result,
    agent::{
        ActionSet, AgentConfig, BackupTrigger, CardinalAction, Mode, PlanContext, RewardSchedule,
        SurfAction,
        statistics::{AgentStatistics, StatisticsWindow},
    },
    error::Error,
    geometry::{Arena, WallSmoothing, normal_relative_angle},
    ports::ValueFunction,
    q_learning::{LookupTable, StateActionKey, TdParams, back_step},
    quantizer::{KeySpace, RelativeEncoder, StateEncoder, SurfEncoder},
    types::{Command, Observation, RewardEvent},
    waves::{Kinematics, WaveTracker},
};

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

fn check_arena(expected: Arena, actual: Arena) -> Result<()> {
    if actual != expected {
        return Err(Error::ArenaMismatch {
            expected_width: expected.width,
            expected_height: expected.height,
            actual_width: actual.width,
            actual_height: actual.height,
        });
    }
    Ok(())
}

/// Outcome of one greedy/exploratory selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Ordinal of the action taken
    pub action: usize,
    /// Ordinal of the greedy action, after tie-breaking
    pub greedy: usize,
    pub max_q: f64,
    pub explored: bool,
}

/// Pick the best of `values`, breaking exact ties uniformly at random.
///
/// The k-th action found tied with the running best replaces it with
/// probability `1/k`, so every member of a tie is equally likely.
pub fn select_greedy<R: Rng>(values: &[f64], rng: &mut R) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    let mut ties = 0u32;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, max)) if value < max => {}
            Some((_, max)) if value == max => {
                ties += 1;
                if rng.random_range(0..ties) == 0 {
                    best = Some((index, value));
                }
            }
            _ => {
                best = Some((index, value));
                ties = 1;
            }
        }
    }
    best
}

/// Back-up inputs captured at selection time.
#[derive(Debug, Clone, PartialEq)]
struct Pending {
    key: StateActionKey,
    previous_q: f64,
    current_q: f64,
}

/// Online Q-learning controller.
///
/// Generic over the action set, the state encoder and the value function so
/// the same machine drives both the cardinal and the wave-surfing agents and
/// can read its estimates from a table or a network.
pub struct ControlLoop<A: ActionSet, E: StateEncoder, V: ValueFunction> {
    config: AgentConfig,
    td: TdParams,
    rewards: RewardSchedule,
    encoder: E,
    values: V,
    waves: WaveTracker,
    smoothing: WallSmoothing,
    rng: StdRng,
    mode: Mode,
    candidates: Vec<StateActionKey>,
    selected: Option<A>,
    pending: Option<Pending>,
    accumulated_reward: f64,
    statistics: AgentStatistics,
    _actions: PhantomData<A>,
}

/// Five-action agent on the relative encoder.
pub type CardinalAgent<V = LookupTable> = ControlLoop<CardinalAction, RelativeEncoder, V>;

/// Four-action wave-surfing agent on the surf encoder.
pub type SurfAgent<V = LookupTable> = ControlLoop<SurfAction, SurfEncoder, V>;

impl<A: ActionSet, E: StateEncoder, V: ValueFunction> ControlLoop<A, E, V> {
    pub fn new(config: AgentConfig, encoder: E, values: V) -> Result<Self> {
        config.validate()?;
        if A::ALL.is_empty() {
            return Err(Error::invalid_config("action set is empty"));
        }
        check_arena(config.arena, encoder.arena())?;
        Ok(Self {
            td: config.td_params(),
            rewards: RewardSchedule {
                scale: config.reward_scale,
                terminal_only: config.terminal_reward_only,
                gun_power: config.gun_power,
            },
            encoder,
            values,
            waves: WaveTracker::new(),
            smoothing: WallSmoothing::new(config.arena),
            rng: build_rng(config.seed),
            mode: Mode::Scan,
            candidates: Vec::with_capacity(A::ALL.len()),
            selected: None,
            pending: None,
            accumulated_reward: 0.0,
            statistics: AgentStatistics::new(config.sample_window),
            _actions: PhantomData,
            config,
        })
    }

    /// Fail fast when the simulator's arena differs from the configured one.
    pub fn start(&mut self, arena: Arena) -> Result<()> {
        check_arena(self.config.arena, arena)?;
        self.transition(Mode::Scan);
        info!(
            encoder = self.encoder.name(),
            values = self.values.name(),
            actions = A::ALL.len(),
            "agent started"
        );
        Ok(())
    }

    /// Handle one scan. Returns the commands to execute this tick.
    pub fn on_observation(&mut self, observation: &Observation) -> Result<Vec<Command>> {
        let me = &observation.me;
        self.waves.observe(
            observation.time,
            Kinematics {
                location: me.location(),
                velocity: me.velocity,
                heading: me.heading,
            },
            observation.opponent.bearing,
            observation.opponent.distance,
            observation.opponent.energy,
        );

        // Keep the radar locked on the opponent.
        let mut commands = vec![Command::TurnRadar {
            radians: normal_relative_angle(observation.absolute_bearing() - me.radar_heading)
                * 2.0,
        }];

        if self.mode != Mode::Scan {
            return Ok(commands);
        }

        self.scan(observation);
        let action = self.select()?;
        commands.extend(self.perform(action, observation));
        Ok(commands)
    }

    /// Handle a reward-bearing event.
    pub fn on_event(&mut self, event: RewardEvent) -> Result<()> {
        let reward = self.rewards.reward(&event);
        self.statistics.record_event(&event, reward);

        if let RewardEvent::HitByBullet { power, location } = event {
            self.waves.on_hit(power, location);
        }

        if event.is_terminal() {
            return self.on_terminal(event, reward);
        }

        match self.config.backup_trigger {
            BackupTrigger::OnReward => {
                if self.mode == Mode::AwaitReward {
                    self.backup(reward, None)?;
                } else {
                    self.anomaly(&event);
                }
                self.transition(Mode::Scan);
            }
            BackupTrigger::OnNextDecision => {
                self.accumulated_reward += reward;
            }
        }
        Ok(())
    }

    fn on_terminal(&mut self, event: RewardEvent, reward: f64) -> Result<()> {
        let awaiting = match self.config.backup_trigger {
            BackupTrigger::OnReward => self.mode == Mode::AwaitReward,
            BackupTrigger::OnNextDecision => self.pending.is_some(),
        };

        if awaiting {
            let total = reward + std::mem::take(&mut self.accumulated_reward);
            // No successor state: the bootstrap is dropped.
            self.backup(total, Some(0.0))?;
        } else if matches!(event, RewardEvent::RoundEnd { .. }) {
            debug!(mode = %self.mode, "round ended with no pending back-up");
        } else {
            self.anomaly(&event);
        }

        self.pending = None;
        self.accumulated_reward = 0.0;
        self.transition(Mode::Scan);
        Ok(())
    }

    /// Close the round: forget waves and pending state, roll statistics.
    ///
    /// Returns the statistics window this round completed, if any.
    pub fn end_episode(&mut self) -> Option<StatisticsWindow> {
        let round = self.statistics.current_round().clone();
        info!(
            round = self.statistics.rounds_played() + 1,
            won = round.won,
            back_steps = round.back_steps,
            reward = round.reward_sum,
            anomalies = round.anomalies,
            "round finished"
        );

        self.waves.reset_round();
        self.pending = None;
        self.selected = None;
        self.candidates.clear();
        self.accumulated_reward = 0.0;
        self.transition(Mode::Scan);

        let window = self.statistics.end_round();
        if let Some(window) = &window {
            info!(
                window = window.index,
                win_rate = window.win_rate,
                mean_td_error = window.mean_td_error,
                mean_reward = window.mean_reward,
                "statistics window complete"
            );
        }
        window
    }

    fn scan(&mut self, observation: &Observation) {
        let state = self.encoder.encode(observation, &self.waves);
        self.candidates.clear();
        self.candidates
            .extend(A::ALL.iter().map(|action| state.with_action(action.ordinal())));
        self.transition(Mode::Select);
    }

    fn select(&mut self) -> Result<A> {
        let values: Vec<f64> = self
            .candidates
            .iter()
            .map(|key| self.values.value_of(key))
            .collect();
        let selection = self.choose(&values)?;

        let taken_q = values[selection.action];
        let current_q = if self.config.on_policy {
            taken_q
        } else {
            selection.max_q
        };

        if self.config.backup_trigger == BackupTrigger::OnNextDecision && self.pending.is_some() {
            let reward = std::mem::take(&mut self.accumulated_reward);
            self.backup(reward, Some(current_q))?;
        }

        let action = A::from_ordinal(selection.action).ok_or_else(|| Error::KeyOutOfRange {
            key: format!("action ordinal {}", selection.action),
        })?;
        self.pending = Some(Pending {
            key: self.candidates[selection.action].clone(),
            previous_q: taken_q,
            current_q,
        });
        self.selected = Some(action);
        debug!(
            action = action.name(),
            max_q = selection.max_q,
            explored = selection.explored,
            "action selected"
        );
        self.transition(Mode::Perform);
        Ok(action)
    }

    fn choose(&mut self, values: &[f64]) -> Result<Selection> {
        let (greedy, max_q) = select_greedy(values, &mut self.rng).ok_or_else(|| {
            Error::DimensionMismatch {
                what: "candidate actions",
                expected: A::ALL.len(),
                got: 0,
            }
        })?;
        let explored = self.config.epsilon > 0.0 && self.rng.random::<f64>() < self.config.epsilon;
        let action = if explored {
            self.rng.random_range(0..values.len())
        } else {
            greedy
        };
        Ok(Selection {
            action,
            greedy,
            max_q,
            explored,
        })
    }

    fn perform(&mut self, action: A, observation: &Observation) -> Vec<Command> {
        let commands = action.plan(&PlanContext {
            observation,
            config: &self.config,
            waves: &self.waves,
            smoothing: &self.smoothing,
        });
        let next = match self.config.backup_trigger {
            BackupTrigger::OnReward => Mode::AwaitReward,
            BackupTrigger::OnNextDecision => Mode::Scan,
        };
        self.transition(next);
        commands
    }

    /// Run the back-step for the pending selection.
    ///
    /// `current_q` overrides the bootstrap captured at selection time.
    fn backup(&mut self, reward: f64, current_q: Option<f64>) -> Result<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        if !self.config.learning {
            return Ok(());
        }
        let current_q = current_q.unwrap_or(pending.current_q);
        let error = back_step(
            &mut self.values,
            &self.td,
            &pending.key,
            pending.previous_q,
            current_q,
            reward,
        )?;
        self.statistics.record_back_step(error);
        Ok(())
    }

    fn anomaly(&mut self, event: &RewardEvent) {
        warn!(event = event.name(), mode = %self.mode, "reward event outside await_reward");
        self.statistics.record_anomaly();
    }

    fn transition(&mut self, next: Mode) {
        if self.mode != next {
            debug!(from = %self.mode, to = %next, "mode transition");
            self.mode = next;
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn selected_action(&self) -> Option<A> {
        self.selected
    }

    /// Keys built at the last scan, one per action in ordinal order.
    pub fn candidate_keys(&self) -> &[StateActionKey] {
        &self.candidates
    }

    pub fn values(&self) -> &V {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut V {
        &mut self.values
    }

    pub fn into_values(self) -> V {
        self.values
    }

    pub fn waves(&self) -> &WaveTracker {
        &self.waves
    }

    pub fn statistics(&self) -> &AgentStatistics {
        &self.statistics
    }

    /// Key space of state-action keys this agent produces.
    pub fn key_space(&self) -> KeySpace {
        self.encoder.key_space().with_actions(A::ALL.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_greedy_picks_strict_maximum() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(select_greedy(&[0.1, 0.7, -2.0], &mut rng), Some((1, 0.7)));
        assert_eq!(select_greedy(&[], &mut rng), None);
    }

    #[test]
    fn test_select_greedy_breaks_ties_among_maxima_only() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [0usize; 4];
        for _ in 0..400 {
            let (index, value) = select_greedy(&[1.0, 5.0, 2.0, 5.0], &mut rng).unwrap();
            assert_eq!(value, 5.0);
            seen[index] += 1;
        }
        assert_eq!(seen[0] + seen[2], 0);
        assert!(seen[1] > 100 && seen[3] > 100);
    }
}
