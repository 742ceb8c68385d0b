//! Per-round counters and windowed aggregates

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::types::RewardEvent;

/// Counters for the round in progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundCounters {
    pub back_steps: u64,
    pub td_error_sum: f64,
    pub reward_sum: f64,
    pub wall_hits: u64,
    pub hits_taken: u64,
    pub bullet_hits: u64,
    pub bullet_hit_bullet: u64,
    pub robot_collisions: u64,
    pub anomalies: u64,
    pub won: bool,
}

impl RoundCounters {
    /// Mean TD error over the round's back-steps, if any ran.
    pub fn mean_td_error(&self) -> Option<f64> {
        (self.back_steps > 0).then(|| self.td_error_sum / self.back_steps as f64)
    }
}

/// Aggregates over one completed window of rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsWindow {
    /// 1-based window number
    pub index: usize,
    pub rounds: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub mean_td_error: f64,
    pub td_error_std_dev: f64,
    pub mean_reward: f64,
    pub reward_std_dev: f64,
    pub back_steps: u64,
    pub wall_hits: u64,
    pub hits_taken: u64,
    pub bullet_hits: u64,
    pub anomalies: u64,
}

impl StatisticsWindow {
    fn from_rounds(index: usize, rounds: &[RoundCounters]) -> Self {
        let wins = rounds.iter().filter(|round| round.won).count();
        let td_errors: Vec<f64> = rounds.iter().filter_map(RoundCounters::mean_td_error).collect();
        let rewards: Vec<f64> = rounds.iter().map(|round| round.reward_sum).collect();

        Self {
            index,
            rounds: rounds.len(),
            wins,
            win_rate: if rounds.is_empty() {
                0.0
            } else {
                wins as f64 / rounds.len() as f64
            },
            mean_td_error: finite_or_zero(td_errors.iter().mean()),
            td_error_std_dev: finite_or_zero(td_errors.iter().std_dev()),
            mean_reward: finite_or_zero(rewards.iter().mean()),
            reward_std_dev: finite_or_zero(rewards.iter().std_dev()),
            back_steps: rounds.iter().map(|round| round.back_steps).sum(),
            wall_hits: rounds.iter().map(|round| round.wall_hits).sum(),
            hits_taken: rounds.iter().map(|round| round.hits_taken).sum(),
            bullet_hits: rounds.iter().map(|round| round.bullet_hits).sum(),
            anomalies: rounds.iter().map(|round| round.anomalies).sum(),
        }
    }
}

// statrs reports NaN for empty or single-sample inputs.
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Statistics owned by a control loop, reset per round and per window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatistics {
    window_size: usize,
    current: RoundCounters,
    window: Vec<RoundCounters>,
    completed_windows: usize,
    rounds_played: usize,
}

impl AgentStatistics {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            current: RoundCounters::default(),
            window: Vec::with_capacity(window_size.max(1)),
            completed_windows: 0,
            rounds_played: 0,
        }
    }

    pub fn current_round(&self) -> &RoundCounters {
        &self.current
    }

    pub fn rounds_played(&self) -> usize {
        self.rounds_played
    }

    pub fn completed_windows(&self) -> usize {
        self.completed_windows
    }

    /// Rounds collected towards the next window.
    pub fn pending_rounds(&self) -> &[RoundCounters] {
        &self.window
    }

    /// Count an event and its reward.
    pub fn record_event(&mut self, event: &RewardEvent, reward: f64) {
        self.current.reward_sum += reward;
        match event {
            RewardEvent::HitWall => self.current.wall_hits += 1,
            RewardEvent::HitByBullet { .. } => self.current.hits_taken += 1,
            RewardEvent::BulletHit => self.current.bullet_hits += 1,
            RewardEvent::BulletHitBullet { .. } => self.current.bullet_hit_bullet += 1,
            RewardEvent::HitRobot => self.current.robot_collisions += 1,
            RewardEvent::OpponentDeath | RewardEvent::RoundEnd { won: true } => {
                self.current.won = true
            }
            RewardEvent::Death | RewardEvent::RoundEnd { won: false } => {}
        }
    }

    pub fn record_back_step(&mut self, error: f64) {
        self.current.back_steps += 1;
        self.current.td_error_sum += error;
    }

    pub fn record_anomaly(&mut self) {
        self.current.anomalies += 1;
    }

    /// Close the current round; returns the window it completed, if any.
    pub fn end_round(&mut self) -> Option<StatisticsWindow> {
        self.window.push(std::mem::take(&mut self.current));
        self.rounds_played += 1;

        if self.window.len() < self.window_size {
            return None;
        }
        self.completed_windows += 1;
        let summary = StatisticsWindow::from_rounds(self.completed_windows, &self.window);
        self.window.clear();
        Some(summary)
    }
}

impl Default for AgentStatistics {
    fn default() -> Self {
        Self::new(500)
    }
}
