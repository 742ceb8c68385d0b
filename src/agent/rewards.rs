//! Reward schedule

use crate::{
    geometry::{bullet_damage, bullet_hit_bonus},
    types::RewardEvent,
};

/// Reward for death.
pub const DEATH_REWARD: f64 = -100.0;
/// Reward for destroying the opponent.
pub const VICTORY_REWARD: f64 = 100.0;
pub const WALL_REWARD: f64 = -4.0;
pub const COLLISION_REWARD: f64 = -1.0;

/// Maps simulator events to scalar rewards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardSchedule {
    /// Multiplier applied to every reward
    pub scale: f64,
    /// Zero every non-terminal reward
    pub terminal_only: bool,
    /// Power of our own bullets, used for `BulletHit`
    pub gun_power: f64,
}

impl Default for RewardSchedule {
    fn default() -> Self {
        Self {
            scale: 1.0,
            terminal_only: false,
            gun_power: 2.0,
        }
    }
}

impl RewardSchedule {
    pub fn reward(&self, event: &RewardEvent) -> f64 {
        if self.terminal_only && !event.is_terminal() {
            return 0.0;
        }
        let raw = match *event {
            RewardEvent::HitByBullet { power, .. } => -(bullet_damage(power) + bullet_hit_bonus(power)),
            RewardEvent::HitWall => WALL_REWARD,
            RewardEvent::HitRobot => COLLISION_REWARD,
            RewardEvent::BulletHit => {
                bullet_damage(self.gun_power) + bullet_hit_bonus(self.gun_power)
            }
            RewardEvent::BulletHitBullet {
                own_power,
                their_power,
            } => their_power - own_power,
            RewardEvent::Death => DEATH_REWARD,
            RewardEvent::OpponentDeath => VICTORY_REWARD,
            RewardEvent::RoundEnd { .. } => 0.0,
        };
        raw * self.scale
    }
}
