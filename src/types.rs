//! Simulator-facing value types: observations in, reward events in, commands out.
//!
//! Angles follow the arena convention: radians, `0` points along +y ("up"),
//! increasing clockwise. Positions are in arena pixels with the origin at the
//! bottom-left corner.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Kinematic and resource state of the controlled robot at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelfState {
    pub x: f64,
    pub y: f64,
    /// Body heading in radians
    pub heading: f64,
    pub velocity: f64,
    pub energy: f64,
    /// Gun heading in radians
    pub gun_heading: f64,
    /// Radar heading in radians
    pub radar_heading: f64,
    /// Remaining gun heat; the gun can fire only when this is zero
    pub gun_heat: f64,
}

impl SelfState {
    pub fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Opponent measurements delivered by a radar scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpponentScan {
    /// Bearing relative to our body heading, in radians
    pub bearing: f64,
    pub distance: f64,
    pub velocity: f64,
    /// Opponent body heading in radians
    pub heading: f64,
    pub energy: f64,
}

/// One observation event from the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub time: u64,
    pub me: SelfState,
    pub opponent: OpponentScan,
}

impl Observation {
    /// Absolute bearing from us to the opponent.
    pub fn absolute_bearing(&self) -> f64 {
        self.opponent.bearing + self.me.heading
    }

    /// Opponent offset from our position as `(dx, dy)`.
    pub fn opponent_offset(&self) -> (f64, f64) {
        let angle = self.absolute_bearing();
        (
            self.opponent.distance * angle.sin(),
            self.opponent.distance * angle.cos(),
        )
    }

    /// Opponent position in arena coordinates.
    pub fn opponent_location(&self) -> Point {
        let (dx, dy) = self.opponent_offset();
        Point::new(self.me.x + dx, self.me.y + dy)
    }
}

/// Reward-bearing notifications from the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RewardEvent {
    /// We were hit by an opponent bullet of the given power at `location`
    HitByBullet { power: f64, location: Point },
    /// We drove into a wall
    HitWall,
    /// We collided with the opponent
    HitRobot,
    /// One of our bullets hit the opponent
    BulletHit,
    /// One of our bullets collided with one of theirs
    BulletHitBullet { own_power: f64, their_power: f64 },
    /// We were destroyed
    Death,
    /// The opponent was destroyed
    OpponentDeath,
    /// The round finished
    RoundEnd { won: bool },
}

impl RewardEvent {
    /// Terminal events have no successor state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RewardEvent::Death | RewardEvent::OpponentDeath | RewardEvent::RoundEnd { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            RewardEvent::HitByBullet { .. } => "hit_by_bullet",
            RewardEvent::HitWall => "hit_wall",
            RewardEvent::HitRobot => "hit_robot",
            RewardEvent::BulletHit => "bullet_hit",
            RewardEvent::BulletHitBullet { .. } => "bullet_hit_bullet",
            RewardEvent::Death => "death",
            RewardEvent::OpponentDeath => "opponent_death",
            RewardEvent::RoundEnd { .. } => "round_end",
        }
    }
}

/// Commands emitted to the simulator. Turns are relative, positive is clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Turn { radians: f64 },
    /// Move along the body heading; negative distances move backwards
    Ahead { distance: f64 },
    TurnGun { radians: f64 },
    TurnRadar { radians: f64 },
    Fire { power: f64 },
}
