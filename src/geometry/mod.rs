//! Arena geometry and bullet rules
//!
//! Pure helpers shared by feature extraction and action execution. All angles
//! are radians measured clockwise from +y, so a unit step along `angle` is
//! `(sin(angle), cos(angle))`.
//!
//! - [`intercept`]: closed-form and iterative bullet-interception solvers
//! - [`wall`]: wall smoothing and wall-proximity checks

pub mod intercept;
pub mod wall;

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

pub use intercept::{AimSolution, IterativeIntercept, linear_intercept};
pub use wall::{WallProximity, WallSmoothing};

/// Maximum robot speed in pixels per tick.
pub const MAX_VELOCITY: f64 = 8.0;

/// Half the robot's bounding box; robot centres never come closer to a wall.
pub const ROBOT_HALF_WIDTH: f64 = 18.0;

pub const MIN_BULLET_POWER: f64 = 0.1;
pub const MAX_BULLET_POWER: f64 = 3.0;

/// A position in arena coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Rectangular battle field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Arena {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether `point` lies in the field shrunk by `margin` on every side.
    ///
    /// The lower edges are inclusive and the upper edges exclusive.
    pub fn contains_with_margin(&self, point: Point, margin: f64) -> bool {
        point.x >= margin
            && point.y >= margin
            && point.x < self.width - margin
            && point.y < self.height - margin
    }

    /// Clamp a point so a robot centred there stays inside the walls.
    pub fn clamp(&self, point: Point, margin: f64) -> Point {
        Point::new(
            limit(margin, point.x, self.width - margin),
            limit(margin, point.y, self.height - margin),
        )
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Point reached by travelling `length` from `source` along `angle`.
pub fn project(source: Point, angle: f64, length: f64) -> Point {
    Point::new(
        source.x + angle.sin() * length,
        source.y + angle.cos() * length,
    )
}

/// Absolute angle of the ray from `source` to `target`.
pub fn absolute_bearing(source: Point, target: Point) -> f64 {
    (target.x - source.x).atan2(target.y - source.y)
}

/// Normalize an angle to `(-PI, PI]`.
pub fn normal_relative_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a > PI { a - TAU } else { a }
}

/// Normalize an angle to `[0, 2*PI)`.
pub fn normal_absolute_angle(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// Clamp `value` into `[min, max]`.
pub fn limit(min: f64, value: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Bullet travel speed for a given firing power.
pub fn bullet_velocity(power: f64) -> f64 {
    20.0 - 3.0 * power
}

/// Damage dealt by a bullet of the given power.
pub fn bullet_damage(power: f64) -> f64 {
    let mut damage = 4.0 * power;
    if power > 1.0 {
        damage += 2.0 * (power - 1.0);
    }
    damage
}

/// Energy returned to the shooter when its bullet hits.
pub fn bullet_hit_bonus(power: f64) -> f64 {
    3.0 * power
}

/// Largest angle a robot at top speed can cover before a bullet arrives.
pub fn max_escape_angle(bullet_velocity: f64) -> f64 {
    (MAX_VELOCITY / bullet_velocity).asin()
}

/// Maximum body turn per tick at the given speed.
pub fn max_turn_rate(velocity: f64) -> f64 {
    PI / 720.0 * (40.0 - 3.0 * velocity.abs())
}

/// Drive towards `go_angle` using whichever end of the robot needs less turning.
///
/// Returns the relative turn and the travel direction (`1.0` ahead, `-1.0` back).
pub fn back_as_front(go_angle: f64, heading: f64) -> (f64, f64) {
    let angle = normal_relative_angle(go_angle - heading);
    if angle.abs() > PI / 2.0 {
        let turn = if angle < 0.0 { PI + angle } else { angle - PI };
        (turn, -1.0)
    } else {
        (angle, 1.0)
    }
}
