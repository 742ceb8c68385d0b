//! Enemy wave tracking
//!
//! The opponent's shots are invisible; a drop in its energy between scans is
//! the only evidence. Each inferred shot becomes an [`EnemyWave`] expanding
//! from the opponent's previous position. Waves that hit us are logged into a
//! guess-factor histogram so that later surfing can steer away from
//! dangerous offsets.

use std::{
    collections::VecDeque,
    f64::consts::{FRAC_PI_2, PI},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{
    MAX_VELOCITY, Point, WallSmoothing, absolute_bearing, bullet_velocity, limit,
    max_escape_angle, max_turn_rate, normal_relative_angle, project,
};

/// Number of guess-factor bins in the surf histogram.
pub const BINS: usize = 47;

/// Energy drops inside this open interval are read as a shot.
const MIN_FIRE_DROP: f64 = 0.09;
const MAX_FIRE_DROP: f64 = 3.01;

/// Slack added to the distance test before a wave is considered past us.
const PASSED_MARGIN: f64 = 50.0;

/// Upper bound on ticks simulated when predicting a surf path.
const MAX_PREDICTION_TICKS: usize = 500;

/// Model of one in-flight opponent bullet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyWave {
    pub fire_location: Point,
    pub fire_time: u64,
    pub bullet_velocity: f64,
    /// Absolute bearing from the shooter to us at fire time
    pub direct_angle: f64,
    pub distance_traveled: f64,
    /// Our lateral direction relative to the shooter at fire time
    pub direction: i8,
}

impl EnemyWave {
    fn advance(&mut self, time: u64) {
        self.distance_traveled = time.saturating_sub(self.fire_time) as f64 * self.bullet_velocity;
    }

    /// Distance from the wave front to `location`; negative once it has passed.
    pub fn remaining_distance(&self, location: Point) -> f64 {
        location.distance(&self.fire_location) - self.distance_traveled
    }
}

/// Our own motion, used to simulate surf paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub location: Point,
    pub velocity: f64,
    pub heading: f64,
}

/// Tracks live waves and the danger histogram across a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveTracker {
    waves: Vec<EnemyWave>,
    surf_stats: Vec<f64>,
    surf_directions: VecDeque<i8>,
    surf_abs_bearings: VecDeque<f64>,
    opponent_energy: f64,
    opponent_location: Option<Point>,
}

impl Default for WaveTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveTracker {
    pub fn new() -> Self {
        Self {
            waves: Vec::new(),
            surf_stats: vec![0.0; BINS],
            surf_directions: VecDeque::with_capacity(3),
            surf_abs_bearings: VecDeque::with_capacity(3),
            opponent_energy: 100.0,
            opponent_location: None,
        }
    }

    /// Process one scan: detect a new shot, remember where the opponent is,
    /// and advance every live wave.
    pub fn observe(
        &mut self,
        time: u64,
        me: Kinematics,
        bearing: f64,
        distance: f64,
        opponent_energy: f64,
    ) {
        let lateral_velocity = me.velocity * bearing.sin();
        let abs_bearing = bearing + me.heading;

        self.surf_directions
            .push_front(if lateral_velocity >= 0.0 { 1 } else { -1 });
        self.surf_abs_bearings.push_front(abs_bearing + PI);
        self.surf_directions.truncate(3);
        self.surf_abs_bearings.truncate(3);

        let drop = self.opponent_energy - opponent_energy;
        if drop > MIN_FIRE_DROP && drop < MAX_FIRE_DROP && self.surf_directions.len() > 2 {
            if let Some(fire_location) = self.opponent_location {
                let velocity = bullet_velocity(drop);
                let wave = EnemyWave {
                    fire_location,
                    fire_time: time.saturating_sub(1),
                    bullet_velocity: velocity,
                    direct_angle: self.surf_abs_bearings[2],
                    distance_traveled: velocity,
                    direction: self.surf_directions[2],
                };
                debug!(power = drop, time, "opponent fired");
                self.waves.push(wave);
            }
        }

        self.opponent_energy = opponent_energy;
        // Updated after detection: the new wave originates from last tick's position.
        self.opponent_location = Some(project(me.location, abs_bearing, distance));
        self.update(time, me.location);
    }

    /// Advance waves to `time` and drop those that have passed `location`.
    pub fn update(&mut self, time: u64, location: Point) {
        self.waves.retain_mut(|wave| {
            wave.advance(time);
            wave.distance_traveled <= location.distance(&wave.fire_location) + PASSED_MARGIN
        });
    }

    /// Match a hit against the live waves, log it and remove the wave.
    ///
    /// Returns `true` when a wave matched.
    pub fn on_hit(&mut self, power: f64, location: Point) -> bool {
        let velocity = bullet_velocity(power);
        let matched = self.waves.iter().position(|wave| {
            (wave.distance_traveled - location.distance(&wave.fire_location)).abs()
                < PASSED_MARGIN
                && (velocity - wave.bullet_velocity).abs() < 0.001
        });

        match matched {
            Some(index) => {
                let wave = self.waves.remove(index);
                self.log_hit(&wave, location);
                true
            }
            None => false,
        }
    }

    /// Forget live waves at a round boundary; the histogram persists.
    pub fn reset_round(&mut self) {
        self.waves.clear();
        self.surf_directions.clear();
        self.surf_abs_bearings.clear();
        self.opponent_energy = 100.0;
        self.opponent_location = None;
    }

    pub fn waves(&self) -> &[EnemyWave] {
        &self.waves
    }

    pub fn has_live_waves(&self) -> bool {
        !self.waves.is_empty()
    }

    pub fn surf_stats(&self) -> &[f64] {
        &self.surf_stats
    }

    pub fn opponent_location(&self) -> Option<Point> {
        self.opponent_location
    }

    /// The nearest wave that is still more than one tick away.
    pub fn closest_surfable(&self, location: Point) -> Option<&EnemyWave> {
        self.waves
            .iter()
            .filter(|wave| wave.remaining_distance(location) > wave.bullet_velocity)
            .min_by(|a, b| {
                a.remaining_distance(location)
                    .total_cmp(&b.remaining_distance(location))
            })
    }

    /// Guess-factor bin for being at `target` when `wave` arrives.
    pub fn factor_index(wave: &EnemyWave, target: Point) -> usize {
        let offset = absolute_bearing(wave.fire_location, target) - wave.direct_angle;
        let factor = normal_relative_angle(offset) / max_escape_angle(wave.bullet_velocity)
            * f64::from(wave.direction);
        let middle = ((BINS - 1) / 2) as f64;
        limit(0.0, factor * middle + middle, (BINS - 1) as f64) as usize
    }

    fn log_hit(&mut self, wave: &EnemyWave, target: Point) {
        let index = Self::factor_index(wave, target) as f64;
        for (bin, danger) in self.surf_stats.iter_mut().enumerate() {
            *danger += 1.0 / ((index - bin as f64).powi(2) + 1.0);
        }
    }

    /// Simulate orbiting the wave source in `direction` until the wave arrives.
    pub fn predict_position(
        &self,
        wave: &EnemyWave,
        direction: i8,
        me: Kinematics,
        smoothing: &WallSmoothing,
    ) -> Point {
        let mut position = me.location;
        let mut velocity = me.velocity;
        let mut heading = me.heading;
        let orbit = f64::from(direction) * FRAC_PI_2;

        for tick in 1..=MAX_PREDICTION_TICKS {
            let desired = smoothing.smooth(
                position,
                absolute_bearing(wave.fire_location, position) + orbit,
                direction,
            );
            let mut move_angle = desired - heading;
            let mut move_dir = 1.0;
            if move_angle.cos() < 0.0 {
                move_angle += PI;
                move_dir = -1.0;
            }
            move_angle = normal_relative_angle(move_angle);

            let max_turning = max_turn_rate(velocity);
            heading = normal_relative_angle(heading + limit(-max_turning, move_angle, max_turning));

            // Braking is twice as fast as accelerating.
            velocity += if velocity * move_dir < 0.0 {
                2.0 * move_dir
            } else {
                move_dir
            };
            velocity = limit(-MAX_VELOCITY, velocity, MAX_VELOCITY);

            position = project(position, heading, velocity);

            let reach = wave.distance_traveled + (tick as f64 + 1.0) * wave.bullet_velocity;
            if position.distance(&wave.fire_location) < reach {
                break;
            }
        }

        position
    }

    /// Logged danger at the spot we would reach surfing `direction`.
    pub fn danger(
        &self,
        wave: &EnemyWave,
        direction: i8,
        me: Kinematics,
        smoothing: &WallSmoothing,
    ) -> f64 {
        let index = Self::factor_index(wave, self.predict_position(wave, direction, me, smoothing));
        self.surf_stats[index]
    }

    /// Absolute heading for surfing the closest wave, if there is one.
    pub fn surf_angle(&self, me: Kinematics, smoothing: &WallSmoothing) -> Option<f64> {
        let wave = self.closest_surfable(me.location)?;
        let danger_left = self.danger(wave, -1, me, smoothing);
        let danger_right = self.danger(wave, 1, me, smoothing);

        let go_angle = absolute_bearing(wave.fire_location, me.location);
        Some(if danger_left < danger_right {
            smoothing.smooth(me.location, go_angle - FRAC_PI_2, -1)
        } else {
            smoothing.smooth(me.location, go_angle + FRAC_PI_2, 1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Arena;

    fn still(location: Point) -> Kinematics {
        Kinematics {
            location,
            velocity: 0.0,
            heading: 0.0,
        }
    }

    fn tracker_with_wave() -> WaveTracker {
        let me = still(Point::new(400.0, 100.0));
        let mut tracker = WaveTracker::new();
        // Opponent due north, 300 px away; three scans fill the history
        for time in 1..=3 {
            tracker.observe(time, me, 0.0, 300.0, 100.0);
        }
        tracker.observe(4, me, 0.0, 300.0, 98.0);
        tracker
    }

    #[test]
    fn test_energy_drop_creates_wave() {
        let tracker = tracker_with_wave();
        assert_eq!(tracker.waves().len(), 1);
        let wave = tracker.waves()[0];
        assert_eq!(wave.fire_time, 3);
        assert!((wave.bullet_velocity - 14.0).abs() < 1e-9);
        assert!((wave.fire_location.y - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_energy_drop_is_not_a_shot() {
        let me = still(Point::new(400.0, 100.0));
        let mut tracker = WaveTracker::new();
        for time in 1..=3 {
            tracker.observe(time, me, 0.0, 300.0, 100.0);
        }
        tracker.observe(4, me, 0.0, 300.0, 84.0);
        assert!(!tracker.has_live_waves());
    }

    #[test]
    fn test_wave_expires_after_passing() {
        let mut tracker = tracker_with_wave();
        let me = Point::new(400.0, 100.0);
        tracker.update(20, me);
        assert!(tracker.has_live_waves());
        // 14 px/tick: 300 + 50 px are covered after 25 ticks
        tracker.update(30, me);
        assert!(!tracker.has_live_waves());
    }

    #[test]
    fn test_hit_matches_wave_and_logs_danger() {
        let mut tracker = tracker_with_wave();
        let me = Point::new(400.0, 100.0);
        tracker.update(24, me);
        assert!(tracker.on_hit(2.0, me));
        assert!(!tracker.has_live_waves());

        let middle = (BINS - 1) / 2;
        let stats = tracker.surf_stats();
        assert!((stats[middle] - 1.0).abs() < 1e-9);
        assert!(stats[middle] > stats[middle + 1]);
    }

    #[test]
    fn test_hit_with_wrong_power_does_not_match() {
        let mut tracker = tracker_with_wave();
        let me = Point::new(400.0, 100.0);
        tracker.update(24, me);
        assert!(!tracker.on_hit(0.5, me));
        assert!(tracker.has_live_waves());
    }

    #[test]
    fn test_surf_angle_is_perpendicular_to_wave() {
        let tracker = tracker_with_wave();
        let smoothing = WallSmoothing::new(Arena::default());
        let me = still(Point::new(400.0, 100.0));
        let angle = tracker.surf_angle(me, &smoothing).unwrap();
        // The wave comes from due north, so surfing runs east or west
        assert!(angle.sin().abs() > 0.9);
    }
}
