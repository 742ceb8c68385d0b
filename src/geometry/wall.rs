//! Wall avoidance helpers

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use super::{Arena, Point, ROBOT_HALF_WIDTH, normal_absolute_angle, project};

const MAX_SMOOTHING_STEPS: usize = 25;

/// Iterative wall smoothing.
///
/// A probe of length `stick` is cast along the desired heading; while its tip
/// leaves the field the heading is snapped parallel to the offending wall and
/// rotated by `orientation` until the probe fits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallSmoothing {
    pub arena: Arena,
    pub stick: f64,
    pub margin: f64,
}

impl WallSmoothing {
    pub fn new(arena: Arena) -> Self {
        Self {
            arena,
            stick: 140.0,
            margin: ROBOT_HALF_WIDTH,
        }
    }

    /// Adjust `start_angle` so that moving from `location` keeps clear of walls.
    ///
    /// `orientation` is `1` to rotate clockwise, `-1` counter-clockwise. The
    /// result is normalized to `[0, 2*PI)`.
    pub fn smooth(&self, location: Point, start_angle: f64, orientation: i8) -> f64 {
        let orientation = f64::from(orientation.signum());
        // Keep the angle positive so truncating division behaves like floor.
        let mut angle = start_angle.rem_euclid(2.0 * PI) + 4.0 * PI;

        let wall_distance_x = self.wall_distance_x(location.x);
        let wall_distance_y = self.wall_distance_y(location.y);
        let mut probe = project(location, angle, self.stick);
        let mut adjacent = 0.0;
        let mut steps = 0;

        while !self.arena.contains_with_margin(probe, self.margin) && steps < MAX_SMOOTHING_STEPS {
            steps += 1;
            let probe_x = self.wall_distance_x(probe.x);
            let probe_y = self.wall_distance_y(probe.y);

            if probe_y < 0.0 && probe_y < probe_x {
                // north or south wall
                angle = ((angle + FRAC_PI_2) / PI).floor() * PI;
                adjacent = wall_distance_y.abs();
            } else if probe_x < 0.0 && probe_x <= probe_y {
                // east or west wall
                angle = (angle / PI).floor() * PI + FRAC_PI_2;
                adjacent = wall_distance_x.abs();
            }

            let ratio = (adjacent / self.stick).clamp(-1.0, 1.0);
            angle += orientation * (ratio.acos().abs() + 0.005);
            probe = project(location, angle, self.stick);
        }

        normal_absolute_angle(angle)
    }

    fn wall_distance_x(&self, x: f64) -> f64 {
        (x - self.margin).min(self.arena.width - x - self.margin)
    }

    fn wall_distance_y(&self, y: f64) -> f64 {
        (y - self.margin).min(self.arena.height - y - self.margin)
    }
}

/// Which walls are within a buffer distance of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WallProximity {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl WallProximity {
    pub fn check(arena: Arena, location: Point, buffer: f64) -> Self {
        let mut proximity = Self::default();
        if location.x < buffer {
            proximity.left = true;
        } else if location.x > arena.width - buffer {
            proximity.right = true;
        }
        if location.y < buffer {
            proximity.bottom = true;
        } else if location.y > arena.height - buffer {
            proximity.top = true;
        }
        proximity
    }

    /// Whether heading along `angle` drives towards a nearby wall.
    pub fn blocks(&self, angle: f64) -> bool {
        let (dx, dy) = (angle.sin(), angle.cos());
        (self.top && dy > 0.5)
            || (self.bottom && dy < -0.5)
            || (self.right && dx > 0.5)
            || (self.left && dx < -0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_field_heading_is_unchanged() {
        let smoothing = WallSmoothing::new(Arena::default());
        let angle = smoothing.smooth(Point::new(400.0, 300.0), 1.0, 1);
        assert!((angle - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_heading_into_wall_is_deflected() {
        let arena = Arena::default();
        let smoothing = WallSmoothing::new(arena);
        let location = Point::new(400.0, 560.0);
        // Heading straight at the north wall
        let angle = smoothing.smooth(location, 0.0, 1);
        let probe = project(location, angle, smoothing.stick);
        assert!(arena.contains_with_margin(probe, smoothing.margin));
        assert!(angle.cos() < 0.5);
    }

    #[test]
    fn test_wall_proximity_flags() {
        let arena = Arena::default();
        let proximity = WallProximity::check(arena, Point::new(50.0, 580.0), 150.0);
        assert!(proximity.left);
        assert!(proximity.top);
        assert!(!proximity.right);
        assert!(!proximity.bottom);
        assert!(proximity.blocks(0.0));
        assert!(!proximity.blocks(PI));
    }
}
