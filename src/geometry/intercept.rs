//! Bullet interception solvers
//!
//! Both solvers assume the target keeps its current heading and speed. A
//! missing solution is reported as `None`; callers skip firing for that tick.

use super::{Arena, Point, ROBOT_HALF_WIDTH, absolute_bearing, bullet_velocity, project};

/// Where to aim and when the bullet is expected to arrive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimSolution {
    /// Predicted impact point
    pub point: Point,
    /// Ticks until impact
    pub time: f64,
    /// Absolute gun bearing that sends the bullet to `point`
    pub bearing: f64,
    /// Half-angle of the target's silhouette seen from the shooter
    pub tolerance: f64,
}

/// Closed-form intercept against a target in straight-line motion.
///
/// Solves `|target + v*t - shooter| = bullet_speed * t` as a quadratic in
/// `1/t`. The predicted point is clamped inside the walls when `arena` is
/// given, since a robot stops when it reaches one.
pub fn linear_intercept(
    shooter: Point,
    target: Point,
    target_heading: f64,
    target_velocity: f64,
    bullet_speed: f64,
    arena: Option<Arena>,
) -> Option<AimSolution> {
    let a_term = (target.x - shooter.x) / bullet_speed;
    let b_term = target_velocity / bullet_speed * target_heading.sin();
    let c_term = (target.y - shooter.y) / bullet_speed;
    let d_term = target_velocity / bullet_speed * target_heading.cos();

    let a = a_term * a_term + c_term * c_term;
    let b = 2.0 * (a_term * b_term + c_term * d_term);
    let c = b_term * b_term + d_term * d_term - 1.0;

    if a < f64::EPSILON {
        return Some(solution(shooter, target, 0.0));
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let t1 = 2.0 * a / (-b - root);
    let t2 = 2.0 * a / (-b + root);
    let t = if t1.min(t2) >= 0.0 {
        t1.min(t2)
    } else {
        t1.max(t2)
    };
    if !t.is_finite() || t < 0.0 {
        return None;
    }

    let mut end = project(target, target_heading, target_velocity * t);
    if let Some(arena) = arena {
        end = arena.clamp(end, ROBOT_HALF_WIDTH);
    }
    Some(solution(shooter, end, t))
}

fn solution(shooter: Point, point: Point, time: f64) -> AimSolution {
    let distance = shooter.distance(&point);
    AimSolution {
        point,
        time,
        bearing: absolute_bearing(shooter, point),
        tolerance: if distance > 0.0 {
            (ROBOT_HALF_WIDTH / distance).atan()
        } else {
            std::f64::consts::FRAC_PI_2
        },
    }
}

/// Secant-method intercept solver.
///
/// Iterates on the time of flight until successive estimates differ by less
/// than `accuracy`, starting from two guesses a few ticks out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterativeIntercept {
    pub robot_radius: f64,
    pub accuracy: f64,
    pub max_iterations: usize,
    pub initial_guesses: (f64, f64),
}

impl Default for IterativeIntercept {
    fn default() -> Self {
        Self {
            robot_radius: 20.0,
            accuracy: 0.01,
            max_iterations: 15,
            initial_guesses: (10.0, 20.0),
        }
    }
}

impl IterativeIntercept {
    pub fn solve(
        &self,
        shooter: Point,
        target: Point,
        target_heading: f64,
        target_velocity: f64,
        bullet_power: f64,
    ) -> Option<AimSolution> {
        let speed = bullet_velocity(bullet_power);
        let position = |time: f64| project(target, target_heading, target_velocity * time);
        let miss = |time: f64| position(time).distance(&shooter) - speed * time;

        let (mut last_x, mut x) = self.initial_guesses;
        let mut last_fx = miss(last_x);
        let mut iterations = 0;

        while (x - last_x).abs() >= self.accuracy && iterations < self.max_iterations {
            iterations += 1;
            let fx = miss(x);
            if fx - last_fx == 0.0 {
                break;
            }
            let next_x = x - fx * (x - last_x) / (fx - last_fx);
            last_x = x;
            x = next_x;
            last_fx = fx;
        }

        if !x.is_finite() || x < 0.0 {
            return None;
        }

        let point = position(x);
        let distance = shooter.distance(&point);
        Some(AimSolution {
            point,
            time: x,
            bearing: absolute_bearing(shooter, point),
            tolerance: (self.robot_radius / distance.max(self.robot_radius)).atan(),
        })
    }
}
