//! Discrete action sets and their command plans

use std::{
    f64::consts::{FRAC_PI_2, PI},
    fmt::Debug,
};

use serde::{Deserialize, Serialize};

use crate::{
    agent::{AgentConfig, AimMode},
    geometry::{
        IterativeIntercept, WallProximity, WallSmoothing, absolute_bearing, back_as_front,
        bullet_velocity, linear_intercept, normal_relative_angle,
    },
    types::{Command, Observation},
    waves::{Kinematics, WaveTracker},
};

/// Largest remaining gun turn at which a shot is still released.
const FIRE_TOLERANCE: f64 = 10.0 * PI / 180.0;

/// Everything an action needs to turn itself into commands.
pub struct PlanContext<'a> {
    pub observation: &'a Observation,
    pub config: &'a AgentConfig,
    pub waves: &'a WaveTracker,
    pub smoothing: &'a WallSmoothing,
}

impl PlanContext<'_> {
    fn kinematics(&self) -> Kinematics {
        let me = &self.observation.me;
        Kinematics {
            location: me.location(),
            velocity: me.velocity,
            heading: me.heading,
        }
    }

    /// Turn towards `go_angle` with whichever end is closer and drive one step.
    fn drive(&self, go_angle: f64) -> Vec<Command> {
        let (turn, direction) = back_as_front(go_angle, self.observation.me.heading);
        vec![
            Command::Turn { radians: turn },
            Command::Ahead {
                distance: direction * self.config.step_distance,
            },
        ]
    }

    /// Point the gun at the opponent and fire once it is nearly aligned.
    ///
    /// Nothing is emitted when the aim mode finds no intercept.
    fn aim_and_fire(&self) -> Vec<Command> {
        let obs = self.observation;
        let me = obs.me.location();
        let target = obs.opponent_location();
        let power = self.config.gun_power;

        let bearing = match self.config.aim_mode {
            AimMode::HeadOn => Some(obs.absolute_bearing()),
            AimMode::Linear => linear_intercept(
                me,
                target,
                obs.opponent.heading,
                obs.opponent.velocity,
                bullet_velocity(power),
                Some(self.config.arena),
            )
            .map(|solution| solution.bearing),
            AimMode::Iterative => IterativeIntercept::default()
                .solve(me, target, obs.opponent.heading, obs.opponent.velocity, power)
                .map(|solution| solution.bearing),
        };
        let Some(bearing) = bearing else {
            return Vec::new();
        };

        let turn = normal_relative_angle(bearing - obs.me.gun_heading);
        let mut commands = vec![Command::TurnGun { radians: turn }];
        if obs.me.gun_heat == 0.0 && turn.abs() < FIRE_TOLERANCE {
            commands.push(Command::Fire { power });
        }
        commands
    }
}

/// A closed set of discrete actions.
pub trait ActionSet: Copy + Eq + Debug + 'static {
    /// Every action, in ordinal order.
    const ALL: &'static [Self];

    fn ordinal(self) -> usize;

    fn name(self) -> &'static str;

    /// Concrete commands realising this action for the current observation.
    fn plan(self, ctx: &PlanContext<'_>) -> Vec<Command>;

    fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }

    fn count() -> usize {
        Self::ALL.len()
    }
}

/// Fire, or drive one step along a fixed compass heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardinalAction {
    Fire,
    Left,
    Right,
    Up,
    Down,
}

impl CardinalAction {
    /// Compass heading of a movement action.
    pub fn heading(self) -> Option<f64> {
        match self {
            CardinalAction::Fire => None,
            CardinalAction::Up => Some(0.0),
            CardinalAction::Right => Some(FRAC_PI_2),
            CardinalAction::Down => Some(PI),
            CardinalAction::Left => Some(3.0 * FRAC_PI_2),
        }
    }
}

impl ActionSet for CardinalAction {
    const ALL: &'static [Self] = &[
        CardinalAction::Fire,
        CardinalAction::Left,
        CardinalAction::Right,
        CardinalAction::Up,
        CardinalAction::Down,
    ];

    fn ordinal(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            CardinalAction::Fire => "fire",
            CardinalAction::Left => "left",
            CardinalAction::Right => "right",
            CardinalAction::Up => "up",
            CardinalAction::Down => "down",
        }
    }

    fn plan(self, ctx: &PlanContext<'_>) -> Vec<Command> {
        let Some(target) = self.heading() else {
            return ctx.aim_and_fire();
        };
        let me = &ctx.observation.me;
        let proximity = WallProximity::check(ctx.config.arena, me.location(), ctx.config.wall_buffer);
        let go_angle = if proximity.blocks(target) {
            ctx.smoothing.smooth(me.location(), target, 1)
        } else {
            target
        };
        vec![
            Command::Turn {
                radians: normal_relative_angle(go_angle - me.heading),
            },
            Command::Ahead {
                distance: ctx.config.step_distance,
            },
        ]
    }
}

/// Wave surfing, firing, or moving radially relative to the threat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfAction {
    Surf,
    Fire,
    Close,
    Away,
}

impl SurfAction {
    /// Point the radial moves are measured from: the closest wave's origin,
    /// else the opponent itself.
    fn reference(ctx: &PlanContext<'_>) -> crate::geometry::Point {
        let me = ctx.observation.me.location();
        ctx.waves
            .closest_surfable(me)
            .map(|wave| wave.fire_location)
            .unwrap_or_else(|| ctx.observation.opponent_location())
    }
}

impl ActionSet for SurfAction {
    const ALL: &'static [Self] = &[
        SurfAction::Surf,
        SurfAction::Fire,
        SurfAction::Close,
        SurfAction::Away,
    ];

    fn ordinal(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            SurfAction::Surf => "surf",
            SurfAction::Fire => "fire",
            SurfAction::Close => "close",
            SurfAction::Away => "away",
        }
    }

    fn plan(self, ctx: &PlanContext<'_>) -> Vec<Command> {
        match self {
            SurfAction::Surf => ctx
                .waves
                .surf_angle(ctx.kinematics(), ctx.smoothing)
                .map(|angle| ctx.drive(angle))
                .unwrap_or_default(),
            SurfAction::Fire => ctx.aim_and_fire(),
            SurfAction::Close | SurfAction::Away => {
                let me = ctx.observation.me.location();
                let away = absolute_bearing(Self::reference(ctx), me);
                let go_angle = if self == SurfAction::Away { away } else { away + PI };
                ctx.drive(go_angle)
            }
        }
    }
}
