//! State quantization
//!
//! Encoders turn one [`Observation`] into a small integer [`StateVector`]:
//! spatial quantities are scaled and rounded, velocity and energy are
//! binarized against thresholds. Every component is clamped into the range
//! its [`KeySpace`] declares, so the table never sees an out-of-range key.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    geometry::Arena,
    q_learning::StateActionKey,
    types::Observation,
    waves::WaveTracker,
};

/// Inclusive integer range of one key dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionBounds {
    pub floor: i32,
    pub ceiling: i32,
}

impl DimensionBounds {
    pub const fn new(floor: i32, ceiling: i32) -> Self {
        Self { floor, ceiling }
    }

    /// `[-trunc(extent), trunc(extent)]`
    pub fn symmetric(extent: f64) -> Self {
        let e = extent.abs().trunc() as i32;
        Self::new(-e, e)
    }

    pub const fn binary() -> Self {
        Self::new(0, 1)
    }

    /// Number of distinct values.
    pub fn width(&self) -> u64 {
        (i64::from(self.ceiling) - i64::from(self.floor) + 1).max(0) as u64
    }

    pub fn contains(&self, value: i32) -> bool {
        value >= self.floor && value <= self.ceiling
    }

    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.floor, self.ceiling)
    }

    /// Map `value` linearly onto `[-1, 1]`; a single-valued range maps to 0.
    pub fn normalize(&self, value: i32) -> f64 {
        if self.ceiling == self.floor {
            return 0.0;
        }
        let span = f64::from(self.ceiling) - f64::from(self.floor);
        2.0 * (f64::from(value) - f64::from(self.floor)) / span - 1.0
    }
}

/// Declared ranges of every key dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySpace {
    dimensions: Vec<DimensionBounds>,
}

impl KeySpace {
    pub fn new(dimensions: Vec<DimensionBounds>) -> Self {
        Self { dimensions }
    }

    /// This space extended by a trailing action dimension `[0, count - 1]`.
    pub fn with_actions(&self, count: usize) -> Self {
        let mut dimensions = self.dimensions.clone();
        dimensions.push(DimensionBounds::new(0, count.saturating_sub(1) as i32));
        Self { dimensions }
    }

    pub fn dimensions(&self) -> &[DimensionBounds] {
        &self.dimensions
    }

    pub fn arity(&self) -> usize {
        self.dimensions.len()
    }

    /// Product of the dimension widths.
    pub fn cardinality(&self) -> u64 {
        self.dimensions.iter().map(DimensionBounds::width).product()
    }

    pub fn contains(&self, components: &[i32]) -> bool {
        components.len() == self.dimensions.len()
            && self
                .dimensions
                .iter()
                .zip(components)
                .all(|(bounds, &value)| bounds.contains(value))
    }

    /// Check a key, reporting why it does not fit.
    pub fn check(&self, components: &[i32]) -> Result<()> {
        if components.len() != self.dimensions.len() {
            return Err(Error::DimensionMismatch {
                what: "key components",
                expected: self.dimensions.len(),
                got: components.len(),
            });
        }
        if !self.contains(components) {
            return Err(Error::KeyOutOfRange {
                key: StateActionKey::new(components.to_vec()).to_string(),
            });
        }
        Ok(())
    }

    /// Scale each component onto `[-1, 1]`.
    pub fn normalize(&self, components: &[i32]) -> Result<Vec<f64>> {
        if components.len() != self.dimensions.len() {
            return Err(Error::DimensionMismatch {
                what: "key components",
                expected: self.dimensions.len(),
                got: components.len(),
            });
        }
        Ok(self
            .dimensions
            .iter()
            .zip(components)
            .map(|(bounds, &value)| bounds.normalize(value))
            .collect())
    }
}

/// Quantized features of one observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateVector(Vec<i32>);

impl StateVector {
    pub fn new(components: Vec<i32>) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[i32] {
        &self.0
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn with_action(&self, ordinal: usize) -> StateActionKey {
        StateActionKey::from_parts(&self.0, ordinal as i32)
    }
}

/// Scaling and threshold constants shared by the encoders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizerConfig {
    /// Multiplier applied to pixel quantities before rounding
    pub scale: f64,
    /// Opponent speed above which it counts as moving
    pub moving_threshold: f64,
    /// Own energy above which the agent counts as healthy
    pub energy_threshold: f64,
    pub arena: Arena,
}

impl Default for QuantizerConfig {
    fn default() -> Self {
        Self {
            scale: 0.01,
            moving_threshold: 1.0,
            energy_threshold: 40.0,
            arena: Arena::default(),
        }
    }
}

impl QuantizerConfig {
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_arena(mut self, arena: Arena) -> Self {
        self.arena = arena;
        self
    }

    pub fn with_moving_threshold(mut self, threshold: f64) -> Self {
        self.moving_threshold = threshold;
        self
    }

    pub fn with_energy_threshold(mut self, threshold: f64) -> Self {
        self.energy_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(Error::invalid_config(format!(
                "quantizer scale must be positive, got {}",
                self.scale
            )));
        }
        if !(self.arena.width > 0.0 && self.arena.height > 0.0) {
            return Err(Error::invalid_config(format!(
                "arena must have positive size, got {} x {}",
                self.arena.width, self.arena.height
            )));
        }
        Ok(())
    }

    fn quantize(&self, value: f64) -> i32 {
        (value * self.scale).round() as i32
    }

    fn center_offset_x(&self, x: f64) -> i32 {
        self.quantize(x - self.arena.width / 2.0)
    }

    fn center_offset_y(&self, y: f64) -> i32 {
        self.quantize(y - self.arena.height / 2.0)
    }

    fn delta_bounds(&self) -> (DimensionBounds, DimensionBounds) {
        (
            DimensionBounds::symmetric(self.arena.width * self.scale),
            DimensionBounds::symmetric(self.arena.height * self.scale),
        )
    }

    fn center_bounds(&self) -> (DimensionBounds, DimensionBounds) {
        (
            DimensionBounds::symmetric(self.arena.width * self.scale / 2.0),
            DimensionBounds::symmetric(self.arena.height * self.scale / 2.0),
        )
    }
}

/// Maps observations to state vectors.
pub trait StateEncoder {
    /// Ranges of the produced state components, without the action.
    fn key_space(&self) -> KeySpace;

    fn encode(&self, observation: &Observation, waves: &WaveTracker) -> StateVector;

    fn name(&self) -> &'static str;

    /// Arena the key ranges were derived from.
    fn arena(&self) -> Arena;

    fn arity(&self) -> usize {
        self.key_space().arity()
    }
}

fn clamp_into(space: &KeySpace, raw: &[i32]) -> StateVector {
    StateVector::new(
        space
            .dimensions()
            .iter()
            .zip(raw)
            .map(|(bounds, &value)| bounds.clamp(value))
            .collect(),
    )
}

/// Opponent offset, opponent motion, own position and own health.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelativeEncoder {
    config: QuantizerConfig,
}

impl RelativeEncoder {
    pub fn new(config: QuantizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &QuantizerConfig {
        &self.config
    }
}

impl StateEncoder for RelativeEncoder {
    fn key_space(&self) -> KeySpace {
        let (dx, dy) = self.config.delta_bounds();
        let (cx, cy) = self.config.center_bounds();
        KeySpace::new(vec![
            dx,
            dy,
            DimensionBounds::binary(),
            cx,
            cy,
            DimensionBounds::binary(),
        ])
    }

    fn encode(&self, observation: &Observation, _waves: &WaveTracker) -> StateVector {
        let c = &self.config;
        let (dx, dy) = observation.opponent_offset();
        let raw = [
            c.quantize(dx),
            c.quantize(dy),
            i32::from(observation.opponent.velocity > c.moving_threshold),
            c.center_offset_x(observation.me.x),
            c.center_offset_y(observation.me.y),
            i32::from(observation.me.energy > c.energy_threshold),
        ];
        clamp_into(&self.key_space(), &raw)
    }

    fn name(&self) -> &'static str {
        "relative"
    }

    fn arena(&self) -> Arena {
        self.config.arena
    }
}

/// Both robots' positions relative to the centre plus an opponent-fired flag.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfEncoder {
    config: QuantizerConfig,
}

impl SurfEncoder {
    pub fn new(config: QuantizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &QuantizerConfig {
        &self.config
    }
}

impl StateEncoder for SurfEncoder {
    fn key_space(&self) -> KeySpace {
        let (cx, cy) = self.config.center_bounds();
        KeySpace::new(vec![cx, cy, cx, cy, DimensionBounds::binary()])
    }

    fn encode(&self, observation: &Observation, waves: &WaveTracker) -> StateVector {
        let c = &self.config;
        let (dx, dy) = observation.opponent_offset();
        let me = &observation.me;
        let raw = [
            c.center_offset_x(me.x + dx),
            c.center_offset_y(me.y + dy),
            c.center_offset_x(me.x),
            c.center_offset_y(me.y),
            i32::from(waves.has_live_waves()),
        ];
        clamp_into(&self.key_space(), &raw)
    }

    fn name(&self) -> &'static str {
        "surf"
    }

    fn arena(&self) -> Arena {
        self.config.arena
    }
}
