//! Common builders for the arena-rl integration tests.

#![allow(dead_code)]

use arena_rl::{
    agent::{ActionSet, AgentConfig, CardinalAction, CardinalAgent},
    geometry::Arena,
    q_learning::LookupTable,
    quantizer::{QuantizerConfig, RelativeEncoder, StateEncoder},
    types::{Observation, OpponentScan, SelfState},
    waves::WaveTracker,
};

/// Observation of a stationary, fully charged robot at `(x, y)` facing north,
/// with the opponent `distance` pixels away at relative `bearing`.
pub fn observation(time: u64, x: f64, y: f64, bearing: f64, distance: f64) -> Observation {
    Observation {
        time,
        me: SelfState {
            x,
            y,
            heading: 0.0,
            velocity: 0.0,
            energy: 100.0,
            gun_heading: 0.0,
            radar_heading: 0.0,
            gun_heat: 0.0,
        },
        opponent: OpponentScan {
            bearing,
            distance,
            velocity: 0.0,
            heading: 0.0,
            energy: 100.0,
        },
    }
}

/// A mid-field observation every test can reuse.
pub fn centre_observation(time: u64) -> Observation {
    observation(time, 400.0, 300.0, 0.5, 250.0)
}

/// Deterministic, greedy, table-backed cardinal agent already started.
pub fn greedy_agent(config: AgentConfig) -> CardinalAgent {
    let encoder = RelativeEncoder::new(QuantizerConfig::default()).expect("default quantizer");
    let mut agent = CardinalAgent::new(config.with_epsilon(0.0).with_seed(17), encoder, LookupTable::new())
        .expect("valid agent config");
    agent.start(Arena::default()).expect("default arena");
    agent
}

/// Table holding `values[i]` for cardinal action `i` in the centre state.
pub fn centre_table(values: &[f64]) -> LookupTable {
    let encoder = RelativeEncoder::new(QuantizerConfig::default()).expect("default quantizer");
    let state = encoder.encode(&centre_observation(1), &WaveTracker::new());
    CardinalAction::ALL
        .iter()
        .zip(values)
        .map(|(action, &value)| (state.with_action(action.ordinal()), value))
        .collect()
}
